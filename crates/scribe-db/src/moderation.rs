use tracing::debug;

/// Substrings that get a title rejected.
const DISALLOWED_MARKERS: &[&str] = &["金融"];

/// Returns `false` when `input` contains a disallowed marker.
pub fn check(input: &str) -> bool {
    match DISALLOWED_MARKERS.iter().find(|m| input.contains(*m)) {
        Some(marker) => {
            debug!(marker, "Moderation rejected input");
            false
        }
        None => true,
    }
}
