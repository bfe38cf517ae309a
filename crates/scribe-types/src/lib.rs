pub mod api;
pub mod models;

/// `comment_status` label for a post whose counter is zero.
pub const COMMENT_STATUS_NONE: &str = "no comments";
/// `comment_status` label for a post with at least one comment.
pub const COMMENT_STATUS_TRENDING: &str = "trending";

/// Audit status stamped on posts whose title passes moderation.
pub const AUDIT_STATUS_ACTIVE: &str = "active";
/// Audit status stamped on posts whose title is rejected.
pub const AUDIT_STATUS_INACTIVE: &str = "inactive";
/// Moderation rule set version written with every decision.
pub const AUDIT_VERSION: &str = "V1";
