pub mod auth;
pub mod comments;
pub mod middleware;
pub mod posts;
pub mod router;
pub mod users;

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{debug, error};

use scribe_db::{Database, DbError};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Auditor name stamped on every post created through the API.
    pub audit_by: String,
}

/// Runs a blocking DB call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> scribe_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    blocking_with(state, f, db_status).await
}

/// Like `blocking`, with a caller-chosen mapping for DB errors.
pub(crate) async fn blocking_with<F, T, M>(state: &AppState, f: F, map_err: M) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> scribe_db::Result<T> + Send + 'static,
    T: Send + 'static,
    M: FnOnce(DbError) -> StatusCode,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(map_err)
}

/// Missing rows answer 409 rather than 404; existing clients rely on it.
pub(crate) fn db_status(err: DbError) -> StatusCode {
    match err {
        DbError::NotFound(_) | DbError::Conflict(_) => {
            debug!("Request rejected: {}", err);
            StatusCode::CONFLICT
        }
        other => {
            error!("Database error: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
