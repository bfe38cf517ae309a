use thiserror::Error;

use crate::context::ContextKey;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A referenced row is absent. Raised by reads and by hooks whose
    /// target row vanished inside the unit of work.
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Only raised under `HookMode::Strict`.
    #[error("hook context is missing `{0}`")]
    MissingContext(ContextKey),
    #[error("database lock poisoned")]
    LockPoisoned,
}

impl DbError {
    pub fn not_found(what: &str, id: i64) -> Self {
        Self::NotFound(format!("{} {}", what, id))
    }
}
