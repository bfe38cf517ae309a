//! Per-call envelope that carries caller-known data into the aggregate hooks.
//!
//! Recognized slots, with producer and consumer:
//!
//! | key            | producer                         | consumer                                            |
//! |----------------|----------------------------------|-----------------------------------------------------|
//! | `target_post`  | `Database::create_comment`       | `hooks::after_comment_create`                       |
//! | `audit`        | `Database::create_post`          | `hooks::before_post_create` (peeks), `hooks::after_post_create` |
//! | `pending_rows` | `relay::delete_comment`          | `hooks::after_comment_delete`                       |
//!
//! A `HookContext` lives for one write. It is not `Clone`, and consumers
//! `take()` their slot so a second read sees nothing.

use std::fmt;

/// Who is acting on a post create, and who gets the post counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub audit_by: String,
    pub user_id: i64,
}

/// Affected-row count of a pending delete, plus the post whose counter
/// depends on it. `count` starts as a pre-delete estimate and is
/// overwritten with the delete's real result before the hook reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub count: i64,
    pub post_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    TargetPost,
    Audit,
    PendingRows,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKey::TargetPost => write!(f, "target_post"),
            ContextKey::Audit => write!(f, "audit"),
            ContextKey::PendingRows => write!(f, "pending_rows"),
        }
    }
}

/// How hooks react to a slot they need but do not find.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HookMode {
    /// Log and skip the aggregate update.
    #[default]
    Lenient,
    /// Fail the unit of work with `DbError::MissingContext`.
    Strict,
}

#[derive(Debug, Default)]
pub struct HookContext {
    target_post: Option<i64>,
    audit: Option<AuditContext>,
    pending_rows: Option<RowsAffected>,
}

impl HookContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_post(mut self, post_id: i64) -> Self {
        self.target_post = Some(post_id);
        self
    }

    pub fn with_audit(mut self, audit: AuditContext) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn audit(&self) -> Option<&AuditContext> {
        self.audit.as_ref()
    }

    pub fn take_target_post(&mut self) -> Option<i64> {
        self.target_post.take()
    }

    pub fn take_audit(&mut self) -> Option<AuditContext> {
        self.audit.take()
    }

    pub fn stash_pending_rows(&mut self, pending: RowsAffected) {
        self.pending_rows = Some(pending);
    }

    /// Replace the stashed estimate with the count the delete reported.
    /// Returns the previous estimate, if one was stashed.
    pub fn correct_pending_rows(&mut self, affected: i64) -> Option<i64> {
        self.pending_rows.as_mut().map(|pending| {
            let estimate = pending.count;
            pending.count = affected;
            estimate
        })
    }

    pub fn take_pending_rows(&mut self) -> Option<RowsAffected> {
        self.pending_rows.take()
    }
}
