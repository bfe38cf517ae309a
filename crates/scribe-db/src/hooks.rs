//! Aggregate maintenance run by the write operations themselves.
//!
//! Each hook is called explicitly, inside the same transaction as the row
//! write that triggers it. An `Err` from a hook rolls back the whole unit
//! of work. A missing context slot is a logged no-op under
//! `HookMode::Lenient` and `DbError::MissingContext` under `HookMode::Strict`.

use rusqlite::Connection;
use tracing::{debug, warn};

use scribe_types::{AUDIT_STATUS_ACTIVE, AUDIT_STATUS_INACTIVE, AUDIT_VERSION};

use crate::context::{ContextKey, HookContext, HookMode};
use crate::error::{DbError, Result};
use crate::models::NewPost;
use crate::{moderation, store};

/// Runs the moderation gate on a post about to be inserted.
///
/// Without an audit context the gate is skipped and the audit fields stay
/// empty. The context is only peeked; `after_post_create` consumes it.
pub fn before_post_create(post: &mut NewPost, ctx: &HookContext) {
    let Some(audit) = ctx.audit() else {
        debug!(title = %post.title, "No audit context, moderation skipped");
        return;
    };

    post.audit.audit_by = audit.audit_by.clone();
    post.audit.audit_status = if moderation::check(&post.title) {
        AUDIT_STATUS_ACTIVE.to_string()
    } else {
        AUDIT_STATUS_INACTIVE.to_string()
    };
    post.audit.audit_version = AUDIT_VERSION.to_string();
}

/// Counts a freshly inserted post toward its author.
///
/// Only posts created with an audit context are counted; a post created
/// without one leaves `post_number` untouched.
pub fn after_post_create(conn: &Connection, ctx: &mut HookContext, mode: HookMode) -> Result<()> {
    let Some(audit) = ctx.take_audit() else {
        return missing(ContextKey::Audit, mode, "post_number not incremented");
    };

    store::increment_post_number(conn, audit.user_id)?;
    let post_number = store::post_number(conn, audit.user_id)?;
    debug!(user_id = audit.user_id, post_number, "Author post count incremented");
    Ok(())
}

/// Bumps the comment counter of the post named by the context. The
/// comment row's own `post_id` is not consulted.
pub fn after_comment_create(conn: &Connection, ctx: &mut HookContext, mode: HookMode) -> Result<()> {
    let Some(post_id) = ctx.take_target_post() else {
        return missing(ContextKey::TargetPost, mode, "comment_number not incremented");
    };

    store::increment_comment_number(conn, post_id)?;
    let comment_number = store::comment_number(conn, post_id)?;
    debug!(post_id, comment_number, "Post comment count incremented");
    Ok(())
}

/// Decrements the parent post's counter, but only when the delete really
/// removed a row.
pub fn after_comment_delete(conn: &Connection, ctx: &mut HookContext, mode: HookMode) -> Result<()> {
    let Some(pending) = ctx.take_pending_rows() else {
        return missing(ContextKey::PendingRows, mode, "comment_number not decremented");
    };

    if pending.count <= 0 {
        debug!(post_id = pending.post_id, "Delete removed nothing, counter untouched");
        return Ok(());
    }

    store::decrement_comment_number(conn, pending.post_id)?;
    let comment_number = store::comment_number(conn, pending.post_id)?;
    debug!(post_id = pending.post_id, comment_number, "Post comment count decremented");
    Ok(())
}

fn missing(key: ContextKey, mode: HookMode, skipped: &str) -> Result<()> {
    match mode {
        HookMode::Lenient => {
            warn!(%key, "Hook context slot absent, {}", skipped);
            Ok(())
        }
        HookMode::Strict => Err(DbError::MissingContext(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AuditContext, RowsAffected};
    use crate::migrations;
    use scribe_types::models::AuditFields;

    fn conn_with_post() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        migrations::run(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (id, username, email, password) VALUES (1, 'u', 'u@example.com', 'x')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO posts (id, user_id, title, content) VALUES (1, 1, 't', 'c')",
            [],
        )
        .unwrap();
        conn
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            user_id: 1,
            title: title.into(),
            content: "body".into(),
            audit: AuditFields::default(),
        }
    }

    fn audit() -> AuditContext {
        AuditContext {
            audit_by: "bob".into(),
            user_id: 1,
        }
    }

    #[test]
    fn gate_stamps_audit_fields() {
        let ctx = HookContext::new().with_audit(audit());

        let mut ok = new_post("hello");
        before_post_create(&mut ok, &ctx);
        assert_eq!(ok.audit.audit_status, "active");
        assert_eq!(ok.audit.audit_version, "V1");
        assert_eq!(ok.audit.audit_by, "bob");

        let mut rejected = new_post("金融 tips");
        before_post_create(&mut rejected, &ctx);
        assert_eq!(rejected.audit.audit_status, "inactive");
        assert!(ctx.audit().is_some());
    }

    #[test]
    fn gate_without_audit_leaves_fields_empty() {
        let mut post = new_post("hello");
        before_post_create(&mut post, &HookContext::new());
        assert_eq!(post.audit, AuditFields::default());
    }

    #[test]
    fn post_count_needs_audit_context() {
        let conn = conn_with_post();

        after_post_create(&conn, &mut HookContext::new(), HookMode::Lenient).unwrap();
        assert_eq!(store::post_number(&conn, 1).unwrap(), 0);

        let mut ctx = HookContext::new().with_audit(audit());
        after_post_create(&conn, &mut ctx, HookMode::Lenient).unwrap();
        assert_eq!(store::post_number(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn strict_mode_rejects_missing_slot() {
        let conn = conn_with_post();
        let err = after_comment_create(&conn, &mut HookContext::new(), HookMode::Strict).unwrap_err();
        assert!(matches!(err, DbError::MissingContext(ContextKey::TargetPost)));
    }

    #[test]
    fn comment_counter_moves_both_ways() {
        let conn = conn_with_post();

        let mut ctx = HookContext::new().with_target_post(1);
        after_comment_create(&conn, &mut ctx, HookMode::Lenient).unwrap();
        let post = store::first_post(&conn, 1).unwrap();
        assert_eq!(post.comment_number, 1);
        assert_eq!(post.comment_status, "trending");

        let mut ctx = HookContext::new();
        ctx.stash_pending_rows(RowsAffected { count: 1, post_id: 1 });
        after_comment_delete(&conn, &mut ctx, HookMode::Lenient).unwrap();
        let post = store::first_post(&conn, 1).unwrap();
        assert_eq!(post.comment_number, 0);
        assert_eq!(post.comment_status, "no comments");
    }

    #[test]
    fn zero_affected_rows_is_a_no_op() {
        let conn = conn_with_post();
        store::increment_comment_number(&conn, 1).unwrap();

        let mut ctx = HookContext::new();
        ctx.stash_pending_rows(RowsAffected { count: 0, post_id: 1 });
        after_comment_delete(&conn, &mut ctx, HookMode::Strict).unwrap();
        assert_eq!(store::comment_number(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn missing_delete_rows_is_skipped_when_lenient() {
        let conn = conn_with_post();
        store::increment_comment_number(&conn, 1).unwrap();

        after_comment_delete(&conn, &mut HookContext::new(), HookMode::Lenient).unwrap();
        assert_eq!(store::comment_number(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn missing_delete_rows_fails_when_strict() {
        let conn = conn_with_post();
        store::increment_comment_number(&conn, 1).unwrap();

        let err = after_comment_delete(&conn, &mut HookContext::new(), HookMode::Strict).unwrap_err();
        assert!(matches!(err, DbError::MissingContext(ContextKey::PendingRows)));
        assert_eq!(store::comment_number(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn new_post_starts_with_no_comments() {
        let conn = conn_with_post();
        let post = store::first_post(&conn, 1).unwrap();
        assert_eq!(post.comment_number, 0);
        assert_eq!(post.comment_status, "no comments");
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let conn = conn_with_post();

        let mut ctx = HookContext::new();
        ctx.stash_pending_rows(RowsAffected { count: 1, post_id: 1 });
        after_comment_delete(&conn, &mut ctx, HookMode::Lenient).unwrap();

        let post = store::first_post(&conn, 1).unwrap();
        assert_eq!(post.comment_number, 0);
        assert_eq!(post.comment_status, "no comments");
    }

    #[test]
    fn vanished_post_fails_the_hook() {
        let conn = conn_with_post();
        let mut ctx = HookContext::new().with_target_post(99);
        let err = after_comment_create(&conn, &mut ctx, HookMode::Lenient).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}
