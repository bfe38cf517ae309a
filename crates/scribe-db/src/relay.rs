//! Physical comment delete that relays its affected-row count to
//! `hooks::after_comment_delete`.
//!
//! The pre-delete count is only an estimate: another writer can change the
//! table between the count and the delete. The delete's own result always
//! replaces it before the hook runs.

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::context::{HookContext, HookMode, RowsAffected};
use crate::error::Result;
use crate::hooks;
use crate::models::CommentFilter;
use crate::store;

/// Returns `true` when a row was removed, `false` when the filter matched
/// nothing. Store errors propagate.
pub fn delete_comment(
    conn: &Connection,
    filter: &CommentFilter,
    ctx: &mut HookContext,
    mode: HookMode,
) -> Result<bool> {
    let estimate = store::count_comments(conn, filter)?;
    ctx.stash_pending_rows(RowsAffected {
        count: estimate,
        post_id: filter.post_id,
    });

    let affected = store::delete_comments(conn, filter)?;
    if let Some(previous) = ctx.correct_pending_rows(affected) {
        if previous != affected {
            warn!(
                comment_id = filter.id,
                estimate = previous,
                affected,
                "Pre-delete count was stale"
            );
        }
    }
    debug!(comment_id = filter.id, post_id = filter.post_id, affected, "Comment delete executed");

    hooks::after_comment_delete(conn, ctx, mode)?;

    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, username, email, password) VALUES (1, 'u', 'u@example.com', 'x');
             INSERT INTO posts (id, user_id, title, content, comment_number, comment_status)
                 VALUES (1, 1, 't', 'c', 1, 'trending');
             INSERT INTO comments (id, user_id, post_id, content) VALUES (1, 1, 1, 'hi');",
        )
        .unwrap();
        conn
    }

    fn filter(id: i64) -> CommentFilter {
        CommentFilter {
            id,
            user_id: 1,
            post_id: 1,
        }
    }

    #[test]
    fn removes_and_decrements() {
        let conn = seeded();
        let removed =
            delete_comment(&conn, &filter(1), &mut HookContext::new(), HookMode::Lenient).unwrap();
        assert!(removed);
        assert_eq!(store::comment_number(&conn, 1).unwrap(), 0);
    }

    #[test]
    fn unmatched_filter_returns_false() {
        let conn = seeded();
        let removed =
            delete_comment(&conn, &filter(42), &mut HookContext::new(), HookMode::Strict).unwrap();
        assert!(!removed);
        assert_eq!(store::comment_number(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn wrong_owner_removes_nothing() {
        let conn = seeded();
        let other = CommentFilter {
            user_id: 2,
            ..filter(1)
        };
        let removed =
            delete_comment(&conn, &other, &mut HookContext::new(), HookMode::Lenient).unwrap();
        assert!(!removed);
        assert_eq!(store::count_comments(&conn, &filter(1)).unwrap(), 1);
    }

    #[test]
    fn hook_consumes_the_envelope() {
        let conn = seeded();
        let mut ctx = HookContext::new();
        delete_comment(&conn, &filter(1), &mut ctx, HookMode::Lenient).unwrap();
        assert!(ctx.take_pending_rows().is_none());
    }
}
