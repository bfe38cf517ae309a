//! Row-level primitives the aggregate layer runs inside a unit of work.
//!
//! Every function takes a plain `&Connection`, so callers pass the open
//! `Transaction` and all statements share its commit or rollback.

use rusqlite::{Connection, OptionalExtension, params};

use scribe_types::models::{Comment, Post};
use scribe_types::{COMMENT_STATUS_NONE, COMMENT_STATUS_TRENDING};

use crate::error::{DbError, Result};
use crate::models::{
    COMMENT_COLUMNS, CommentFilter, NewPost, POST_COLUMNS, USER_COLUMNS, UserRow, comment_from_row,
    post_from_row, user_from_row,
};

const COMMENT_FILTER: &str = "id = ?1 AND user_id = ?2 AND post_id = ?3";

// -- Reads --

pub fn first_user(conn: &Connection, id: i64) -> Result<UserRow> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND deleted_at IS NULL"),
        [id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("user", id))
}

pub fn first_post(conn: &Connection, id: i64) -> Result<Post> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1 AND deleted_at IS NULL"),
        [id],
        post_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("post", id))
}

pub fn post_title_exists(conn: &Connection, title: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM posts WHERE title = ?1 AND deleted_at IS NULL",
            [title],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

// -- Creates --

pub fn create_post(conn: &Connection, post: &NewPost) -> Result<i64> {
    conn.execute(
        "INSERT INTO posts (user_id, title, content, audit_by, audit_version, audit_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            post.user_id,
            post.title,
            post.content,
            post.audit.audit_by,
            post.audit.audit_version,
            post.audit.audit_status,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create_comment(conn: &Connection, user_id: i64, post_id: i64, content: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO comments (user_id, post_id, content) VALUES (?1, ?2, ?3)",
        params![user_id, post_id, content],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn first_comment(conn: &Connection, id: i64) -> Result<Comment> {
    conn.query_row(
        &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1 AND deleted_at IS NULL"),
        [id],
        comment_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("comment", id))
}

// -- Deletes --

pub fn count_comments(conn: &Connection, filter: &CommentFilter) -> Result<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM comments WHERE {COMMENT_FILTER}"),
        params![filter.id, filter.user_id, filter.post_id],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Physical delete. Returns the affected-row count.
pub fn delete_comments(conn: &Connection, filter: &CommentFilter) -> Result<i64> {
    let affected = conn.execute(
        &format!("DELETE FROM comments WHERE {COMMENT_FILTER}"),
        params![filter.id, filter.user_id, filter.post_id],
    )?;
    Ok(affected as i64)
}

// -- Counter columns --
//
// Each save is one atomic UPDATE, so concurrent writers cannot lose an
// increment between a read and a write-back. Zero changed rows means the
// target row is gone.

pub fn increment_post_number(conn: &Connection, user_id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE users
         SET post_number = post_number + 1,
             updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
         WHERE id = ?1 AND deleted_at IS NULL",
        [user_id],
    )?;
    expect_changed(changed, "user", user_id)
}

pub fn increment_comment_number(conn: &Connection, post_id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE posts
         SET comment_number = comment_number + 1,
             comment_status = ?2
         WHERE id = ?1 AND deleted_at IS NULL",
        params![post_id, COMMENT_STATUS_TRENDING],
    )?;
    expect_changed(changed, "post", post_id)
}

/// Decrement with a floor of zero. Column references on the right-hand
/// side see the pre-update value.
pub fn decrement_comment_number(conn: &Connection, post_id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE posts
         SET comment_number = MAX(comment_number - 1, 0),
             comment_status = CASE WHEN comment_number <= 1 THEN ?2 ELSE comment_status END
         WHERE id = ?1 AND deleted_at IS NULL",
        params![post_id, COMMENT_STATUS_NONE],
    )?;
    expect_changed(changed, "post", post_id)
}

pub fn comment_number(conn: &Connection, post_id: i64) -> Result<u32> {
    let n = conn.query_row(
        "SELECT comment_number FROM posts WHERE id = ?1",
        [post_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

pub fn post_number(conn: &Connection, user_id: i64) -> Result<u32> {
    let n = conn.query_row(
        "SELECT post_number FROM users WHERE id = ?1",
        [user_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

fn expect_changed(changed: usize, what: &str, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(DbError::not_found(what, id));
    }
    Ok(())
}
