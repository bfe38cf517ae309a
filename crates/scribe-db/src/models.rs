//! Database row types and the mappers that turn SQLite rows into
//! scribe-types models.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use scribe_types::models::{AuditFields, Comment, Post, User};

/// Full user row, including the password hash that never leaves the server.
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub post_number: u32,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            post_number: self.post_number,
            created_at: self.created_at,
        }
    }
}

/// Insert payload for a post. `audit` is filled in by the moderation gate.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub audit: AuditFields,
}

/// Predicate shared by the pre-delete count and the delete itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentFilter {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}

pub(crate) const USER_COLUMNS: &str = "id, username, email, password, post_number, created_at";

pub(crate) const POST_COLUMNS: &str = "id, user_id, title, content, comment_number, comment_status, \
     audit_by, audit_version, audit_status, created_at, updated_at";

pub(crate) const COMMENT_COLUMNS: &str = "id, user_id, post_id, content, created_at, updated_at";

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        post_number: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
    })
}

pub(crate) fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        comment_number: row.get(4)?,
        comment_status: row.get(5)?,
        audit: AuditFields {
            audit_by: row.get(6)?,
            audit_version: row.get(7)?,
            audit_status: row.get(8)?,
        },
        created_at: timestamp_at(row, 9)?,
        updated_at: timestamp_at(row, 10)?,
        comments: Vec::new(),
    })
}

pub(crate) fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        post_id: row.get(2)?,
        content: row.get(3)?,
        created_at: timestamp_at(row, 4)?,
        updated_at: timestamp_at(row, 5)?,
    })
}

// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.SSS" without timezone.
// Parse as naive UTC.
fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Format used for timestamps bound as query parameters, matching the
/// column defaults so text comparison orders correctly.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
