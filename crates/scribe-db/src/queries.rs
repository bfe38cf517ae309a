use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::info;

use scribe_types::AUDIT_STATUS_ACTIVE;
use scribe_types::api::{ListPostRequest, PagePostResponse, PageQuery, UserStatistic};
use scribe_types::models::{AuditFields, Comment, Post, User};

use crate::context::{AuditContext, HookContext};
use crate::error::{DbError, Result};
use crate::models::{
    COMMENT_COLUMNS, CommentFilter, NewPost, POST_COLUMNS, USER_COLUMNS, UserRow, comment_from_row,
    format_timestamp, post_from_row, user_from_row,
};
use crate::{Database, hooks, relay, store};

/// Comments attached to single-post reads.
const LATEST_COMMENTS: i64 = 2;

/// Normalizes page parameters into `(limit, offset)`.
///
/// Page numbers below 1 become 1. Sizes above 100 are capped at 100 and
/// non-positive sizes fall back to 10.
pub fn paginate(page_no: i64, page_size: i64) -> (i64, i64) {
    let page_no = page_no.max(1);
    let page_size = match page_size {
        s if s > 100 => 100,
        s if s <= 0 => 10,
        s => s,
    };
    (page_size, (page_no - 1) * page_size)
}

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        self.unit_of_work(|tx| {
            if query_user_by(tx, "username", username)?.is_some() {
                return Err(DbError::Conflict("Username already exists".into()));
            }
            if query_user_by(tx, "email", email)?.is_some() {
                return Err(DbError::Conflict("Email already exists".into()));
            }

            tx.execute(
                "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            )?;
            let user = store::first_user(tx, tx.last_insert_rowid())?;
            info!(user_id = user.id, username, "User created");
            Ok(user.into_user())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User> {
        self.with_conn(|conn| Ok(store::first_user(conn, id)?.into_user()))
    }

    /// Changes the user's email when a different one is given.
    pub fn update_user_email(&self, id: i64, email: Option<&str>) -> Result<User> {
        self.unit_of_work(|tx| {
            let user = store::first_user(tx, id)?;
            let Some(email) = email.filter(|e| !e.is_empty() && *e != user.email) else {
                return Ok(user.into_user());
            };

            if query_user_by(tx, "email", email)?.is_some() {
                return Err(DbError::Conflict("Email already exists".into()));
            }
            tx.execute(
                "UPDATE users SET email = ?2, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
                 WHERE id = ?1",
                params![id, email],
            )?;
            Ok(store::first_user(tx, id)?.into_user())
        })
    }

    /// Post counts per author and audit status.
    pub fn audit_status_statistics(&self) -> Result<Vec<UserStatistic>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.username, p.audit_status, COUNT(*)
                 FROM posts p
                 LEFT JOIN users u ON p.user_id = u.id
                 WHERE p.deleted_at IS NULL
                 GROUP BY u.username, p.audit_status
                 ORDER BY u.username, p.audit_status",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserStatistic {
                        username: row.get(0)?,
                        audit_status: row.get(1)?,
                        audit_status_count: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Posts --

    /// Inserts a post and maintains its aggregates in one unit of work.
    ///
    /// With `audit`, the title goes through moderation and the author's
    /// `post_number` is incremented. Without it, both steps are skipped.
    pub fn create_post(
        &self,
        user_id: i64,
        title: &str,
        content: &str,
        audit: Option<AuditContext>,
    ) -> Result<Post> {
        self.unit_of_work(|tx| {
            if store::post_title_exists(tx, title)? {
                return Err(DbError::Conflict("Post title exist".into()));
            }

            let mut ctx = HookContext::new();
            if let Some(audit) = audit {
                ctx = ctx.with_audit(audit);
            }

            let mut post = NewPost {
                user_id,
                title: title.to_string(),
                content: content.to_string(),
                audit: AuditFields::default(),
            };
            hooks::before_post_create(&mut post, &ctx);
            let id = store::create_post(tx, &post)?;
            hooks::after_post_create(tx, &mut ctx, self.hook_mode())?;

            info!(post_id = id, user_id, audit_status = %post.audit.audit_status, "Post created");
            store::first_post(tx, id)
        })
    }

    pub fn list_user_posts(&self, user_id: i64, page: PageQuery) -> Result<Vec<Post>> {
        let (limit, offset) = paginate(page.page_no, page.page_size);
        self.with_conn(|conn| {
            query_posts(
                conn,
                &format!(
                    "SELECT {POST_COLUMNS} FROM posts
                     WHERE user_id = ?1 AND deleted_at IS NULL
                     ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
                ),
                vec![Value::Integer(user_id), Value::Integer(limit), Value::Integer(offset)],
            )
        })
    }

    /// One page of moderation-approved posts plus their total.
    pub fn list_active_posts(&self, page: PageQuery) -> Result<PagePostResponse> {
        let (limit, offset) = paginate(page.page_no, page.page_size);
        self.with_conn(|conn| {
            let posts = query_posts(
                conn,
                &format!(
                    "SELECT {POST_COLUMNS} FROM posts
                     WHERE audit_status = ?1 AND deleted_at IS NULL
                     ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
                ),
                vec![
                    Value::Text(AUDIT_STATUS_ACTIVE.into()),
                    Value::Integer(limit),
                    Value::Integer(offset),
                ],
            )?;
            let total = conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE audit_status = ?1 AND deleted_at IS NULL",
                [AUDIT_STATUS_ACTIVE],
                |r| r.get(0),
            )?;
            Ok(PagePostResponse { total, posts })
        })
    }

    pub fn list_posts_by_condition(&self, req: &ListPostRequest) -> Result<Vec<Post>> {
        let (limit, offset) = paginate(req.page_no, req.page_size);

        let mut sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE deleted_at IS NULL AND audit_status = ?"
        );
        let mut values = vec![Value::Text(AUDIT_STATUS_ACTIVE.into())];

        // The range only applies when both ends are given.
        if let (Some(start), Some(end)) = (&req.created_at_start, &req.created_at_end) {
            sql.push_str(" AND created_at BETWEEN ? AND ?");
            values.push(Value::Text(format_timestamp(start)));
            values.push(Value::Text(format_timestamp(end)));
        }
        sql.push_str(" AND comment_number >= ?");
        values.push(Value::Integer(req.min_comment_number.unwrap_or(0).into()));
        if !req.title.is_empty() {
            sql.push_str(" AND title LIKE ?");
            values.push(Value::Text(format!("%{}%", req.title)));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));

        self.with_conn(|conn| query_posts(conn, &sql, values))
    }

    /// Loads a post with its latest comments.
    pub fn get_post_with_comments(&self, id: i64) -> Result<Post> {
        self.with_conn(|conn| {
            let mut post = store::first_post(conn, id)?;
            post.comments = query_comments(conn, id, LATEST_COMMENTS, 0)?;
            Ok(post)
        })
    }

    /// The post with the highest `comment_number` (lowest id on ties),
    /// with its latest comments.
    pub fn get_most_commented_post(&self) -> Result<Post> {
        self.with_conn(|conn| {
            let mut post = conn
                .query_row(
                    &format!(
                        "SELECT {POST_COLUMNS} FROM posts WHERE deleted_at IS NULL
                         ORDER BY comment_number DESC, id ASC LIMIT 1"
                    ),
                    [],
                    post_from_row,
                )
                .optional()?
                .ok_or_else(|| DbError::NotFound("post".into()))?;
            post.comments = query_comments(conn, post.id, LATEST_COMMENTS, 0)?;
            Ok(post)
        })
    }

    /// Rewrites title and content of a post owned by `user_id`.
    pub fn update_post(&self, user_id: i64, id: i64, title: &str, content: &str) -> Result<Post> {
        self.unit_of_work(|tx| {
            let changed = tx.execute(
                "UPDATE posts
                 SET title = ?3, content = ?4, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
                 WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
                params![id, user_id, title, content],
            )?;
            if changed == 0 {
                return Err(DbError::not_found("post", id));
            }
            store::first_post(tx, id)
        })
    }

    /// Physically deletes a post owned by `user_id`; its comments cascade.
    /// The author's `post_number` is left as is.
    pub fn delete_post(&self, user_id: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM posts WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(affected > 0)
        })
    }

    // -- Comments --

    /// Inserts a comment and bumps the parent post's counter in one unit
    /// of work.
    pub fn create_comment(&self, user_id: i64, post_id: i64, content: &str) -> Result<Comment> {
        self.unit_of_work(|tx| {
            store::first_post(tx, post_id)?;

            let mut ctx = HookContext::new().with_target_post(post_id);
            let id = store::create_comment(tx, user_id, post_id, content)?;
            hooks::after_comment_create(tx, &mut ctx, self.hook_mode())?;

            info!(comment_id = id, post_id, user_id, "Comment created");
            store::first_comment(tx, id)
        })
    }

    pub fn list_comments(&self, post_id: i64, page: PageQuery) -> Result<Vec<Comment>> {
        let (limit, offset) = paginate(page.page_no, page.page_size);
        self.with_conn(|conn| query_comments(conn, post_id, limit, offset))
    }

    /// Deletes the comment matching all three ids. Returns whether a row
    /// was removed; a miss is not an error.
    pub fn delete_comment(&self, user_id: i64, post_id: i64, id: i64) -> Result<bool> {
        let filter = CommentFilter { id, user_id, post_id };
        self.unit_of_work(|tx| {
            relay::delete_comment(tx, &filter, &mut HookContext::new(), self.hook_mode())
        })
    }
}

fn query_user_by(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1 AND deleted_at IS NULL"),
            [value],
            user_from_row,
        )
        .optional()?;
    Ok(row)
}

fn query_posts(conn: &Connection, sql: &str, values: Vec<Value>) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), post_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_comments(conn: &Connection, post_id: i64, limit: i64, offset: i64) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments
         WHERE post_id = ?1 AND deleted_at IS NULL
         ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt
        .query_map(params![post_id, limit, offset], comment_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
