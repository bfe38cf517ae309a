use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Post, User};

// -- JWT Claims --

/// JWT claims issued at login and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// One row of the per-user moderation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistic {
    pub username: Option<String>,
    pub audit_status: String,
    pub audit_status_count: u32,
}

// -- Posts --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// Filter for `POST /posts/condition`. Every field is optional; the
/// created-at range only applies when both ends are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostRequest {
    #[serde(default)]
    pub page_no: i64,
    #[serde(default)]
    pub page_size: i64,
    #[serde(default)]
    pub title: String,
    pub min_comment_number: Option<u32>,
    pub created_at_start: Option<DateTime<Utc>>,
    pub created_at_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PagePostResponse {
    pub total: i64,
    pub posts: Vec<Post>,
}

// -- Comments --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub removed: bool,
}

// -- Paging --

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "pageNo", default = "default_page_no")]
    pub page_no: i64,
    #[serde(rename = "pageSize", default = "default_page_size")]
    pub page_size: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_no: default_page_no(),
            page_size: default_page_size(),
        }
    }
}

fn default_page_no() -> i64 {
    1
}

fn default_page_size() -> i64 {
    5
}
