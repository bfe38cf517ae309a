use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use scribe_types::api::{Claims, CreateCommentRequest, DeleteResponse, PageQuery};

use crate::{AppState, blocking};

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.content.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let comment = blocking(&state, move |db| {
        db.create_comment(claims.sub, req.post_id, &req.content)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let comments = blocking(&state, move |db| db.list_comments(post_id, page)).await?;
    Ok(Json(comments))
}

/// DELETE /comments/me/{post_id}/{id} — `removed: false` when nothing
/// matched; that is still a 200.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, StatusCode> {
    let removed = blocking(&state, move |db| db.delete_comment(claims.sub, post_id, id)).await?;
    Ok(Json(DeleteResponse { removed }))
}
