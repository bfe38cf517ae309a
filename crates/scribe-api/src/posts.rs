use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use scribe_db::AuditContext;
use scribe_types::api::{
    Claims, CreatePostRequest, DeleteResponse, ListPostRequest, PageQuery, UpdatePostRequest,
};

use crate::{AppState, blocking};

/// POST /posts/me — every post created here carries an audit context, so
/// it is moderated and counted toward the author.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.title.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let audit = AuditContext {
        audit_by: state.audit_by.clone(),
        user_id: claims.sub,
    };
    let post = blocking(&state, move |db| {
        db.create_post(claims.sub, &req.title, &req.content, Some(audit))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_my_posts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let posts = blocking(&state, move |db| db.list_user_posts(claims.sub, page)).await?;
    Ok(Json(posts))
}

pub async fn list_all_posts(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let page = blocking(&state, move |db| db.list_active_posts(page)).await?;
    Ok(Json(page))
}

pub async fn list_posts_by_condition(
    State(state): State<AppState>,
    Json(req): Json<ListPostRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let posts = blocking(&state, move |db| db.list_posts_by_condition(&req)).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let post = blocking(&state, move |db| db.get_post_with_comments(id)).await?;
    Ok(Json(post))
}

pub async fn get_most_commented_post(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    let post = blocking(&state, |db| db.get_most_commented_post()).await?;
    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let post = blocking(&state, move |db| {
        db.update_post(claims.sub, req.id, &req.title, &req.content)
    })
    .await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let removed = blocking(&state, move |db| db.delete_post(claims.sub, id)).await?;
    Ok(Json(DeleteResponse { removed }))
}
