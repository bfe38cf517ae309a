use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use scribe_db::DbError;
use scribe_types::api::{Claims, UpdateUserRequest};

use crate::auth::looks_like_email;
use crate::{AppState, blocking, blocking_with, db_status};

/// A token whose account is gone answers 404 on the profile routes.
fn profile_status(err: DbError) -> StatusCode {
    match err {
        DbError::NotFound(_) => StatusCode::NOT_FOUND,
        other => db_status(other),
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = blocking_with(&state, move |db| db.get_user_by_id(claims.sub), profile_status).await?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Empty means "leave unchanged"
    if let Some(email) = req.email.as_deref() {
        if !email.is_empty() && !looks_like_email(email) {
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let user = blocking_with(
        &state,
        move |db| db.update_user_email(claims.sub, req.email.as_deref()),
        profile_status,
    )
    .await?;

    Ok(Json(user))
}

/// GET /users/sta — post counts per author and moderation outcome.
pub async fn audit_statistics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    let stats = blocking(&state, |db| db.audit_status_statistics()).await?;
    Ok(Json(stats))
}
