use axum::{
    Json, Router, middleware,
    routing::{delete, get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::{AppState, auth, comments, posts, users};

pub fn build(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users/register", post(auth::register))
        .route("/users/login", post(auth::login))
        .route("/users/sta", get(users::audit_statistics))
        .route("/posts", get(posts::list_all_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/condition", post(posts::list_posts_by_condition))
        .route("/posts/comment/number/max", get(posts::get_most_commented_post))
        .route("/comments/{post_id}", get(comments::list_comments))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/me", get(users::get_profile).put(users::update_profile))
        .route(
            "/posts/me",
            post(posts::create_post)
                .get(posts::list_my_posts)
                .put(posts::update_post),
        )
        .route("/posts/me/{id}", delete(posts::delete_post))
        .route("/comments", post(comments::create_comment))
        .route("/comments/me/{post_id}/{id}", delete(comments::delete_comment))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
