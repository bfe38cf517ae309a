use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use scribe_api::{AppState, AppStateInner, router};
use scribe_db::Database;

fn app() -> Router {
    app_with_state().0
}

fn app_with_state() -> (Router, AppState) {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        audit_by: "bob".into(),
    });
    (router::build(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router) -> (String, i64) {
    let (status, user) = send(
        app,
        Method::POST,
        "/api/v1/users/register",
        None,
        Some(json!({ "username": "admin", "email": "admin@example.com", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["post_number"], 0);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/users/login",
        None,
        Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (body["token"].as_str().unwrap().to_string(), body["user"]["id"].as_i64().unwrap())
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let app = app();
    login(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/users/login",
        None,
        Some(json!({ "username": "admin", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_and_comment_flow_updates_counters() {
    let app = app();
    let (token, _) = login(&app).await;

    let (status, post) = send(
        &app,
        Method::POST,
        "/api/v1/posts/me",
        Some(&token),
        Some(json!({ "title": "hello", "content": "hello world" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = post["id"].as_i64().unwrap();

    let (_, me) = send(&app, Method::GET, "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(me["post_number"], 1);

    let mut comment_ids = Vec::new();
    for content in ["one", "two"] {
        let (status, comment) = send(
            &app,
            Method::POST,
            "/api/v1/comments",
            Some(&token),
            Some(json!({ "post_id": post_id, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        comment_ids.push(comment["id"].as_i64().unwrap());
    }

    let (_, post) = send(&app, Method::GET, &format!("/api/v1/posts/{}", post_id), None, None).await;
    assert_eq!(post["comment_number"], 2);
    assert_eq!(post["comment_status"], "trending");

    let uri = format!("/api/v1/comments/me/{}/{}", post_id, comment_ids[0]);
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], false);

    let (_, post) = send(&app, Method::GET, &format!("/api/v1/posts/{}", post_id), None, None).await;
    assert_eq!(post["comment_number"], 1);

    let (_, page) = send(&app, Method::GET, "/api/v1/posts?pageNo=1&pageSize=5", None, None).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn missing_rows_answer_conflict() {
    let app = app();
    let (token, _) = login(&app).await;

    let (status, _) = send(&app, Method::GET, "/api/v1/posts/404", None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/comments",
        Some(&token),
        Some(json!({ "post_id": 404, "content": "orphan" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn flagged_posts_stay_out_of_public_listing() {
    let app = app();
    let (token, _) = login(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/posts/me",
        Some(&token),
        Some(json!({ "title": "金融 advice", "content": "..." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = send(&app, Method::GET, "/api/v1/posts", None, None).await;
    assert_eq!(page["total"], 0);

    let (_, stats) = send(&app, Method::GET, "/api/v1/users/sta", None, None).await;
    assert_eq!(stats[0]["audit_status"], "inactive");
    assert_eq!(stats[0]["audit_status_count"], 1);
}

#[tokio::test]
async fn username_limits_count_characters() {
    let app = app();
    let (status, user) = send(
        &app,
        Method::POST,
        "/api/v1/users/register",
        None,
        Some(json!({ "username": "张三李四王五六", "email": "zs@example.com", "password": "密码密码密码" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "张三李四王五六");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/users/register",
        None,
        Some(json!({ "username": "张三", "email": "z2@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_update_rejects_malformed_email() {
    let app = app();
    let (token, _) = login(&app).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, me) = send(&app, Method::GET, "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@example.com");

    let (status, me) = send(
        &app,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "email": "root@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "root@example.com");
}

#[tokio::test]
async fn deleted_account_profile_is_not_found() {
    let (app, state) = app_with_state();
    let (token, uid) = login(&app).await;

    state
        .db
        .with_conn(|conn| {
            conn.execute("UPDATE users SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?1", [uid])?;
            Ok(())
        })
        .unwrap();

    let (status, _) = send(&app, Method::GET, "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
