//! HTTP-level tests driving the router with in-memory repositories.
//!
//! Covers signup/login, the token and role gate on ad creation, counter
//! endpoints, analytics output, and error responses.

use ad_metrics::ads::AdManager;
use ad_metrics::auth::{AuthConfig, AuthManager, Role, TokenIssuer};
use ad_metrics::db::{MemoryAdRepository, MemoryUserRepository};
use am_server::api::{AppState, create_router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const JWT_SECRET: &str = "test_secret_key_for_testing_only_0123456789";

fn create_test_app() -> Router {
    let config = AuthConfig::new(JWT_SECRET);
    let state = AppState {
        auth_manager: Arc::new(AuthManager::new(
            Arc::new(MemoryUserRepository::new()),
            &config,
        )),
        ad_manager: Arc::new(AdManager::new(Arc::new(MemoryAdRepository::new()))),
    };
    create_router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Sign up and log in, returning the session token.
async fn signup_and_login(app: &Router, username: &str, role: &str) -> String {
    let (status, _) = send_json(
        app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": username, "password": "pw", "role": role})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": username, "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_signup_and_login_flow() {
    let app = create_test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": "analyst", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "analyst");
    assert_eq!(body["role"], "user");
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "analyst", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "analyst");
    assert_eq!(body["role"], "user");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_signup_errors() {
    let app = create_test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": "", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username & password required");

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": "bob", "password": "pw", "role": "superuser"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    signup_and_login(&app, "bob", "user").await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": "bob", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_errors() {
    let app = create_test_app();
    signup_and_login(&app, "carol", "user").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "carol", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "nobody", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_ad_requires_admin_token() {
    let app = create_test_app();
    let ad = json!({"name": "X", "type": "video"});

    // No token
    let (status, body) = send(&app, "POST", "/api/ads", None, Some(ad.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    // Garbage token
    let (status, body) = send(&app, "POST", "/api/ads", Some("not.a.jwt"), Some(ad.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());

    // Valid token, wrong role
    let user_token = signup_and_login(&app, "viewer", "user").await;
    let (status, body) = send(&app, "POST", "/api/ads", Some(user_token.as_str()), Some(ad.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());

    // Admin
    let admin_token = signup_and_login(&app, "boss", "admin").await;
    let (status, body) = send_json(&app, "POST", "/api/ads", Some(admin_token.as_str()), Some(ad)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "X");
    assert_eq!(body["type"], "video");
    assert_eq!(body["impressions"], 0);
    assert_eq!(body["clicks"], 0);
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_role_is_checked_before_the_body() {
    let app = create_test_app();
    let user_token = signup_and_login(&app, "viewer", "user").await;

    // No body at all, then a body with a mistyped field: both are refused on role alone
    let (status, body) = send(&app, "POST", "/api/ads", Some(user_token.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/api/ads",
        Some(user_token.as_str()),
        Some(json!({"name": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let app = create_test_app();
    let admin_token = signup_and_login(&app, "boss", "admin").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/ads",
        Some(admin_token.as_str()),
        Some(json!({"name": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Missing content type
    let (status, body) = send_json(&app, "POST", "/api/ads", Some(admin_token.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({"username": 5, "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_json(&app, "POST", "/api/login", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let app = create_test_app();
    let tokens = TokenIssuer::new(&AuthConfig::new(JWT_SECRET));
    let stale = tokens
        .issue_at(1, Role::Admin, Utc::now() - Duration::hours(3))
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/ads",
        Some(stale.as_str()),
        Some(json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_ad_requires_name() {
    let app = create_test_app();
    let admin_token = signup_and_login(&app, "boss", "admin").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/ads",
        Some(admin_token.as_str()),
        Some(json!({"type": "banner"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_counters_and_analytics() {
    let app = create_test_app();
    let admin_token = signup_and_login(&app, "boss", "admin").await;

    let (_, ad) = send_json(
        &app,
        "POST",
        "/api/ads",
        Some(admin_token.as_str()),
        Some(json!({"name": "X"})),
    )
    .await;
    let id = ad["id"].as_i64().unwrap();

    let (status, body) = send_json(&app, "POST", &format!("/api/ads/{id}/impression"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["impressions"], 1);
    assert_eq!(body["clicks"], 0);

    let (status, body) = send_json(&app, "POST", &format!("/api/ads/{id}/click"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["impressions"], 1);
    assert_eq!(body["clicks"], 1);

    let (status, body) = send_json(&app, "GET", "/api/ads", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send_json(&app, "GET", "/api/analytics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], id);
    assert_eq!(body[0]["CTR"], "100.00");
}

#[tokio::test]
async fn test_analytics_filter_and_sort() {
    let app = create_test_app();
    let admin_token = signup_and_login(&app, "boss", "admin").await;

    let mut ids = Vec::new();
    for (name, ad_type) in [("A", "video"), ("B", "banner"), ("C", "video")] {
        let (_, ad) = send_json(
            &app,
            "POST",
            "/api/ads",
            Some(admin_token.as_str()),
            Some(json!({"name": name, "type": ad_type})),
        )
        .await;
        ids.push(ad["id"].as_i64().unwrap());
    }
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    for _ in 0..4 {
        send(&app, "POST", &format!("/api/ads/{a}/impression"), None, None).await;
    }
    send(&app, "POST", &format!("/api/ads/{a}/click"), None, None).await;
    send(&app, "POST", &format!("/api/ads/{c}/impression"), None, None).await;
    send(&app, "POST", &format!("/api/ads/{c}/click"), None, None).await;

    let (_, body) = send_json(&app, "GET", "/api/analytics?type=video", None, None).await;
    let returned: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(returned, vec![a, c]);
    assert_eq!(body[0]["CTR"], "25.00");

    let (_, body) = send_json(&app, "GET", "/api/analytics?sort=CTR", None, None).await;
    let returned: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(returned, vec![c, a, b]);
    assert_eq!(body[2]["CTR"], 0);

    let (_, body) = send_json(&app, "GET", "/api/analytics?type=&sort=bogus", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["id"], a);
}

#[tokio::test]
async fn test_unknown_ad_is_not_found() {
    let app = create_test_app();

    let (status, body) = send_json(&app, "POST", "/api/ads/999/impression", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send_json(&app, "POST", "/api/ads/999/click", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app();

    let (status, body) = send_json(&app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Route not found"}));
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let (status, body) = send_json(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}
