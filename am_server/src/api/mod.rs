//! HTTP API for the ad-metrics server.
//!
//! # Modules
//!
//! - [`auth`]: Signup and login
//! - [`ads`]: Ad creation, counters, and analytics
//! - [`middleware`]: Bearer-token authentication and the admin role gate
//! - [`request_id`]: Request id propagation, request logging and metrics
//! - [`error`]: Mapping of library errors to HTTP responses
//!
//! # Endpoints Overview
//!
//! ## Authentication (No Auth Required)
//! - `POST /api/signup` - Register new user
//! - `POST /api/login` - Login and receive a session token
//!
//! ## Ads
//! - `POST /api/ads` - Create ad (admin token required)
//! - `GET /api/ads` - List ads
//! - `POST /api/ads/{id}/impression` - Record an impression
//! - `POST /api/ads/{id}/click` - Record a click
//! - `GET /api/analytics?type=&sort=` - Per-ad analytics with CTR
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use am_server::api::{create_router, AppState};
//! use ad_metrics::{ads::AdManager, auth::{AuthConfig, AuthManager}};
//! use std::sync::Arc;
//! # use sqlx::PgPool;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool: Arc<PgPool> = unimplemented!();
//!
//! let config = AuthConfig::new("a-secret-of-at-least-32-characters!!");
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::with_pool(pool.clone(), &config)),
//!     ad_manager: Arc::new(AdManager::with_pool(pool)),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod ads;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod request_id;

use ad_metrics::{ads::AdManager, auth::AuthManager};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; both managers sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub ad_manager: Arc<AdManager>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET  /health                      - Health check (public)
/// POST /api/signup                  - Register user (public)
/// POST /api/login                   - Login (public)
/// GET  /api/ads                     - List ads (public)
/// POST /api/ads                     - Create ad (admin)
/// POST /api/ads/{id}/impression     - Record impression (public)
/// POST /api/ads/{id}/click          - Record click (public)
/// GET  /api/analytics               - Analytics (public)
/// ```
///
/// Any other path answers `404 {"error": "Route not found"}`.
pub fn create_router(state: AppState) -> Router {
    let create_ad = post(ads::create_ad)
        .route_layer(axum::middleware::from_fn(middleware::admin_middleware))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));
    let ads_route = get(ads::list_ads).merge(create_ad);

    let api_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/ads", ads_route)
        .route("/ads/{id}/impression", post(ads::record_impression))
        .route("/ads/{id}/click", post(ads::record_click))
        .route("/analytics", get(ads::analytics));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn route_not_found() -> error::ApiError {
    error::ApiError::not_found("Route not found")
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:5000/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.ad_manager.health_check().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
