//! Authentication API handlers.
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:5000/api/signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "analyst", "password": "s3cret", "role": "user"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:5000/api/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "analyst", "password": "s3cret"}'
//! ```

use ad_metrics::auth::{AuthError, LoginRequest, RegisterRequest, Role, UserId};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError, request_id::RequestId};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
}

/// Register a new user account.
///
/// # Request Body
///
/// ```json
/// { "username": "analyst", "password": "s3cret", "role": "admin" }
/// ```
///
/// `role` is optional and defaults to `user`.
///
/// # Response
///
/// `201 Created` with `{"id": 1, "username": "analyst", "role": "admin"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing username/password, unknown role or malformed body
/// - `409 Conflict`: Username already taken
/// - `500 Internal Server Error`: Storage failure
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(payload) = payload?;
    let role = payload
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let user = state
        .auth_manager
        .register(RegisterRequest {
            username: payload.username,
            password: payload.password,
            role,
        })
        .await?;

    metrics::auth_events_total(metrics::AuthEvent::Signup);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            username: user.username,
            role: user.role,
        }),
    ))
}

/// Authenticate a user and issue a session token.
///
/// # Response
///
/// `200 OK` with `{"token": "eyJ...", "username": "analyst", "role": "user"}`.
/// The token is valid for two hours by default.
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, wrong password or malformed body
/// - `404 Not Found`: Unknown username
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let username = payload.username.clone();

    match state
        .auth_manager
        .login(LoginRequest {
            username: payload.username,
            password: payload.password,
        })
        .await
    {
        Ok((user, token)) => {
            metrics::auth_events_total(metrics::AuthEvent::LoginSuccess);
            Ok(Json(LoginResponse {
                token,
                username: user.username,
                role: user.role,
            }))
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials | AuthError::UserNotFound) {
                metrics::auth_events_total(metrics::AuthEvent::LoginFailure);
                logging::log_security_event(
                    "failed_login",
                    None,
                    Some(request_id.as_str()),
                    &format!("Failed login for user {}: {}", username, e),
                );
            }
            Err(e.into())
        }
    }
}
