//! HTTP error mapping.
//!
//! Library errors convert into [`ApiError`], which renders as
//! `{"error": "<message>"}` with the matching status. Authentication failures
//! (401/403) carry an empty body.

use ad_metrics::{ads::AdError, auth::AuthError};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned from API handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: None,
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.message {
            Some(error) => (self.status, Json(ErrorResponse { error })).into_response(),
            None => self.status.into_response(),
        }
    }
}

// Malformed, mistyped or missing JSON bodies are client errors like any other
// validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Validation(_) | AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Unauthorized => return Self::unauthorized(),
            AuthError::Forbidden | AuthError::TokenInvalid | AuthError::TokenExpired => {
                return Self::forbidden();
            }
            AuthError::Database(_) | AuthError::Timeout(_) | AuthError::HashingFailed => {
                log::error!("Auth operation failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.client_message())
    }
}

impl From<AdError> for ApiError {
    fn from(err: AdError) -> Self {
        let status = match &err {
            AdError::Validation(_) => StatusCode::BAD_REQUEST,
            AdError::AdNotFound(_) => StatusCode::NOT_FOUND,
            AdError::Database(_) | AdError::Timeout(_) | AdError::CounterOverflow(_) => {
                log::error!("Ad operation failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.client_message())
    }
}
