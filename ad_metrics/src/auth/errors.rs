//! Authentication error types.

use crate::db::TimeoutError;
use std::time::Duration;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage round-trip exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidCredentials,

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Malformed or wrongly signed token
    #[error("Invalid token")]
    TokenInvalid,

    /// Token past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// No credential supplied
    #[error("Authentication required")]
    Unauthorized,

    /// Credential supplied but rejected, or role insufficient
    #[error("Access denied")]
    Forbidden,
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Timeout(_) | AuthError::HashingFailed => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for AuthError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => AuthError::Timeout(duration),
            TimeoutError::Database(e) => AuthError::Database(e),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
