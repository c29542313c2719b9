//! Ad error types.

use super::models::AdId;
use crate::db::TimeoutError;
use std::time::Duration;
use thiserror::Error;

/// Ad errors
#[derive(Debug, Error)]
pub enum AdError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage round-trip exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Ad not found
    #[error("Ad {0} not found")]
    AdNotFound(AdId),

    /// Counter would exceed the storage column range
    #[error("Counter overflow on ad {0}")]
    CounterOverflow(AdId),
}

impl AdError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            AdError::Database(_) | AdError::Timeout(_) | AdError::CounterOverflow(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for AdError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => AdError::Timeout(duration),
            TimeoutError::Database(e) => AdError::Database(e),
        }
    }
}

/// Result type for ad operations
pub type AdResult<T> = Result<T, AdError>;
