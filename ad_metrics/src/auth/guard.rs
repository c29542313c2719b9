//! Access guard: token presence and role checks.
//!
//! Both checks are plain functions with no storage access, so the HTTP layer
//! (or anything else) can gate an operation without a database round-trip.

use super::{
    errors::{AuthError, AuthResult},
    models::{Identity, Role},
    tokens::TokenIssuer,
};

/// Extract the token from an `Authorization` header value of the form
/// `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Require a valid session token.
///
/// # Errors
///
/// * `AuthError::Unauthorized` - No token supplied
/// * `AuthError::Forbidden` - Token supplied but invalid or expired
pub fn require_authenticated(tokens: &TokenIssuer, token: Option<&str>) -> AuthResult<Identity> {
    let token = token.ok_or(AuthError::Unauthorized)?;

    tokens.verify(token).map_err(|e| {
        log::debug!("Rejected session token: {}", e);
        AuthError::Forbidden
    })
}

/// Require that `identity` holds exactly `role`.
pub fn require_role(identity: &Identity, role: Role) -> AuthResult<()> {
    if identity.role == role {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
