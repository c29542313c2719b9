//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, role, iat, exp}`. Nothing is stored
//! server-side: every protected request reconstructs the identity from the
//! token alone, so verification is pure computation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AuthConfig, Identity, Role, TokenClaims, UserId},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

/// Mints and validates signed session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the startup configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock-skew grace period.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid for the configured lifetime from now
    pub fn issue(&self, user_id: UserId, role: Role) -> AuthResult<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = TokenClaims {
            sub: user_id,
            role,
            exp: (issued_at + self.ttl).timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            log::error!("Failed to sign session token: {}", e);
            AuthError::TokenInvalid
        })
    }

    /// Verify a token and return the identity it asserts
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenExpired` - Signature valid but the lifetime elapsed
    /// * `AuthError::TokenInvalid` - Malformed token or signature mismatch
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            },
        )?;

        Ok(Identity::from(&data.claims))
    }
}
