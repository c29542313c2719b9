//! Authentication module providing user registration, login, and access control.
//!
//! This module implements:
//! - Argon2id password hashing with per-password salt
//! - One-shot startup migration of legacy plaintext passwords
//! - Stateless JWT session tokens (2-hour expiry, no refresh)
//! - Token presence and role checks for privileged operations
//!
//! ## Example
//!
//! ```no_run
//! use ad_metrics::auth::{AuthConfig, AuthManager, LoginRequest, RegisterRequest};
//! use ad_metrics::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::with_pool(
//!         Arc::new(db.pool().clone()),
//!         &AuthConfig::new("jwt_secret_at_least_32_characters_long"),
//!     );
//!
//!     let request = RegisterRequest {
//!         username: "analyst".to_string(),
//!         password: "pw".to_string(),
//!         role: None,
//!     };
//!     auth.register(request).await?;
//!
//!     let (user, token) = auth
//!         .login(LoginRequest { username: "analyst".to_string(), password: "pw".to_string() })
//!         .await?;
//!     println!("{} logged in as {}: {}", user.username, user.role, token);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod guard;
pub mod manager;
pub mod models;
pub mod tokens;

pub use errors::{AuthError, AuthResult};
pub use guard::{bearer_token, require_authenticated, require_role};
pub use manager::AuthManager;
pub use models::{
    AuthConfig, DEFAULT_TOKEN_TTL, Identity, LoginRequest, MigrationReport, RegisterRequest,
    Role, TokenClaims, User, UserId,
};
pub use tokens::TokenIssuer;
