//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AuthConfig, Identity, LoginRequest, MigrationReport, RegisterRequest, User},
    tokens::TokenIssuer,
};
use crate::db::{PgUserRepository, UserRepository};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use std::sync::Arc;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User repository
    /// * `config` - Token signing configuration
    pub fn new(users: Arc<dyn UserRepository>, config: &AuthConfig) -> Self {
        Self {
            users,
            tokens: TokenIssuer::new(config),
        }
    }

    /// Create an authentication manager backed by PostgreSQL
    pub fn with_pool(pool: Arc<PgPool>, config: &AuthConfig) -> Self {
        Self::new(Arc::new(PgUserRepository::new(pool.as_ref().clone())), config)
    }

    /// Token issuer/verifier shared by this manager
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Username or password empty
    /// * `AuthError::UsernameTaken` - Username already exists
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation(
                "Username & password required".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let role = request.role.unwrap_or_default();

        let user = self
            .users
            .create_user(&request.username, &password_hash, role)
            .await?;

        log::info!("Registered user {} ({}) as {}", user.username, user.id, user.role);
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Username or password empty
    /// * `AuthError::UserNotFound` - User doesn't exist
    /// * `AuthError::InvalidCredentials` - Incorrect password
    pub async fn authenticate(&self, request: &LoginRequest) -> AuthResult<User> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation(
                "Username & password required".to_string(),
            ));
        }

        let stored = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(&request.password, &stored.password_hash)?;

        Ok(stored.user)
    }

    /// Authenticate and mint a session token
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, String)> {
        let user = self.authenticate(&request).await?;
        let token = self.tokens.issue(user.id, user.role)?;

        Ok((user, token))
    }

    /// Verify a session token
    pub fn verify_token(&self, token: &str) -> AuthResult<Identity> {
        self.tokens.verify(token)
    }

    /// Hash every password not yet marked as hashed.
    ///
    /// Meant to be awaited once at startup before requests are served. Each
    /// row is updated on its own, keyed by id and guarded by its previous
    /// value, so signups or other writers running concurrently are never
    /// overwritten. Values that already are Argon2 PHC strings or bcrypt hashes
    /// are only marked.
    pub async fn migrate_legacy_passwords(&self) -> AuthResult<MigrationReport> {
        let pending = self.users.list_unhashed().await?;
        let mut report = MigrationReport {
            scanned: pending.len(),
            ..MigrationReport::default()
        };

        for row in pending {
            let already_hashed =
                is_bcrypt_hash(&row.password) || PasswordHash::new(&row.password).is_ok();
            let replacement = if already_hashed {
                row.password.clone()
            } else {
                hash_password(&row.password)?
            };

            let updated = self
                .users
                .replace_legacy_password(row.id, &row.password, &replacement)
                .await?;

            match (updated, already_hashed) {
                (false, _) => {
                    log::warn!("User {} changed during password migration, skipped", row.id);
                    report.skipped += 1;
                }
                (true, true) => report.already_hashed += 1,
                (true, false) => {
                    log::info!("Hashed password for user: {}", row.username);
                    report.hashed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Hash password with Argon2id and a random salt
fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::HashingFailed)?
        .to_string())
}

/// Modular crypt prefixes written by bcrypt implementations
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

fn is_bcrypt_hash(value: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

/// Verify password against hash
///
/// New hashes are Argon2id; bcrypt hashes carried over from older deployments
/// are still accepted.
fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    if is_bcrypt_hash(hash) {
        return match bcrypt::verify(password, hash) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(AuthError::InvalidCredentials),
        };
    }

    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
