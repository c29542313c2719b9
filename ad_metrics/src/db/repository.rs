//! Repository trait definitions for testability and dependency injection.
//!
//! The managers are written against these traits. [`PgUserRepository`] and
//! [`PgAdRepository`] are the production implementations; every statement is
//! parameterized and bounded by [`with_default_timeout`].

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::fmt;

use super::timeouts::{TimeoutError, with_default_timeout, with_long_timeout};
use crate::ads::{Ad, AdId, AdResult};
use crate::auth::{AuthError, AuthResult, Role, User, UserId};

/// A user row together with its stored password hash
#[derive(Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// A row whose password has not been marked as hashed yet
#[derive(Clone, PartialEq, Eq)]
pub struct LegacyPassword {
    pub id: UserId,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LegacyPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyPassword")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for StoredUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredUser")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Ad counters that can be incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Impressions,
    Clicks,
}

impl Counter {
    /// Column backing this counter
    pub fn column(&self) -> &'static str {
        match self {
            Counter::Impressions => "impressions",
            Counter::Clicks => "clicks",
        }
    }
}

/// Trait for user/credential repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user whose password is already hashed.
    ///
    /// Fails with `AuthError::UsernameTaken` when the username exists.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> AuthResult<User>;

    /// Find user and stored hash by exact username
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredUser>>;

    /// List rows not yet marked as hashed, ascending id
    async fn list_unhashed(&self) -> AuthResult<Vec<LegacyPassword>>;

    /// Replace a legacy password and mark the row hashed.
    ///
    /// Only applies while the row is still unmarked and still holds
    /// `legacy_value`; returns whether the row was updated.
    async fn replace_legacy_password(
        &self,
        id: UserId,
        legacy_value: &str,
        replacement: &str,
    ) -> AuthResult<bool>;
}

/// Trait for ad/counter repository operations
#[async_trait]
pub trait AdRepository: Send + Sync {
    /// Insert a new ad with zeroed counters
    async fn create_ad(&self, name: &str, ad_type: Option<&str>) -> AdResult<Ad>;

    /// All ads, ascending id
    async fn list_ads(&self) -> AdResult<Vec<Ad>>;

    /// Atomically add one to `counter`; `None` if no ad has that id
    async fn increment(&self, id: AdId, counter: Counter) -> AdResult<Option<Ad>>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> AdResult<()>;
}

const USER_COLUMNS: &str = "id, username, role, COALESCE(created_at, LOCALTIMESTAMP) AS created_at";

const AD_COLUMNS: &str = "id, name, type, COALESCE(impressions, 0) AS impressions, \
     COALESCE(clicks, 0) AS clicks, COALESCE(created_at, LOCALTIMESTAMP) AS created_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        role: Role::from_stored(row.get::<Option<String>, _>("role").as_deref()),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn ad_from_row(row: &PgRow) -> Ad {
    Ad {
        id: row.get("id"),
        name: row.get("name"),
        ad_type: row.get("type"),
        impressions: row.get("impressions"),
        clicks: row.get("clicks"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> AuthResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password, role, password_hashed)
             VALUES ($1, $2, $3, TRUE)
             RETURNING {USER_COLUMNS}"
        );

        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(username)
                .bind(password_hash)
                .bind(role.as_str())
                .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| match e {
            TimeoutError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                AuthError::UsernameTaken
            }
            other => AuthError::from(other),
        })?;

        Ok(user_from_row(&row))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredUser>> {
        let sql = format!("SELECT {USER_COLUMNS}, password FROM users WHERE username = $1");

        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| StoredUser {
            user: user_from_row(&r),
            password_hash: r.get("password"),
        }))
    }

    async fn list_unhashed(&self) -> AuthResult<Vec<LegacyPassword>> {
        let rows = with_long_timeout(
            sqlx::query(
                "SELECT id, username, password FROM users
                 WHERE password_hashed = FALSE
                 ORDER BY id ASC",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .iter()
            .map(|r| LegacyPassword {
                id: r.get("id"),
                username: r.get("username"),
                password: r.get("password"),
            })
            .collect())
    }

    async fn replace_legacy_password(
        &self,
        id: UserId,
        legacy_value: &str,
        replacement: &str,
    ) -> AuthResult<bool> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE users SET password = $1, password_hashed = TRUE
                 WHERE id = $2 AND password_hashed = FALSE AND password = $3",
            )
            .bind(replacement)
            .bind(id)
            .bind(legacy_value)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Default PostgreSQL implementation of `AdRepository`
pub struct PgAdRepository {
    pool: PgPool,
}

impl PgAdRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdRepository for PgAdRepository {
    async fn create_ad(&self, name: &str, ad_type: Option<&str>) -> AdResult<Ad> {
        let sql = format!("INSERT INTO ads (name, type) VALUES ($1, $2) RETURNING {AD_COLUMNS}");

        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(name)
                .bind(ad_type)
                .fetch_one(&self.pool),
        )
        .await?;

        Ok(ad_from_row(&row))
    }

    async fn list_ads(&self) -> AdResult<Vec<Ad>> {
        let sql = format!("SELECT {AD_COLUMNS} FROM ads ORDER BY id ASC");

        let rows = with_default_timeout(sqlx::query(&sql).fetch_all(&self.pool)).await?;

        Ok(rows.iter().map(ad_from_row).collect())
    }

    async fn increment(&self, id: AdId, counter: Counter) -> AdResult<Option<Ad>> {
        // Single-statement read-modify-write; concurrent increments serialize
        // on the row lock instead of overwriting each other.
        let column = counter.column();
        let sql = format!(
            "UPDATE ads SET {column} = COALESCE({column}, 0) + 1
             WHERE id = $1
             RETURNING {AD_COLUMNS}"
        );

        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(ad_from_row))
    }

    async fn health_check(&self) -> AdResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}
