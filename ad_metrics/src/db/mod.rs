//! Database module providing PostgreSQL connection pooling and repositories.
//!
//! This module manages the database connection pool using sqlx, bootstraps the
//! `users` and `ads` tables, and exposes the repository traits the managers are
//! written against. An in-memory implementation of each repository lives in
//! [`memory`] for tests and database-less development.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::{MemoryAdRepository, MemoryUserRepository};
pub use repository::{
    AdRepository, Counter, LegacyPassword, PgAdRepository, PgUserRepository, StoredUser,
    UserRepository,
};
pub use timeouts::{TimeoutError, TimeoutResult};

/// Schema statements applied by [`Database::init_schema`], in order.
///
/// The column types match tables created by earlier deployments so that an
/// existing database is adopted as-is; `password_hashed` is the only addition.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS ads (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        type VARCHAR(100),
        impressions INT DEFAULT 0,
        clicks INT DEFAULT 0,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(255) UNIQUE NOT NULL,
        password VARCHAR(255) NOT NULL,
        role VARCHAR(50) DEFAULT 'user',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    "ALTER TABLE users ADD COLUMN IF NOT EXISTS password_hashed BOOLEAN NOT NULL DEFAULT FALSE",
];

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ad_metrics::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let db = Database::new(&DatabaseConfig::development()).await?;
    ///     db.init_schema().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `ads` and `users` tables if they do not exist yet and add
    /// the `password_hashed` marker column to older `users` tables.
    ///
    /// Rows that predate the marker column get `password_hashed = FALSE` and
    /// are picked up by the startup credential sweep.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        log::info!("Database schema ready");
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
