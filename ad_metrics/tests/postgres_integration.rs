//! Integration tests against a real PostgreSQL instance.
//!
//! Ignored by default; run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use ad_metrics::ads::{AdError, AdManager, NewAd};
use ad_metrics::auth::{AuthConfig, AuthError, AuthManager, LoginRequest, RegisterRequest};
use ad_metrics::db::{Database, DatabaseConfig};
use sqlx::PgPool;
use std::sync::Arc;

/// Helper to create a test database pool with the schema in place
async fn setup_test_db() -> Arc<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/ad_analytics_test".to_string());

    let config = DatabaseConfig {
        database_url,
        max_connections: 10,
        min_connections: 1,
        connection_timeout_secs: 5,
        idle_timeout_secs: 300,
        max_lifetime_secs: 1800,
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.init_schema().await.expect("Failed to create schema");

    Arc::new(db.pool().clone())
}

/// Generate unique username for tests
fn unique_username(prefix: &str) -> String {
    let rand_id: u32 = rand::random();
    format!("{}_{}", prefix, rand_id)
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_pg_register_login_and_duplicate() {
    let pool = setup_test_db().await;
    let auth = AuthManager::with_pool(
        pool.clone(),
        &AuthConfig::new("test_secret_key_for_testing_only_0123456789"),
    );
    let username = unique_username("pg_user");

    auth.register(RegisterRequest {
        username: username.clone(),
        password: "pw".to_string(),
        role: None,
    })
    .await
    .expect("Registration should succeed");

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(pool.as_ref())
        .await
        .unwrap();
    assert_ne!(stored, "pw");

    let duplicate = auth
        .register(RegisterRequest {
            username: username.clone(),
            password: "other".to_string(),
            role: None,
        })
        .await;
    assert!(matches!(duplicate, Err(AuthError::UsernameTaken)));

    let (user, token) = auth
        .login(LoginRequest {
            username: username.clone(),
            password: "pw".to_string(),
        })
        .await
        .expect("Login should succeed");
    assert_eq!(auth.verify_token(&token).unwrap().user_id, user.id);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_pg_legacy_password_sweep() {
    let pool = setup_test_db().await;
    let auth = AuthManager::with_pool(
        pool.clone(),
        &AuthConfig::new("test_secret_key_for_testing_only_0123456789"),
    );
    let username = unique_username("pg_legacy");

    sqlx::query("INSERT INTO users (username, password, role) VALUES ($1, 'plain', 'user')")
        .bind(&username)
        .execute(pool.as_ref())
        .await
        .unwrap();

    let report = auth.migrate_legacy_passwords().await.unwrap();
    assert!(report.hashed >= 1);

    assert!(
        auth.login(LoginRequest {
            username,
            password: "plain".to_string(),
        })
        .await
        .is_ok()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_pg_concurrent_increments() {
    const N: i32 = 50;

    let pool = setup_test_db().await;
    let ads = Arc::new(AdManager::with_pool(pool));
    let ad = ads
        .create(NewAd {
            name: "concurrency".to_string(),
            ad_type: Some("test".to_string()),
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..N {
        let ads = ads.clone();
        handles.push(tokio::spawn(async move { ads.increment_click(ad.id).await }));
    }
    let mut last_seen = 0;
    for handle in handles {
        last_seen = last_seen.max(handle.await.unwrap().unwrap().clicks);
    }

    assert_eq!(last_seen, N);
    assert!(matches!(
        ads.increment_impression(-1).await,
        Err(AdError::AdNotFound(-1))
    ));
}
