//! Ad impression/click metrics server.
//!
//! Connects to PostgreSQL, prepares the schema, hashes any legacy plaintext
//! passwords, then serves the JSON API until Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use ad_metrics::{ads::AdManager, auth::AuthManager, db::Database};
use am_server::{api, config::ServerConfig, logging, metrics};
use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run the ad metrics server

USAGE:
  am_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:5000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/ad_analytics]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required, at least 32 characters)
  TOKEN_TTL_SECS           Session token lifetime in seconds [default: 7200]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs
            .opt_value_from_str("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs
            .opt_value_from_str("--db-url")
            .context("Invalid --db-url value")?,
    };

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;

    logging::init();
    info!("Starting ad metrics server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exposed on http://{}/metrics", metrics_bind);
    }

    info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected successfully");

    db.init_schema()
        .await
        .context("Failed to initialize database schema")?;

    let pool = Arc::new(db.pool().clone());
    let auth_manager = Arc::new(AuthManager::with_pool(pool.clone(), &config.auth_config()));
    let ad_manager = Arc::new(AdManager::with_pool(pool));

    let report = auth_manager
        .migrate_legacy_passwords()
        .await
        .context("Failed to migrate legacy passwords")?;
    info!(
        "Password migration complete: {} scanned, {} hashed, {} already hashed, {} skipped",
        report.scanned, report.hashed, report.already_hashed, report.skipped
    );

    let app = api::create_router(api::AppState {
        auth_manager,
        ad_manager,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
