//! Prometheus metrics for monitoring the ad-metrics server.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener when
//! `METRICS_BIND` is configured. Without an installed exporter every recording
//! function below is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Auth Metrics**: Signups, login attempts, rejected tokens
//! - **Ad Metrics**: Ads created, impressions and clicks recorded

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Auth events worth counting
#[derive(Debug, Clone, Copy)]
pub enum AuthEvent {
    Signup,
    LoginSuccess,
    LoginFailure,
    TokenRejected,
    RoleDenied,
}

impl AuthEvent {
    fn label(&self) -> &'static str {
        match self {
            AuthEvent::Signup => "signup",
            AuthEvent::LoginSuccess => "login_success",
            AuthEvent::LoginFailure => "login_failure",
            AuthEvent::TokenRejected => "token_rejected",
            AuthEvent::RoleDenied => "role_denied",
        }
    }
}

/// Increment the auth event counter.
pub fn auth_events_total(event: AuthEvent) {
    metrics::counter!("auth_events_total", "event" => event.label()).increment(1);
}

// ============================================================================
// Ad Metrics
// ============================================================================

/// Ad events worth counting
#[derive(Debug, Clone, Copy)]
pub enum AdEvent {
    Created,
    Impression,
    Click,
}

impl AdEvent {
    fn label(&self) -> &'static str {
        match self {
            AdEvent::Created => "created",
            AdEvent::Impression => "impression",
            AdEvent::Click => "click",
        }
    }
}

/// Increment the ad event counter.
pub fn ad_events_total(event: AdEvent) {
    metrics::counter!("ad_events_total", "event" => event.label()).increment(1);
}
