//! # Ad Metrics
//!
//! Identity, access control and ad counter aggregation for the ad-metrics
//! service.
//!
//! ## Core Modules
//!
//! - [`auth`]: Credential store, session tokens, and the access guard
//! - [`ads`]: Ad records, atomic impression/click counters, and CTR analytics
//! - [`db`]: PostgreSQL pool, schema bootstrap, and repository implementations
//!
//! ## Example
//!
//! ```
//! use ad_metrics::ads::analytics::ctr;
//!
//! assert_eq!(ctr(200, 50).value(), 25.0);
//! assert_eq!(ctr(0, 0).value(), 0.0);
//! ```

/// Authentication, session tokens and role checks.
pub mod auth;

/// Ads, counters and analytics.
pub mod ads;

/// Database access.
pub mod db;
