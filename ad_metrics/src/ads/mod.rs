//! Ads module providing ad records, atomic counters and analytics.
//!
//! This module implements:
//! - Admin-created ads with impression and click counters
//! - Storage-level atomic increments (no lost updates under concurrency)
//! - Click-through-rate analytics with type filtering and metric ordering
//!
//! ## Example
//!
//! ```no_run
//! use ad_metrics::ads::{AdManager, AnalyticsQuery, NewAd};
//! use ad_metrics::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let ads = AdManager::with_pool(Arc::new(db.pool().clone()));
//!
//!     let ad = ads
//!         .create(NewAd { name: "Spring sale".to_string(), ad_type: Some("video".to_string()) })
//!         .await?;
//!     ads.increment_impression(ad.id).await?;
//!
//!     let query = AnalyticsQuery { ad_type: None, sort: Some("CTR".to_string()) };
//!     for record in ads.analytics(&query).await? {
//!         println!("{} -> {:?}", record.name, record.ctr);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AdError, AdResult};
pub use manager::AdManager;
pub use models::{Ad, AdAnalytics, AdId, AnalyticsQuery, Ctr, NewAd, SortKey};
