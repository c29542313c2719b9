//! Ad manager implementation.

use super::{
    analytics,
    errors::{AdError, AdResult},
    models::{Ad, AdAnalytics, AdId, AnalyticsQuery, NewAd},
};
use crate::db::{AdRepository, Counter, PgAdRepository};
use sqlx::PgPool;
use std::sync::Arc;

/// Ad manager: ad records, counters and analytics
#[derive(Clone)]
pub struct AdManager {
    ads: Arc<dyn AdRepository>,
}

impl AdManager {
    /// Create a new ad manager over any repository implementation
    pub fn new(ads: Arc<dyn AdRepository>) -> Self {
        Self { ads }
    }

    /// Create an ad manager backed by PostgreSQL
    pub fn with_pool(pool: Arc<PgPool>) -> Self {
        Self::new(Arc::new(PgAdRepository::new(pool.as_ref().clone())))
    }

    /// Create a new ad with zeroed counters.
    ///
    /// Callers are expected to have passed the admin gate already.
    ///
    /// # Errors
    ///
    /// * `AdError::Validation` - Name empty
    pub async fn create(&self, request: NewAd) -> AdResult<Ad> {
        if request.name.is_empty() {
            return Err(AdError::Validation("Ad name required".to_string()));
        }

        let ad = self
            .ads
            .create_ad(&request.name, request.ad_type.as_deref())
            .await?;

        log::info!("Created ad {} ({:?})", ad.id, ad.ad_type);
        Ok(ad)
    }

    /// All ads in ascending id order
    pub async fn list_all(&self) -> AdResult<Vec<Ad>> {
        self.ads.list_ads().await
    }

    /// Record one impression
    ///
    /// # Errors
    ///
    /// * `AdError::AdNotFound` - No ad with that id
    pub async fn increment_impression(&self, id: AdId) -> AdResult<Ad> {
        self.increment(id, Counter::Impressions).await
    }

    /// Record one click. Does not require a prior impression.
    ///
    /// # Errors
    ///
    /// * `AdError::AdNotFound` - No ad with that id
    pub async fn increment_click(&self, id: AdId) -> AdResult<Ad> {
        self.increment(id, Counter::Clicks).await
    }

    /// Analytics records per the `type`/`sort` query
    pub async fn analytics(&self, query: &AnalyticsQuery) -> AdResult<Vec<AdAnalytics>> {
        let ads = self.ads.list_ads().await?;
        Ok(analytics::compute_for_query(ads, query))
    }

    /// Check that ad storage is reachable
    pub async fn health_check(&self) -> AdResult<()> {
        self.ads.health_check().await
    }

    async fn increment(&self, id: AdId, counter: Counter) -> AdResult<Ad> {
        self.ads
            .increment(id, counter)
            .await?
            .ok_or(AdError::AdNotFound(id))
    }
}
