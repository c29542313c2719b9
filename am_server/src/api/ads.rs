//! Ad and analytics API handlers.

use ad_metrics::ads::{Ad, AdAnalytics, AdId, AnalyticsQuery, NewAd};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::{AppState, error::ApiError};
use crate::metrics;

/// Create a new ad. Admin only.
///
/// The token and role are checked by the route's middleware before this
/// handler (and its body extraction) runs.
///
/// # Request Body
///
/// ```json
/// { "name": "Summer sale", "type": "video" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing name or malformed body
/// - `401 Unauthorized`: No bearer token
/// - `403 Forbidden`: Invalid token or caller is not an admin
pub async fn create_ad(
    State(state): State<AppState>,
    payload: Result<Json<NewAd>, JsonRejection>,
) -> Result<(StatusCode, Json<Ad>), ApiError> {
    let Json(payload) = payload?;

    let ad = state.ad_manager.create(payload).await?;
    metrics::ad_events_total(metrics::AdEvent::Created);

    Ok((StatusCode::CREATED, Json(ad)))
}

/// List all ads in ascending id order.
pub async fn list_ads(State(state): State<AppState>) -> Result<Json<Vec<Ad>>, ApiError> {
    Ok(Json(state.ad_manager.list_all().await?))
}

/// Record one impression and return the updated ad.
pub async fn record_impression(
    State(state): State<AppState>,
    Path(ad_id): Path<AdId>,
) -> Result<Json<Ad>, ApiError> {
    let ad = state.ad_manager.increment_impression(ad_id).await?;
    metrics::ad_events_total(metrics::AdEvent::Impression);
    Ok(Json(ad))
}

/// Record one click and return the updated ad.
pub async fn record_click(
    State(state): State<AppState>,
    Path(ad_id): Path<AdId>,
) -> Result<Json<Ad>, ApiError> {
    let ad = state.ad_manager.increment_click(ad_id).await?;
    metrics::ad_events_total(metrics::AdEvent::Click);
    Ok(Json(ad))
}

/// Per-ad analytics with CTR.
///
/// Query parameters:
/// - `type`: exact, case-sensitive ad type filter
/// - `sort`: `impressions`, `clicks` or `CTR` (descending); anything else keeps id order
pub async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Vec<AdAnalytics>>, ApiError> {
    Ok(Json(state.ad_manager.analytics(&query).await?))
}
