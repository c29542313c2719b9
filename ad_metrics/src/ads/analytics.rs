//! Analytics aggregation: click-through rate, type filtering and ordering.
//!
//! Everything here is pure; the manager fetches rows and hands them over.

use super::models::{Ad, AdAnalytics, AnalyticsQuery, Ctr, SortKey};
use std::cmp::Ordering;

/// Click-through rate as a percentage rounded to two decimals.
///
/// An ad without impressions has a CTR of exactly zero.
pub fn ctr(impressions: i32, clicks: i32) -> Ctr {
    if impressions <= 0 {
        return Ctr::NoImpressions;
    }

    let percent = f64::from(clicks) / f64::from(impressions) * 100.0;
    Ctr::Percent((percent * 100.0).round() / 100.0)
}

/// Build analytics records.
///
/// Ads are put in ascending id order, filtered to `type_filter` (exact,
/// case-sensitive) and then, if `sort` is given, stably ordered descending by
/// that metric so ties keep ascending id order.
pub fn compute(mut ads: Vec<Ad>, type_filter: Option<&str>, sort: Option<SortKey>) -> Vec<AdAnalytics> {
    ads.sort_by_key(|ad| ad.id);

    let mut records: Vec<AdAnalytics> = ads
        .into_iter()
        .filter(|ad| match type_filter {
            Some(wanted) => ad.ad_type.as_deref() == Some(wanted),
            None => true,
        })
        .map(|ad| AdAnalytics {
            ctr: ctr(ad.impressions, ad.clicks),
            id: ad.id,
            name: ad.name,
            ad_type: ad.ad_type,
            impressions: ad.impressions,
            clicks: ad.clicks,
        })
        .collect();

    if let Some(key) = sort {
        records.sort_by(|a, b| descending(key, a, b));
    }

    records
}

/// [`compute`] driven by raw query parameters.
///
/// An empty `type` means no filter; an unrecognised `sort` means id order.
pub fn compute_for_query(ads: Vec<Ad>, query: &AnalyticsQuery) -> Vec<AdAnalytics> {
    let type_filter = query.ad_type.as_deref().filter(|t| !t.is_empty());
    let sort = query.sort.as_deref().and_then(SortKey::parse);
    compute(ads, type_filter, sort)
}

fn descending(key: SortKey, a: &AdAnalytics, b: &AdAnalytics) -> Ordering {
    match key {
        SortKey::Impressions => b.impressions.cmp(&a.impressions),
        SortKey::Clicks => b.clicks.cmp(&a.clicks),
        SortKey::Ctr => b.ctr.value().total_cmp(&a.ctr.value()),
    }
}
