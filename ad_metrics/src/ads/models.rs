//! Ad and analytics data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Ad ID type
pub type AdId = i32;

/// Ad model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub name: String,
    #[serde(rename = "type")]
    pub ad_type: Option<String>,
    pub impressions: i32,
    pub clicks: i32,
    pub created_at: DateTime<Utc>,
}

/// Ad creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAd {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ad_type: Option<String>,
}

/// Click-through rate of an ad.
///
/// Serializes as the number `0` when the ad has no impressions, otherwise as
/// a fixed-point string with two decimals (`"25.00"`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ctr {
    NoImpressions,
    Percent(f64),
}

impl Ctr {
    /// Numeric value used for ordering
    pub fn value(&self) -> f64 {
        match self {
            Ctr::NoImpressions => 0.0,
            Ctr::Percent(value) => *value,
        }
    }
}

impl Serialize for Ctr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ctr::NoImpressions => serializer.serialize_u8(0),
            Ctr::Percent(value) => serializer.collect_str(&format_args!("{value:.2}")),
        }
    }
}

/// Per-ad analytics record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdAnalytics {
    pub id: AdId,
    pub name: String,
    #[serde(rename = "type")]
    pub ad_type: Option<String>,
    pub impressions: i32,
    pub clicks: i32,
    #[serde(rename = "CTR")]
    pub ctr: Ctr,
}

/// Metric an analytics listing can be ordered by (descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Impressions,
    Clicks,
    Ctr,
}

impl SortKey {
    /// Parse a `sort` query value. Matching is exact; anything else means
    /// "keep ascending id order".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "impressions" => Some(SortKey::Impressions),
            "clicks" => Some(SortKey::Clicks),
            "CTR" => Some(SortKey::Ctr),
            _ => None,
        }
    }
}

/// Analytics query parameters (`?type=&sort=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(rename = "type")]
    pub ad_type: Option<String>,
    pub sort: Option<String>,
}
