/// Property-based tests for analytics aggregation using proptest
///
/// These tests verify CTR derivation, type filtering and metric ordering
/// across randomly generated ad sets.
use ad_metrics::ads::{
    Ad, Ctr, SortKey,
    analytics::{compute, ctr},
};
use chrono::Utc;
use proptest::prelude::*;

const TYPES: [Option<&str>; 4] = [None, Some("video"), Some("banner"), Some("Video")];

// Strategy to generate ads with ascending unique ids and bounded counters
fn ads_strategy() -> impl Strategy<Value = Vec<Ad>> {
    prop::collection::vec((0usize..TYPES.len(), 0i32..50, 0i32..50), 0..30).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (type_idx, impressions, clicks))| Ad {
                id: i as i32 + 1,
                name: format!("ad-{i}"),
                ad_type: TYPES[type_idx].map(str::to_string),
                impressions,
                clicks,
                created_at: Utc::now(),
            })
            .collect()
    })
}

fn sort_key_strategy() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Impressions),
        Just(SortKey::Clicks),
        Just(SortKey::Ctr),
    ]
}

proptest! {
    #[test]
    fn test_ctr_matches_definition(impressions in 0i32..10_000, clicks in 0i32..10_000) {
        let rate = ctr(impressions, clicks);
        if impressions == 0 {
            prop_assert_eq!(rate, Ctr::NoImpressions);
        } else {
            let exact = f64::from(clicks) / f64::from(impressions) * 100.0;
            prop_assert!((rate.value() - exact).abs() <= 0.005 + 1e-9);
        }
    }

    #[test]
    fn test_filter_keeps_only_exact_type(ads in ads_strategy()) {
        let expected = ads.iter().filter(|ad| ad.ad_type.as_deref() == Some("video")).count();
        let records = compute(ads, Some("video"), None);

        prop_assert_eq!(records.len(), expected);
        prop_assert!(records.iter().all(|r| r.ad_type.as_deref() == Some("video")));
    }

    #[test]
    fn test_sorted_output_is_descending_and_stable(ads in ads_strategy(), key in sort_key_strategy()) {
        let total = ads.len();
        let records = compute(ads, None, Some(key));
        prop_assert_eq!(records.len(), total);

        let metric = |i: usize| match key {
            SortKey::Impressions => f64::from(records[i].impressions),
            SortKey::Clicks => f64::from(records[i].clicks),
            SortKey::Ctr => records[i].ctr.value(),
        };

        for i in 1..records.len() {
            prop_assert!(metric(i - 1) >= metric(i));
            if metric(i - 1) == metric(i) {
                prop_assert!(records[i - 1].id < records[i].id, "ties must keep id order");
            }
        }
    }

    #[test]
    fn test_unsorted_output_is_id_ascending(mut ads in ads_strategy()) {
        ads.reverse();
        let records = compute(ads, None, None);
        prop_assert!(records.windows(2).all(|w| w[0].id < w[1].id));
    }
}
