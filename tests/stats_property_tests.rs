//! Property tests for the visit-history algorithm

use proptest::prelude::*;
use shorturl::storage::{HISTORY_LIMIT, UrlStats};

proptest! {
    #[test]
    fn history_keeps_last_five_in_order(ips in prop::collection::vec("[0-9]{1,3}(\\.[0-9]{1,3}){3}", 0..30)) {
        let mut stats = UrlStats::default();
        for ip in &ips {
            stats.record_visit(ip, "", "Unknown");
        }

        let start = ips.len().saturating_sub(HISTORY_LIMIT);
        prop_assert_eq!(stats.count, ips.len() as u64);
        prop_assert_eq!(&stats.last_ips[..], &ips[start..]);
    }

    #[test]
    fn empty_referrer_is_ignored(
        referrers in prop::collection::vec(prop_oneof![Just(String::new()), "https://[a-z]{1,8}\\.example"], 1..20)
    ) {
        let mut stats = UrlStats::default();
        for referrer in &referrers {
            let before = stats.referrers.clone();
            stats.record_visit("1.2.3.4", referrer, "Unknown");
            if referrer.is_empty() {
                prop_assert_eq!(&stats.referrers, &before);
            } else {
                prop_assert_eq!(stats.referrers.last(), Some(referrer));
            }
        }

        let non_empty: Vec<&String> = referrers.iter().filter(|r| !r.is_empty()).collect();
        let start = non_empty.len().saturating_sub(HISTORY_LIMIT);
        let expected: Vec<String> = non_empty[start..].iter().map(|r| (*r).clone()).collect();
        prop_assert_eq!(stats.referrers, expected);
        prop_assert_eq!(stats.count, referrers.len() as u64);
    }

    #[test]
    fn geo_label_is_last_written(labels in prop::collection::vec("[A-Za-z ,]{0,20}", 1..10)) {
        let mut stats = UrlStats::default();
        for label in &labels {
            stats.record_visit("1.2.3.4", "", label);
        }
        prop_assert_eq!(&stats.last_geo_location, labels.last().unwrap());
    }
}
