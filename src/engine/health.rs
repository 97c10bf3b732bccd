use std::collections::BTreeMap;

use crate::model::record::{Health, HealthLabel, is_active};

/// Score at or above which a wallet is Elite.
pub const ELITE_THRESHOLD: u32 = 80;
/// Score at or above which a wallet is Good.
pub const GOOD_THRESHOLD: u32 = 50;

const POINTS_PER_SIGNAL: u32 = 10;
const MAX_SIGNAL_POINTS: u32 = 30;

/// Score a wallet from its native balance, transaction count, formatted
/// token/protocol balances and stake flags.
///
/// Three additive buckets, each capped on its own:
/// - native balance: > 10 → +20, > 50 → +10 more (max 30)
/// - transactions: > 5 → +30, > 20 → +20 more (max 50)
/// - active signals (non-zero balances + true stake flags) × 10, max 30
pub fn score(
    native: &str,
    tx_count: u64,
    activity: &BTreeMap<String, String>,
    stake_flags: &[bool],
) -> Health {
    let native: f64 = native.trim().parse().unwrap_or(0.0);

    let mut score = 0;
    if native > 10.0 {
        score += 20;
    }
    if native > 50.0 {
        score += 10;
    }

    if tx_count > 5 {
        score += 30;
    }
    if tx_count > 20 {
        score += 20;
    }

    let signals = activity.values().filter(|v| is_active(v)).count()
        + stake_flags.iter().filter(|f| **f).count();
    let signals = u32::try_from(signals).unwrap_or(u32::MAX);
    score += signals.saturating_mul(POINTS_PER_SIGNAL).min(MAX_SIGNAL_POINTS);

    Health {
        score,
        label: label_for(score),
    }
}

pub fn label_for(score: u32) -> HealthLabel {
    if score >= ELITE_THRESHOLD {
        HealthLabel::Elite
    } else if score >= GOOD_THRESHOLD {
        HealthLabel::Good
    } else {
        HealthLabel::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_wallet_is_weak() {
        let h = score("0", 0, &BTreeMap::new(), &[]);
        assert_eq!(h.score, 0);
        assert_eq!(h.label, HealthLabel::Weak);
    }

    #[test]
    fn test_native_threshold_adds_exactly_20() {
        let activity = tokens(&[("AUSD", "5")]);
        let low = score("5", 3, &activity, &[false]);
        let high = score("15", 3, &activity, &[false]);
        assert_eq!(high.score - low.score, 20);
    }

    #[test]
    fn test_tx_threshold_adds_exactly_30() {
        let activity = tokens(&[("AUSD", "0")]);
        let low = score("1", 4, &activity, &[]);
        let high = score("1", 6, &activity, &[]);
        assert_eq!(high.score - low.score, 30);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(score("10", 5, &BTreeMap::new(), &[]).score, 0);
        assert_eq!(score("50", 20, &BTreeMap::new(), &[]).score, 20 + 30);
        assert_eq!(score("50.0001", 21, &BTreeMap::new(), &[]).score, 30 + 50);
    }

    #[test]
    fn test_signal_bucket_caps_at_30() {
        let activity = tokens(&[("a", "1"), ("b", "0.5"), ("c", "2"), ("d", "0"), ("e", "9")]);
        let h = score("0", 0, &activity, &[true, true]);
        assert_eq!(h.score, 30);
    }

    #[test]
    fn test_labels() {
        // 30 native + 50 tx = 80
        assert_eq!(score("100", 100, &BTreeMap::new(), &[]).label, HealthLabel::Elite);
        // 20 native + 30 tx = 50
        assert_eq!(score("11", 6, &BTreeMap::new(), &[]).label, HealthLabel::Good);
        assert_eq!(score("11", 6, &BTreeMap::new(), &[]).score, 50);
        // 30 tx + 10 signal = 40
        let h = score("1", 6, &BTreeMap::new(), &[true]);
        assert_eq!((h.score, h.label), (40, HealthLabel::Weak));
        // everything maxed
        let all = tokens(&[("a", "1"), ("b", "1"), ("c", "1")]);
        assert_eq!(score("1000", 1000, &all, &[]).score, 110);
    }

    #[test]
    fn test_unparseable_native_counts_as_zero() {
        assert_eq!(score("n/a", 0, &BTreeMap::new(), &[]).score, 0);
    }

    proptest! {
        #[test]
        fn score_is_deterministic_and_bounded(
            native in 0.0f64..1_000.0,
            tx in any::<u64>(),
            values in prop::collection::btree_map(
                "[a-z]{1,6}",
                prop::sample::select(vec!["0", "1", "0.5"]).prop_map(String::from),
                0..12,
            ),
            flags in prop::collection::vec(any::<bool>(), 0..4),
        ) {
            let native = native.to_string();
            let a = score(&native, tx, &values, &flags);
            let b = score(&native, tx, &values, &flags);
            prop_assert_eq!(a, b);
            prop_assert!(a.score <= 110);
            prop_assert_eq!(a.label, label_for(a.score));
        }

        #[test]
        fn more_transactions_never_lower_the_score(tx in 0u64..100, extra in 0u64..100) {
            let a = score("1", tx, &BTreeMap::new(), &[]);
            let b = score("1", tx + extra, &BTreeMap::new(), &[]);
            prop_assert!(b.score >= a.score);
        }
    }
}
