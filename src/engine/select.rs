use crate::model::record::{Snapshot, WalletRecord};

use super::health::GOOD_THRESHOLD;

/// Native balance below which an unscored wallet counts as unhealthy.
pub const LOW_GAS_THRESHOLD: f64 = 0.1;

/// Whether a record should be reported as unhealthy.
///
/// Scored records are unhealthy below the Good threshold. Unscored records
/// fall back to a low native balance or no active token/stake signal.
pub fn is_unhealthy(record: &WalletRecord) -> bool {
    match record.health {
        Some(health) => health.score < GOOD_THRESHOLD,
        None => record.native_amount() < LOW_GAS_THRESHOLD || !record.has_active_signal(),
    }
}

/// Unhealthy wallet addresses in snapshot (wallet-set) order.
///
/// Wallets without a record are skipped.
pub fn select_unhealthy(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .iter()
        .filter(|r| is_unhealthy(r))
        .map(|r| r.address.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::engine::health::label_for;
    use crate::model::record::Health;

    fn record(address: &str, native: &str, score: Option<u32>, token: &str) -> WalletRecord {
        WalletRecord {
            address: address.into(),
            native_balance: native.into(),
            tokens: BTreeMap::from([("aPriori".to_string(), token.to_string())]),
            stakes: BTreeMap::new(),
            stake_info: BTreeMap::new(),
            tx_count: 0,
            last_active: None,
            health: score.map(|score| Health {
                score,
                label: label_for(score),
            }),
            last_updated: 0,
        }
    }

    fn snapshot(records: Vec<WalletRecord>) -> Snapshot {
        Snapshot {
            wallets: records.iter().map(|r| r.address.clone()).collect(),
            records: records.into_iter().map(|r| (r.address.clone(), r)).collect(),
            completed_at: 0,
        }
    }

    #[test]
    fn test_score_rule_takes_precedence() {
        // High score wins even with no gas; low score loses even with gas.
        assert!(!is_unhealthy(&record("a", "0", Some(80), "0")));
        assert!(is_unhealthy(&record("b", "100", Some(49), "5")));
        assert!(!is_unhealthy(&record("c", "0", Some(50), "0")));
    }

    #[test]
    fn test_fallback_without_score() {
        assert!(is_unhealthy(&record("a", "0.05", None, "5")));
        assert!(is_unhealthy(&record("b", "3", None, "0")));
        assert!(!is_unhealthy(&record("c", "3", None, "5")));
    }

    #[test]
    fn test_selection_follows_wallet_order_and_is_idempotent() {
        let snap = snapshot(vec![
            record("0xz", "0", Some(10), "0"),
            record("0xa", "0", Some(90), "0"),
            record("0xm", "0", Some(20), "0"),
        ]);
        let first = select_unhealthy(&snap);
        assert_eq!(first, vec!["0xz".to_string(), "0xm".to_string()]);
        assert_eq!(select_unhealthy(&snap), first);
    }

    #[test]
    fn test_wallet_without_record_is_skipped() {
        let mut snap = snapshot(vec![record("0x1", "0", Some(0), "0")]);
        snap.wallets.push("0x2".into());
        assert_eq!(select_unhealthy(&snap), vec!["0x1".to_string()]);
    }
}
