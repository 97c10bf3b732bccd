pub mod demux;
pub mod enrich;
pub mod format;
pub mod health;
pub mod plan;
pub mod select;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::model::catalog::ProbeCatalog;
use crate::model::record::{Snapshot, WalletRecord, is_active};
use crate::onchain::explorer::ActivityIndex;
use crate::onchain::reader::ChainReader;

use demux::WalletFacts;
use enrich::Enrichment;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("`{address}` is not a valid address")]
    InvalidAddress { address: String },

    #[error("catalog entry `{key}` is invalid: {reason}")]
    InvalidCatalog { key: String, reason: String },

    #[error("batched read failed: {0}")]
    Batch(String),

    #[error("batch returned {actual} results, expected {expected}")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("a refresh is already in progress")]
    RefreshInProgress,
}

/// Run one refresh cycle over `wallets`.
///
/// The batched read and the per-wallet enrichment lookups run concurrently.
/// Only a failure of the batched read itself fails the cycle; everything
/// finer-grained degrades to zero or absent values in the affected record.
pub async fn refresh(
    reader: &dyn ChainReader,
    activity: Option<&dyn ActivityIndex>,
    wallets: &[String],
    catalog: &ProbeCatalog,
) -> Result<Snapshot, EngineError> {
    let plan = plan::plan(wallets, catalog)?;
    if wallets.is_empty() {
        debug!("empty wallet set, nothing to refresh");
        return Ok(Snapshot {
            completed_at: chrono::Utc::now().timestamp_millis(),
            ..Snapshot::default()
        });
    }

    info!(
        wallets = wallets.len(),
        calls = plan.len(),
        calls_per_wallet = plan.layout().calls_per_wallet(),
        "refreshing"
    );

    let (batch, mut extras) = tokio::join!(
        reader.aggregate(plan.calls()),
        enrich::enrich(reader, activity, wallets),
    );
    let results = batch.map_err(|e| EngineError::Batch(format!("{e:#}")))?;
    debug!(
        failed = results.iter().filter(|r| !r.is_success()).count(),
        "batch returned"
    );
    let facts = demux::demux(&plan, &results)?;

    let now = chrono::Utc::now().timestamp_millis();
    let records: BTreeMap<String, WalletRecord> = facts
        .into_iter()
        .map(|f| {
            let extra = extras.remove(&f.address).unwrap_or_default();
            let record = assemble(f, extra, now);
            (record.address.clone(), record)
        })
        .collect();

    info!(records = records.len(), "refresh complete");
    Ok(Snapshot {
        wallets: wallets.to_vec(),
        records,
        completed_at: now,
    })
}

/// Merge chain facts with enrichment and score the result.
pub fn assemble(facts: WalletFacts, extra: Enrichment, now: i64) -> WalletRecord {
    let stake_flags: Vec<bool> = facts.stakes.values().map(|v| is_active(v)).collect();
    let health = health::score(&facts.native_balance, extra.tx_count, &facts.tokens, &stake_flags);

    WalletRecord {
        address: facts.address,
        native_balance: facts.native_balance,
        tokens: facts.tokens,
        stakes: facts.stakes,
        stake_info: facts.stake_info,
        tx_count: extra.tx_count,
        last_active: extra.last_active,
        health: Some(health),
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::HealthLabel;

    fn facts(native: &str, tokens: &[(&str, &str)], stakes: &[(&str, &str)]) -> WalletFacts {
        let map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        WalletFacts {
            address: "0x01".into(),
            native_balance: native.into(),
            tokens: map(tokens),
            stakes: map(stakes),
            stake_info: BTreeMap::new(),
        }
    }

    #[test]
    fn test_assemble_counts_stakes_as_flags() {
        let extra = Enrichment {
            tx_count: 25,
            last_active: Some(1_700_000_000_000),
        };
        // 50 tx + 2 token signals + 1 stake flag = 80
        let record = assemble(
            facts("1", &[("AUSD", "5"), ("USDC", "0.1"), ("WETH", "0")], &[("magmaStake", "3"), ("aPrioriStake", "0")]),
            extra,
            42,
        );
        let health = record.health.unwrap();
        assert_eq!(health.score, 80);
        assert_eq!(health.label, HealthLabel::Elite);
        assert_eq!(record.tx_count, 25);
        assert_eq!(record.last_active, Some(1_700_000_000_000));
        assert_eq!(record.last_updated, 42);
    }

    #[test]
    fn test_assemble_without_enrichment() {
        let record = assemble(facts("0", &[("AUSD", "0")], &[]), Enrichment::default(), 0);
        assert_eq!(record.tx_count, 0);
        assert_eq!(record.last_active, None);
        assert_eq!(record.health.unwrap().score, 0);
    }
}
