use std::collections::HashMap;

use alloy::primitives::Address;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::onchain::explorer::{ActivityIndex, LatestActivity};
use crate::onchain::reader::ChainReader;

/// Out-of-band facts for one wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub tx_count: u64,
    /// Unix millis of the latest transaction.
    pub last_active: Option<i64>,
}

/// Look up transaction count and last activity for every wallet concurrently.
///
/// Lookups never fail the caller: a failed transaction-count lookup yields
/// 0, a failed or disabled activity lookup yields `None`, and neither
/// affects any other wallet.
pub async fn enrich(
    reader: &dyn ChainReader,
    activity: Option<&dyn ActivityIndex>,
    wallets: &[String],
) -> HashMap<String, Enrichment> {
    if activity.is_none() {
        debug!("activity index not configured, last-active disabled");
    }

    let lookups = wallets.iter().map(|wallet| async move {
        let (tx_count, last_active) = tokio::join!(
            transaction_count(reader, wallet),
            last_active(reader, activity, wallet),
        );
        (
            wallet.clone(),
            Enrichment {
                tx_count,
                last_active,
            },
        )
    });

    join_all(lookups).await.into_iter().collect()
}

async fn transaction_count(reader: &dyn ChainReader, wallet: &str) -> u64 {
    let Ok(address) = wallet.parse::<Address>() else {
        warn!(wallet, "not an address, tx count defaults to 0");
        return 0;
    };
    match reader.transaction_count(address).await {
        Ok(count) => count,
        Err(e) => {
            warn!(wallet, error = %format!("{e:#}"), "tx count lookup failed");
            0
        }
    }
}

async fn last_active(
    reader: &dyn ChainReader,
    activity: Option<&dyn ActivityIndex>,
    wallet: &str,
) -> Option<i64> {
    let index = activity?;
    let latest = match index.latest_activity(wallet).await {
        Ok(latest) => latest?,
        Err(e) => {
            debug!(wallet, error = %format!("{e:#}"), "activity lookup failed");
            return None;
        }
    };

    match latest {
        LatestActivity::Timestamp(millis) => Some(millis),
        LatestActivity::Block(number) => match reader.block_timestamp(number).await {
            Ok(Some(seconds)) => i64::try_from(seconds).ok()?.checked_mul(1000),
            Ok(None) => None,
            Err(e) => {
                debug!(wallet, block = number, error = %format!("{e:#}"), "block timestamp lookup failed");
                None
            }
        },
    }
}
