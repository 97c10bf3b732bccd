use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

// ── Activity index ───────────────────────────────────────────────────

/// Reference to a wallet's most recent transaction, as reported by an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestActivity {
    /// Unix millis taken from the record itself.
    Timestamp(i64),
    /// The record carried no timestamp, only the block it was mined in.
    Block(u64),
}

/// Source of "last active" data for an address.
#[async_trait]
pub trait ActivityIndex: Send + Sync {
    /// Most recent transaction for `address`, `None` if the index has none.
    async fn latest_activity(&self, address: &str) -> Result<Option<LatestActivity>>;
}

/// Etherscan-compatible `account/txlist` endpoint.
pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("wallet-health/0.1")
            .build()
            .context("creating HTTP client")?;
        Ok(ExplorerClient {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Query parameters for the newest-first, single-record txlist lookup.
    pub fn query(&self, address: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("page", "1".to_string()),
            ("offset", "1".to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }
}

#[async_trait]
impl ActivityIndex for ExplorerClient {
    async fn latest_activity(&self, address: &str) -> Result<Option<LatestActivity>> {
        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&self.query(address))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding txlist response for {address}"))?;
        Ok(parse_latest(&body))
    }
}

// ── Response parsing ─────────────────────────────────────────────────

/// Pull the latest activity out of a `{ "result": [ { .. } ] }` body.
///
/// Indexers disagree on the key casing (`timeStamp` vs `timestamp`) and on
/// whether numbers are quoted, so both are accepted. Timestamps are seconds
/// and are converted to millis. A record without a usable timestamp falls
/// back to its `blockNumber`.
pub fn parse_latest(body: &Value) -> Option<LatestActivity> {
    let record = body.get("result")?.as_array()?.first()?;

    let seconds = record
        .get("timeStamp")
        .or_else(|| record.get("timestamp"))
        .and_then(as_u64);
    if let Some(seconds) = seconds.filter(|s| *s > 0) {
        let millis = i64::try_from(seconds).ok()?.checked_mul(1000)?;
        return Some(LatestActivity::Timestamp(millis));
    }

    record
        .get("blockNumber")
        .and_then(as_u64)
        .map(LatestActivity::Block)
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        _ => None,
    }
}
