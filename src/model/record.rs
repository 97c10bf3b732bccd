use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse health tier derived from a wallet's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthLabel {
    Elite,
    Good,
    Weak,
}

impl HealthLabel {
    /// Display marker for the tier.
    pub fn marker(&self) -> &'static str {
        match self {
            HealthLabel::Elite => "🟢",
            HealthLabel::Good => "🟡",
            HealthLabel::Weak => "🔴",
        }
    }

    /// Marker and tier name, e.g. "🟢 Elite".
    pub fn display_label(&self) -> String {
        format!("{} {}", self.marker(), self)
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HealthLabel::Elite => "Elite",
            HealthLabel::Good => "Good",
            HealthLabel::Weak => "Weak",
        };
        f.write_str(name)
    }
}

/// Score plus its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub score: u32,
    pub label: HealthLabel,
}

/// Everything known about one wallet after a refresh cycle.
///
/// Records are rebuilt from scratch each cycle; nothing carries over from
/// the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Wallet address exactly as it appears in the wallet set.
    pub address: String,
    /// Native balance as a decimal string, "0" when the read failed.
    pub native_balance: String,
    /// Formatted token balances by catalog key, "0" on failure.
    pub tokens: BTreeMap<String, String>,
    /// Stake amounts by catalog key, "0" when every getter failed.
    pub stakes: BTreeMap<String, String>,
    /// Opaque stake info blobs by catalog key; only present when the
    /// info getter succeeded.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stake_info: BTreeMap<String, String>,
    /// Outgoing transaction count (nonce), 0 when unavailable.
    pub tx_count: u64,
    /// Unix millis of the most recent transaction, if known.
    pub last_active: Option<i64>,
    pub health: Option<Health>,
    /// Unix millis at which this record was assembled.
    pub last_updated: i64,
}

impl WalletRecord {
    /// Native balance as a float, 0.0 if unparseable.
    pub fn native_amount(&self) -> f64 {
        self.native_balance.parse().unwrap_or(0.0)
    }

    /// Whether any token or stake value is non-zero.
    pub fn has_active_signal(&self) -> bool {
        self.tokens
            .values()
            .chain(self.stakes.values())
            .any(|v| is_active(v))
    }
}

/// A formatted amount counts as active unless it is exactly "0".
pub fn is_active(value: &str) -> bool {
    !value.is_empty() && value != "0"
}

/// Output of one successful refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Wallet order at cycle start.
    pub wallets: Vec<String>,
    /// Records keyed by wallet address.
    pub records: BTreeMap<String, WalletRecord>,
    /// Unix millis at which the cycle completed.
    pub completed_at: i64,
}

impl Snapshot {
    pub fn get(&self, address: &str) -> Option<&WalletRecord> {
        self.records.get(address)
    }

    /// Records in wallet-set order.
    pub fn iter(&self) -> impl Iterator<Item = &WalletRecord> {
        self.wallets.iter().filter_map(|w| self.records.get(w))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
