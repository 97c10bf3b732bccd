use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical Multicall3 deployment, identical on every EVM chain that has one.
pub const MULTICALL3_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// The single EVM chain the tracker reads from.
///
/// In JSON:
/// `{"name": "monad", "chain_id": 143, "rpc_url": "https://rpc.monad.xyz"}`
/// (`multicall`, `native_symbol`, `native_decimals`, `explorer_api_url` fall back to defaults)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Chain {
    /// Human-readable chain name (e.g. "monad").
    pub name: String,
    /// EVM chain ID.
    pub chain_id: u64,
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Multicall3 contract used for the batched read and native balances.
    #[serde(default = "default_multicall")]
    pub multicall: String,
    /// Native currency symbol (e.g. "MON").
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    /// Native currency decimals.
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,
    /// Etherscan-style activity index (`?module=account&action=txlist`).
    /// Unset disables last-activity lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_api_url: Option<String>,
}

fn default_multicall() -> String {
    MULTICALL3_ADDRESS.to_string()
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn default_native_decimals() -> u8 {
    18
}

// ── Convenience constructors ─────────────────────────────────────────

impl Chain {
    /// Monad mainnet.
    pub fn monad() -> Self {
        Chain {
            name: "monad".into(),
            chain_id: 143,
            rpc_url: "https://rpc.monad.xyz".into(),
            multicall: default_multicall(),
            native_symbol: "MON".into(),
            native_decimals: 18,
            explorer_api_url: None,
        }
    }

    /// Custom EVM chain with chain_id + rpc_url and default Multicall3.
    pub fn custom(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Chain {
            name: name.into(),
            chain_id,
            rpc_url: rpc_url.into(),
            multicall: default_multicall(),
            native_symbol: default_native_symbol(),
            native_decimals: default_native_decimals(),
            explorer_api_url: None,
        }
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}
