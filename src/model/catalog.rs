use std::path::Path;

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::chain::Chain;

/// A read-only contract method the tracker knows how to encode and decode.
///
/// Serialized with the Solidity method name, e.g. `"balanceOf"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ReadMethod {
    /// `Multicall3.getEthBalance(address) -> uint256`
    GetEthBalance,
    /// `balanceOf(address) -> uint256`
    BalanceOf,
    /// `decimals() -> uint8`
    Decimals,
    /// `principalOf(address) -> uint256`
    PrincipalOf,
    /// `stakedOf(address) -> uint256`
    StakedOf,
    /// `userInfo(address) -> bytes`
    UserInfo,
}

impl ReadMethod {
    /// Solidity name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            ReadMethod::GetEthBalance => "getEthBalance",
            ReadMethod::BalanceOf => "balanceOf",
            ReadMethod::Decimals => "decimals",
            ReadMethod::PrincipalOf => "principalOf",
            ReadMethod::StakedOf => "stakedOf",
            ReadMethod::UserInfo => "userInfo",
        }
    }

    /// Per-wallet `uint256` getter usable in a stake fallback chain.
    pub fn is_amount_getter(&self) -> bool {
        matches!(
            self,
            ReadMethod::BalanceOf | ReadMethod::PrincipalOf | ReadMethod::StakedOf
        )
    }

    /// Per-wallet getter returning an opaque `bytes` blob.
    pub fn is_blob_getter(&self) -> bool {
        matches!(self, ReadMethod::UserInfo)
    }
}

impl std::fmt::Display for ReadMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An ERC20-like token probed with `balanceOf(wallet)` + `decimals()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TokenProbe {
    /// Key under which the formatted balance is reported (e.g. "AUSD").
    pub key: String,
    /// Token contract address (0x-prefixed hex).
    pub address: String,
}

/// A staking position read through an ordered chain of optional getters.
///
/// The first getter that succeeds supplies the stake amount; if every getter
/// fails the stake is reported as `"0"`. The optional `info` getter returns an
/// opaque blob that is kept verbatim when it succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StakeProbe {
    /// Key under which the stake is reported (e.g. "magmaStake").
    pub key: String,
    /// Contract exposing the getters (0x-prefixed hex).
    pub address: String,
    /// Getters tried in order, each returning a uint256 amount.
    pub getters: Vec<ReadMethod>,
    /// Optional getter returning an opaque info blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ReadMethod>,
    /// Decimals used to format the stake amount.
    #[serde(default = "default_stake_decimals")]
    pub decimals: u8,
}

fn default_stake_decimals() -> u8 {
    18
}

/// Static description of everything probed per wallet.
///
/// Order matters: tokens and stakes are planned and demultiplexed in the
/// order they appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProbeCatalog {
    /// Chain the catalog's contracts live on.
    pub chain: Chain,
    /// Tokens probed with balance + decimals, in report order.
    pub tokens: Vec<TokenProbe>,
    /// Registry and protocol stake sources, in report order.
    #[serde(default)]
    pub stakes: Vec<StakeProbe>,
}

impl ProbeCatalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing catalog {}", path.display()))
    }

    /// Monad mainnet catalog: LSTs, stablecoins and bridged majors, plus the
    /// aPriori validator registry and Magma staking getters.
    pub fn monad() -> Self {
        let token = |key: &str, address: &str| TokenProbe {
            key: key.into(),
            address: address.into(),
        };
        ProbeCatalog {
            chain: Chain::monad(),
            tokens: vec![
                token("aPriori", "0x0c65A0BC65a5D819235B71F554D210D3F80E0852"),
                token("Magma", "0x8498312A6B3CbD158bf0c93AbdCF29E6e4F55081"),
                token("AUSD", "0x00000000eFE302BEAA2b3e6e1b18d08D69a9012a"),
                token("earnAUSD", "0x103222f020e98bba0ad9809a011fdf8e6f067496"),
                token("USDC", "0x754704Bc059F8C67012fEd69BC8A327a5aafb603"),
                token("WBTC", "0x0555E30da8f98308EdB960aa94C0Db47230d2B9c"),
                token("WETH", "0xEE8c0E9f1BFFb4Eb878d8f15f368A02a35481242"),
                token("WSOL", "0xea17E5a9efEBf1477dB45082d67010E2245217f1"),
                token("XAUt0", "0x01bFF41798a0BcF287b996046Ca68b395DbC1071"),
            ],
            stakes: vec![
                StakeProbe {
                    key: "aPrioriStake".into(),
                    address: "0x77f6e4103e32d6146e29cf9ed1645e170f90bc2b".into(),
                    getters: vec![ReadMethod::PrincipalOf, ReadMethod::BalanceOf],
                    info: None,
                    decimals: 18,
                },
                StakeProbe {
                    key: "magmaStake".into(),
                    address: "0x8498312A6B3CbD158bf0c93AbdCF29E6e4F55081".into(),
                    getters: vec![ReadMethod::StakedOf, ReadMethod::PrincipalOf],
                    info: Some(ReadMethod::UserInfo),
                    decimals: 18,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_round_trip_through_json() {
        let json = serde_json::to_string(&ReadMethod::PrincipalOf).unwrap();
        assert_eq!(json, "\"principalOf\"");
        let back: ReadMethod = serde_json::from_str("\"userInfo\"").unwrap();
        assert_eq!(back, ReadMethod::UserInfo);
    }

    #[test]
    fn test_monad_catalog_parses_back() {
        let catalog = ProbeCatalog::monad();
        let json = serde_json::to_string_pretty(&catalog).unwrap();
        let parsed: ProbeCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
        assert_eq!(parsed.tokens.len(), 9);
    }

    #[test]
    fn test_stake_decimals_default() {
        let stake: StakeProbe = serde_json::from_str(
            r#"{"key": "s", "address": "0x0000000000000000000000000000000000000001", "getters": ["stakedOf"]}"#,
        )
        .unwrap();
        assert_eq!(stake.decimals, 18);
        assert!(stake.info.is_none());
    }
}
