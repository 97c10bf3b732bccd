use std::collections::BTreeMap;

use alloy::primitives::{Bytes, U256};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::model::catalog::ReadMethod;
use crate::onchain::abi::{IERC20, IStakeProbe, Multicall3};

use super::EngineError;
use super::format::{format_native, format_token};
use super::plan::{CallLayout, CallPlan, Slot, StakeLayout};

/// Outcome of one call in the batch, positionally aligned with the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallResult {
    /// Raw ABI-encoded return data.
    Success(Bytes),
    /// Revert reason or decode problem.
    Failure(String),
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }

    /// Decode a uint return value. Anything but a clean decode is `None`.
    pub fn uint(&self, method: ReadMethod) -> Option<U256> {
        let CallResult::Success(data) = self else {
            return None;
        };
        let data = data.as_ref();
        match method {
            ReadMethod::GetEthBalance => Multicall3::getEthBalanceCall::abi_decode_returns(data).ok(),
            ReadMethod::BalanceOf => IERC20::balanceOfCall::abi_decode_returns(data).ok(),
            ReadMethod::Decimals => IERC20::decimalsCall::abi_decode_returns(data)
                .ok()
                .map(U256::from),
            ReadMethod::PrincipalOf => IStakeProbe::principalOfCall::abi_decode_returns(data).ok(),
            ReadMethod::StakedOf => IStakeProbe::stakedOfCall::abi_decode_returns(data).ok(),
            ReadMethod::UserInfo => None,
        }
    }

    /// Decode a `bytes` return value.
    pub fn bytes(&self, method: ReadMethod) -> Option<Bytes> {
        let CallResult::Success(data) = self else {
            return None;
        };
        match method {
            ReadMethod::UserInfo => IStakeProbe::userInfoCall::abi_decode_returns(data.as_ref()).ok(),
            _ => None,
        }
    }
}

// ── Per-wallet window ────────────────────────────────────────────────

static MISSING: CallResult = CallResult::Failure(String::new());

/// Balance + decimals results for one catalog token.
#[derive(Debug, Clone, Copy)]
pub struct TokenPair<'a> {
    pub key: &'a str,
    pub balance: &'a CallResult,
    pub decimals: &'a CallResult,
}

/// Getter chain and info results for one stake source.
#[derive(Debug, Clone)]
pub struct StakeWindow<'a> {
    pub layout: &'a StakeLayout,
    /// Getters in fallback order.
    pub getters: Vec<(ReadMethod, &'a CallResult)>,
    pub info: Option<(ReadMethod, &'a CallResult)>,
}

/// One wallet's slice of the result array, addressed by role instead of offset.
#[derive(Debug, Clone)]
pub struct WalletWindow<'a> {
    pub wallet: &'a str,
    pub native: &'a CallResult,
    pub tokens: Vec<TokenPair<'a>>,
    pub stakes: Vec<StakeWindow<'a>>,
}

impl<'a> WalletWindow<'a> {
    /// Bind `results` (exactly one wallet's worth) to the layout's slots.
    fn bind(layout: &'a CallLayout, wallet: &'a str, results: &'a [CallResult]) -> Self {
        let mut native = &MISSING;
        let mut tokens: Vec<TokenPair<'a>> = layout
            .token_keys()
            .iter()
            .map(|key| TokenPair {
                key,
                balance: &MISSING,
                decimals: &MISSING,
            })
            .collect();
        let mut stakes: Vec<StakeWindow<'a>> = layout
            .stakes()
            .iter()
            .map(|s| StakeWindow {
                layout: s,
                getters: Vec::with_capacity(s.getters),
                info: None,
            })
            .collect();

        for (probe, result) in layout.slots().iter().zip(results) {
            match probe.slot {
                Slot::Native => native = result,
                Slot::TokenBalance { token } => tokens[token].balance = result,
                Slot::TokenDecimals { token } => tokens[token].decimals = result,
                Slot::StakeGetter { stake, .. } => stakes[stake].getters.push((probe.method, result)),
                Slot::StakeInfo { stake } => stakes[stake].info = Some((probe.method, result)),
            }
        }

        WalletWindow {
            wallet,
            native,
            tokens,
            stakes,
        }
    }

    /// Collapse the window into formatted facts, degrading every failure
    /// to its field's fallback.
    pub fn resolve(&self, native_decimals: u8) -> WalletFacts {
        let native_balance = self
            .native
            .uint(ReadMethod::GetEthBalance)
            .map(|v| format_native(v, native_decimals))
            .unwrap_or_else(|| "0".to_string());

        let tokens = self
            .tokens
            .iter()
            .map(|pair| {
                let value = match (
                    pair.balance.uint(ReadMethod::BalanceOf),
                    pair.decimals.uint(ReadMethod::Decimals),
                ) {
                    (Some(balance), Some(decimals)) => format_token(balance, decimals.saturating_to::<u8>()),
                    _ => "0".to_string(),
                };
                (pair.key.to_string(), value)
            })
            .collect();

        let mut stakes = BTreeMap::new();
        let mut stake_info = BTreeMap::new();
        for stake in &self.stakes {
            let amount = stake
                .getters
                .iter()
                .find_map(|(method, result)| result.uint(*method))
                .map(|v| format_token(v, stake.layout.decimals))
                .unwrap_or_else(|| "0".to_string());
            stakes.insert(stake.layout.key.clone(), amount);

            if let Some(blob) = stake
                .info
                .as_ref()
                .and_then(|(method, result)| result.bytes(*method))
            {
                stake_info.insert(stake.layout.key.clone(), blob.to_string());
            }
        }

        WalletFacts {
            address: self.wallet.to_string(),
            native_balance,
            tokens,
            stakes,
            stake_info,
        }
    }
}

/// Chain-read facts for one wallet, before enrichment and scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletFacts {
    pub address: String,
    pub native_balance: String,
    pub tokens: BTreeMap<String, String>,
    pub stakes: BTreeMap<String, String>,
    pub stake_info: BTreeMap<String, String>,
}

/// Split the flat result array into per-wallet windows, in plan order.
pub fn windows<'a>(
    plan: &'a CallPlan,
    results: &'a [CallResult],
) -> Result<Vec<WalletWindow<'a>>, EngineError> {
    if results.len() != plan.len() {
        return Err(EngineError::ResultCountMismatch {
            expected: plan.len(),
            actual: results.len(),
        });
    }
    let layout = plan.layout();
    let per_wallet = layout.calls_per_wallet();
    if per_wallet == 0 {
        return Ok(Vec::new());
    }

    Ok(plan
        .wallets()
        .iter()
        .zip(results.chunks_exact(per_wallet))
        .map(|(wallet, chunk)| WalletWindow::bind(layout, wallet, chunk))
        .collect())
}

/// Demultiplex a batch result into per-wallet facts, in plan order.
pub fn demux(plan: &CallPlan, results: &[CallResult]) -> Result<Vec<WalletFacts>, EngineError> {
    let native_decimals = plan.layout().native_decimals();
    Ok(windows(plan, results)?
        .iter()
        .map(|w| w.resolve(native_decimals))
        .collect())
}
