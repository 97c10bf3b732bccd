use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;

use crate::model::catalog::{ProbeCatalog, ReadMethod, StakeProbe};
use crate::onchain::abi::{IERC20, IStakeProbe, Multicall3};

use super::EngineError;

// ── Slots ────────────────────────────────────────────────────────────

/// Role of one call inside a wallet's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Native balance via Multicall3.getEthBalance.
    Native,
    /// `balanceOf(wallet)` on the `token`-th catalog token.
    TokenBalance { token: usize },
    /// `decimals()` on the `token`-th catalog token.
    TokenDecimals { token: usize },
    /// `rank`-th getter in the `stake`-th stake source's fallback chain.
    StakeGetter { stake: usize, rank: usize },
    /// Info blob getter of the `stake`-th stake source.
    StakeInfo { stake: usize },
}

/// A slot bound to its contract call, minus the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotProbe {
    pub slot: Slot,
    pub target: Address,
    pub method: ReadMethod,
    /// The target may not implement `method`; failure is expected, not exceptional.
    pub optional: bool,
}

/// Per-wallet call template derived from a catalog.
///
/// Planning and demultiplexing both walk this template, so the number of
/// calls emitted per wallet and the window width used to read results back
/// cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLayout {
    slots: Vec<SlotProbe>,
    native_decimals: u8,
    token_keys: Vec<String>,
    stakes: Vec<StakeLayout>,
}

/// Static facts about one stake source needed at demux time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeLayout {
    pub key: String,
    pub decimals: u8,
    pub getters: usize,
    pub has_info: bool,
}

impl CallLayout {
    /// Build the template: native balance, then `[balance, decimals]` per
    /// token, then each stake source's getters followed by its info getter.
    pub fn new(catalog: &ProbeCatalog) -> Result<Self, EngineError> {
        let mut slots = Vec::new();

        slots.push(SlotProbe {
            slot: Slot::Native,
            target: parse_address(&catalog.chain.multicall)?,
            method: ReadMethod::GetEthBalance,
            optional: false,
        });

        for (token, probe) in catalog.tokens.iter().enumerate() {
            let target = parse_address(&probe.address)?;
            slots.push(SlotProbe {
                slot: Slot::TokenBalance { token },
                target,
                method: ReadMethod::BalanceOf,
                optional: false,
            });
            slots.push(SlotProbe {
                slot: Slot::TokenDecimals { token },
                target,
                method: ReadMethod::Decimals,
                optional: false,
            });
        }

        let mut stakes = Vec::with_capacity(catalog.stakes.len());
        for (stake, probe) in catalog.stakes.iter().enumerate() {
            check_stake(probe)?;
            let target = parse_address(&probe.address)?;
            for (rank, method) in probe.getters.iter().enumerate() {
                slots.push(SlotProbe {
                    slot: Slot::StakeGetter { stake, rank },
                    target,
                    method: *method,
                    optional: true,
                });
            }
            if let Some(method) = probe.info {
                slots.push(SlotProbe {
                    slot: Slot::StakeInfo { stake },
                    target,
                    method,
                    optional: true,
                });
            }
            stakes.push(StakeLayout {
                key: probe.key.clone(),
                decimals: probe.decimals,
                getters: probe.getters.len(),
                has_info: probe.info.is_some(),
            });
        }

        Ok(CallLayout {
            slots,
            native_decimals: catalog.chain.native_decimals,
            token_keys: catalog.tokens.iter().map(|t| t.key.clone()).collect(),
            stakes,
        })
    }

    /// Number of calls every wallet contributes to the batch.
    pub fn calls_per_wallet(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[SlotProbe] {
        &self.slots
    }

    pub fn native_decimals(&self) -> u8 {
        self.native_decimals
    }

    pub fn token_keys(&self) -> &[String] {
        &self.token_keys
    }

    pub fn stakes(&self) -> &[StakeLayout] {
        &self.stakes
    }
}

/// Getters must decode as amounts and the info getter as a blob; anything
/// else would succeed on chain and still read back as "0" or absent.
fn check_stake(probe: &StakeProbe) -> Result<(), EngineError> {
    let invalid = |reason: String| EngineError::InvalidCatalog {
        key: probe.key.clone(),
        reason,
    };
    if probe.getters.is_empty() {
        return Err(invalid("no amount getters".into()));
    }
    if let Some(method) = probe.getters.iter().find(|m| !m.is_amount_getter()) {
        return Err(invalid(format!("`{method}` is not a per-wallet uint256 getter")));
    }
    match probe.info {
        Some(method) if !method.is_blob_getter() => {
            Err(invalid(format!("info getter `{method}` does not return bytes")))
        }
        _ => Ok(()),
    }
}

fn parse_address(s: &str) -> Result<Address, EngineError> {
    s.trim()
        .parse::<Address>()
        .map_err(|_| EngineError::InvalidAddress {
            address: s.to_string(),
        })
}

// ── Planned calls ────────────────────────────────────────────────────

/// One read call in the flat batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSpec {
    pub target: Address,
    pub method: ReadMethod,
    /// Wallet the call is made for.
    pub wallet: Address,
    pub optional: bool,
}

impl ProbeSpec {
    /// ABI-encoded calldata. Every method but `decimals()` takes the wallet.
    pub fn calldata(&self) -> Bytes {
        let account = self.wallet;
        let encoded = match self.method {
            ReadMethod::GetEthBalance => Multicall3::getEthBalanceCall { addr: account }.abi_encode(),
            ReadMethod::BalanceOf => IERC20::balanceOfCall { account }.abi_encode(),
            ReadMethod::Decimals => IERC20::decimalsCall {}.abi_encode(),
            ReadMethod::PrincipalOf => IStakeProbe::principalOfCall { account }.abi_encode(),
            ReadMethod::StakedOf => IStakeProbe::stakedOfCall { account }.abi_encode(),
            ReadMethod::UserInfo => IStakeProbe::userInfoCall { account }.abi_encode(),
        };
        encoded.into()
    }
}

/// Flat, wallet-major batch of calls plus the layout needed to read it back.
#[derive(Debug, Clone)]
pub struct CallPlan {
    layout: CallLayout,
    wallets: Vec<String>,
    calls: Vec<ProbeSpec>,
}

impl CallPlan {
    pub fn layout(&self) -> &CallLayout {
        &self.layout
    }

    /// Wallets in planning order.
    pub fn wallets(&self) -> &[String] {
        &self.wallets
    }

    pub fn calls(&self) -> &[ProbeSpec] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Lay out one contiguous window of calls per wallet, in wallet order.
pub fn plan(wallets: &[String], catalog: &ProbeCatalog) -> Result<CallPlan, EngineError> {
    let layout = CallLayout::new(catalog)?;
    let mut calls = Vec::with_capacity(wallets.len() * layout.calls_per_wallet());

    for wallet in wallets {
        let account = parse_address(wallet)?;
        calls.extend(layout.slots().iter().map(|probe| ProbeSpec {
            target: probe.target,
            method: probe.method,
            wallet: account,
            optional: probe.optional,
        }));
    }

    Ok(CallPlan {
        layout,
        wallets: wallets.to_vec(),
        calls,
    })
}
