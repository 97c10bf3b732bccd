use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::engine::demux::CallResult;
use crate::engine::plan::ProbeSpec;
use crate::model::chain::Chain;

use super::abi::Multicall3;

// ── Chain read capability ────────────────────────────────────────────

/// Read-only access to the chain node.
///
/// The live implementation talks JSON-RPC; tests substitute scripted readers.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute every call as one batched request with per-call failure
    /// isolation. The returned vector is positionally aligned with `calls`;
    /// an `Err` means the whole request failed.
    async fn aggregate(&self, calls: &[ProbeSpec]) -> Result<Vec<CallResult>>;

    /// Outgoing transaction count (nonce) of `wallet` at the latest block.
    async fn transaction_count(&self, wallet: Address) -> Result<u64>;

    /// Timestamp (unix seconds) of block `number`, `None` if the node does
    /// not know the block.
    async fn block_timestamp(&self, number: u64) -> Result<Option<u64>>;
}

// ── JSON-RPC implementation ──────────────────────────────────────────

/// `ChainReader` backed by an HTTP provider and the chain's Multicall3.
pub struct RpcReader {
    provider: DynProvider,
    multicall: Address,
}

impl RpcReader {
    pub fn connect(chain: &Chain) -> Result<Self> {
        let url = chain
            .rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL for {chain}: {}", chain.rpc_url))?;
        let multicall = chain
            .multicall
            .parse::<Address>()
            .with_context(|| format!("invalid Multicall3 address: {}", chain.multicall))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(RpcReader {
            provider,
            multicall,
        })
    }
}

#[async_trait]
impl ChainReader for RpcReader {
    async fn aggregate(&self, calls: &[ProbeSpec]) -> Result<Vec<CallResult>> {
        let batch: Vec<Multicall3::Call3> = calls
            .iter()
            .map(|call| Multicall3::Call3 {
                target: call.target,
                allowFailure: true,
                callData: call.calldata(),
            })
            .collect();

        let multicall = Multicall3::new(self.multicall, &self.provider);
        let results = multicall
            .aggregate3(batch)
            .call()
            .await
            .context("Multicall3.aggregate3 failed")?;

        Ok(results
            .into_iter()
            .map(|r| {
                if r.success {
                    CallResult::Success(r.returnData)
                } else {
                    CallResult::Failure(revert_reason(&r.returnData))
                }
            })
            .collect())
    }

    async fn transaction_count(&self, wallet: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(wallet)
            .await
            .with_context(|| format!("eth_getTransactionCount({wallet})"))
    }

    async fn block_timestamp(&self, number: u64) -> Result<Option<u64>> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .with_context(|| format!("eth_getBlockByNumber({number})"))?;
        Ok(block.map(|b| b.header.timestamp))
    }
}

fn revert_reason(data: &[u8]) -> String {
    if data.is_empty() {
        "reverted".to_string()
    } else {
        format!("reverted: 0x{}", alloy::primitives::hex::encode(data))
    }
}
