use std::time::Duration;

use anyhow::{Result, bail};
use tracing::debug;

use crate::cli::{SourceArgs, WalletArgs};
use crate::model::catalog::ProbeCatalog;
use crate::model::wallet::WalletSet;
use crate::onchain::explorer::ExplorerClient;
use crate::onchain::reader::RpcReader;

/// Settings for one invocation, after flags, env and catalog file are merged.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Catalog with its chain section already carrying the resolved RPC and
    /// explorer URLs.
    pub catalog: ProbeCatalog,
    pub explorer_key: Option<String>,
    pub http_timeout: Duration,
}

impl RuntimeConfig {
    /// Resolve in order: flag or env (clap handles both), then the catalog
    /// file, then the built-in Monad defaults.
    pub fn from_cli(args: &SourceArgs) -> Result<Self> {
        let catalog = match &args.catalog {
            Some(path) => ProbeCatalog::load(path)?,
            None => ProbeCatalog::monad(),
        };
        Self::resolve(catalog, args)
    }

    pub fn resolve(mut catalog: ProbeCatalog, args: &SourceArgs) -> Result<Self> {
        if let Some(url) = non_empty(&args.rpc_url) {
            catalog.chain.rpc_url = url;
        }
        if let Some(url) = non_empty(&args.explorer_url) {
            catalog.chain.explorer_api_url = Some(url);
        }
        if args.http_timeout_secs == 0 {
            bail!("--http-timeout-secs must be at least 1");
        }

        Ok(RuntimeConfig {
            catalog,
            explorer_key: non_empty(&args.explorer_key),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
        })
    }

    pub fn reader(&self) -> Result<RpcReader> {
        RpcReader::connect(&self.catalog.chain)
    }

    /// Activity index client, `None` when no explorer URL is configured.
    pub fn activity_index(&self) -> Result<Option<ExplorerClient>> {
        let Some(url) = &self.catalog.chain.explorer_api_url else {
            debug!("no explorer URL configured");
            return Ok(None);
        };
        ExplorerClient::new(url.clone(), self.explorer_key.clone(), self.http_timeout).map(Some)
    }
}

/// Build the wallet set from positional addresses followed by the wallets
/// file, keeping first-seen order.
pub fn load_wallets(args: &WalletArgs) -> Result<WalletSet> {
    let mut wallets: WalletSet = args.addresses.iter().map(String::as_str).collect();
    if let Some(path) = &args.wallets_file {
        let from_file = WalletSet::load(path)?;
        wallets.extend(from_file.iter());
    }
    Ok(wallets)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
