use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Wallet health tracker: batched on-chain balances, activity and a health
/// score for a set of addresses on one EVM chain.
#[derive(Parser)]
#[command(name = "wallet-health", version, about)]
pub struct Cli {
    /// Debug-level logging on stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Refresh every wallet and print a health table
    Refresh {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        wallets: WalletArgs,

        /// Print the full snapshot as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Refresh and print the unhealthy addresses, one per line
    Unhealthy {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        wallets: WalletArgs,
    },

    /// Print the deduplicated wallet set, one address per line
    Export {
        #[command(flatten)]
        wallets: WalletArgs,
    },

    /// Show the per-wallet call layout of the batched read
    Plan {
        /// Probe catalog JSON file (default: built-in Monad catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Number of wallets to size the batch for
        #[arg(long = "wallet-count", default_value = "1")]
        wallets: usize,
    },

    /// Print the probe catalog as JSON (edit it and pass it back with --catalog)
    Catalog {
        /// Probe catalog JSON file to normalize (default: built-in Monad catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Output the JSON schema for probe catalog files
    Schema,
}

/// Where to read from: catalog plus endpoint overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Probe catalog JSON file (default: built-in Monad catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the catalog's chain.rpc_url
    #[arg(long, env = "WALLET_HEALTH_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Etherscan-style activity index; unset disables last-active lookups
    #[arg(long, env = "WALLET_HEALTH_EXPLORER_URL")]
    pub explorer_url: Option<String>,

    /// API key for the activity index
    #[arg(long, env = "WALLET_HEALTH_EXPLORER_KEY", hide_env_values = true)]
    pub explorer_key: Option<String>,

    /// HTTP timeout for activity index requests (seconds)
    #[arg(long, default_value = "15")]
    pub http_timeout_secs: u64,
}

/// Which wallets to track.
#[derive(Args, Debug, Clone, Default)]
pub struct WalletArgs {
    /// Wallet addresses
    pub addresses: Vec<String>,

    /// File with one address per line (`#` comments and blank lines ignored)
    #[arg(long = "wallets")]
    pub wallets_file: Option<PathBuf>,
}
