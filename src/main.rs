use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use schemars::schema_for;
use tracing_subscriber::EnvFilter;

use wallet_health::cli::{self, Command, SourceArgs, WalletArgs};
use wallet_health::config::{self, RuntimeConfig};
use wallet_health::engine::plan::CallLayout;
use wallet_health::model::catalog::ProbeCatalog;
use wallet_health::model::record::Snapshot;
use wallet_health::onchain::explorer::ActivityIndex;
use wallet_health::report;
use wallet_health::tracker::Tracker;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Refresh {
            source,
            wallets,
            json,
        } => {
            let (snapshot, symbol) = refresh(&source, &wallets)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", report::render_table(&snapshot, &symbol));
            }
            Ok(())
        }
        Command::Unhealthy { source, wallets } => {
            let (snapshot, _) = refresh(&source, &wallets)?;
            let unhealthy = wallet_health::engine::select::select_unhealthy(&snapshot);
            if !unhealthy.is_empty() {
                println!("{}", unhealthy.join("\n"));
            }
            Ok(())
        }
        Command::Export { wallets } => {
            let set = config::load_wallets(&wallets)?;
            if !set.is_empty() {
                println!("{}", set.as_slice().join("\n"));
            }
            Ok(())
        }
        Command::Plan { catalog, wallets } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let layout = CallLayout::new(&catalog)?;
            println!("{}", catalog.chain);
            print!("{}", report::render_layout(&layout, wallets));
            Ok(())
        }
        Command::Catalog { catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            Ok(())
        }
        Command::Schema => {
            let schema = schema_for!(ProbeCatalog);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays clean for tables, JSON and address lists.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<ProbeCatalog> {
    match path {
        Some(path) => ProbeCatalog::load(path),
        None => Ok(ProbeCatalog::monad()),
    }
}

/// One refresh cycle through a `Tracker`; returns the snapshot and the
/// chain's native symbol for rendering.
fn refresh(source: &SourceArgs, wallets: &WalletArgs) -> Result<(Snapshot, String)> {
    let cfg = RuntimeConfig::from_cli(source)?;
    let set = config::load_wallets(wallets)?;
    let symbol = cfg.catalog.chain.native_symbol.clone();

    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    let snapshot = rt.block_on(async {
        let reader = Arc::new(cfg.reader()?);
        let activity = cfg
            .activity_index()?
            .map(|client| Arc::new(client) as Arc<dyn ActivityIndex>);

        let tracker = Tracker::new(cfg.catalog.clone(), reader, activity);
        tracker.add_wallets(set.iter());
        tracker
            .refresh()
            .await
            .with_context(|| format!("refreshing {} wallet(s) on {}", set.len(), cfg.catalog.chain))
    })?;
    Ok((snapshot, symbol))
}
