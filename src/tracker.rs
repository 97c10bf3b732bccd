use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::engine::{self, EngineError, select};
use crate::model::catalog::ProbeCatalog;
use crate::model::record::{Snapshot, WalletRecord};
use crate::model::wallet::WalletSet;
use crate::onchain::explorer::ActivityIndex;
use crate::onchain::reader::ChainReader;

/// Where the tracker is in its refresh lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// No refresh has run yet.
    Idle,
    Refreshing,
    /// The last cycle succeeded.
    Ready,
    /// The last cycle failed; records from the cycle before it are kept.
    Failed(String),
}

#[derive(Debug)]
struct TrackerState {
    wallets: WalletSet,
    snapshot: Snapshot,
    status: RefreshStatus,
}

/// Caller-side store: the user's wallet set, the last good snapshot and
/// the refresh status.
///
/// At most one refresh cycle runs at a time. A second `refresh` while one is
/// in flight returns [`EngineError::RefreshInProgress`] without touching state.
pub struct Tracker {
    catalog: ProbeCatalog,
    reader: Arc<dyn ChainReader>,
    activity: Option<Arc<dyn ActivityIndex>>,
    state: Mutex<TrackerState>,
    cycle: tokio::sync::Mutex<()>,
}

impl Tracker {
    pub fn new(
        catalog: ProbeCatalog,
        reader: Arc<dyn ChainReader>,
        activity: Option<Arc<dyn ActivityIndex>>,
    ) -> Self {
        Tracker {
            catalog,
            reader,
            activity,
            state: Mutex::new(TrackerState {
                wallets: WalletSet::new(),
                snapshot: Snapshot::default(),
                status: RefreshStatus::Idle,
            }),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    // ── Wallet set ───────────────────────────────────────────────────

    /// Add one wallet. Returns false if it was already tracked.
    pub fn add_wallet(&self, address: &str) -> bool {
        self.state.lock().wallets.insert(address)
    }

    /// Add several wallets, skipping ones already tracked. Returns how many were new.
    pub fn add_wallets<'a>(&self, addresses: impl IntoIterator<Item = &'a str>) -> usize {
        self.state.lock().wallets.extend(addresses)
    }

    /// Stop tracking a wallet and drop its record.
    pub fn remove_wallet(&self, address: &str) -> bool {
        let mut state = self.state.lock();
        let removed = state.wallets.remove(address);
        if removed {
            state.snapshot.records.remove(address);
            state.snapshot.wallets.retain(|w| w != address);
        }
        removed
    }

    pub fn wallets(&self) -> Vec<String> {
        self.state.lock().wallets.as_slice().to_vec()
    }

    // ── Results ──────────────────────────────────────────────────────

    pub fn status(&self) -> RefreshStatus {
        self.state.lock().status.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().snapshot.clone()
    }

    pub fn record(&self, address: &str) -> Option<WalletRecord> {
        self.state.lock().snapshot.get(address).cloned()
    }

    pub fn unhealthy_wallets(&self) -> Vec<String> {
        select::select_unhealthy(&self.state.lock().snapshot)
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Run one cycle over the wallet set as it is right now.
    ///
    /// On success every record is replaced. On failure the previous records
    /// stay in place and the status carries the reason.
    pub async fn refresh(&self) -> Result<Snapshot, EngineError> {
        let _cycle = self
            .cycle
            .try_lock()
            .map_err(|_| EngineError::RefreshInProgress)?;

        let (wallets, mut in_flight) = {
            let mut state = self.state.lock();
            let previous = std::mem::replace(&mut state.status, RefreshStatus::Refreshing);
            let in_flight = InFlight {
                state: &self.state,
                previous: Some(previous),
            };
            (state.wallets.as_slice().to_vec(), in_flight)
        };

        let outcome = engine::refresh(
            self.reader.as_ref(),
            self.activity.as_deref(),
            &wallets,
            &self.catalog,
        )
        .await;

        in_flight.finish();
        let mut state = self.state.lock();
        match outcome {
            Ok(mut snapshot) => {
                // Wallets removed mid-cycle stay removed.
                let set = &state.wallets;
                snapshot.wallets.retain(|w| set.contains(w));
                snapshot.records.retain(|w, _| set.contains(w));
                state.snapshot = snapshot.clone();
                state.status = RefreshStatus::Ready;
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous records");
                state.status = RefreshStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }
}

/// Puts the pre-cycle status back if a refresh future is dropped mid-cycle.
struct InFlight<'a> {
    state: &'a Mutex<TrackerState>,
    previous: Option<RefreshStatus>,
}

impl InFlight<'_> {
    fn finish(&mut self) {
        self.previous = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut state = self.state.lock();
            if state.status == RefreshStatus::Refreshing {
                state.status = previous;
            }
        }
    }
}
