
use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures_util::FutureExt;

use wallet_health::engine::EngineError;
use wallet_health::tracker::{RefreshStatus, Tracker};

use mock_common::*;

fn tracker(reader: Arc<MockReader>) -> Tracker {
    Tracker::new(ausd_catalog(), reader, None)
}

// ── Wallet set ───────────────────────────────────────────────────────

#[test]
fn test_add_and_remove_wallets() {
    let t = tracker(Arc::new(MockReader::new(ausd_responder)));
    assert!(t.add_wallet(WALLET_A));
    assert!(!t.add_wallet(WALLET_A));
    assert_eq!(t.add_wallets([WALLET_B, WALLET_A, WALLET_C]), 2);
    assert_eq!(t.wallets(), vec![WALLET_A, WALLET_B, WALLET_C]);

    assert!(t.remove_wallet(WALLET_B));
    assert!(!t.remove_wallet(WALLET_B));
    assert_eq!(t.wallets(), vec![WALLET_A, WALLET_C]);
    assert_eq!(t.status(), RefreshStatus::Idle);
}

// ── Refresh lifecycle ────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_then_remove_drops_record() {
    let reader = Arc::new(MockReader::new(ausd_responder).with_tx_count(WALLET_A, 30));
    let t = tracker(reader);
    t.add_wallets([WALLET_A, WALLET_B]);

    let snapshot = t.refresh().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(t.status(), RefreshStatus::Ready);
    assert_eq!(t.unhealthy_wallets(), vec![WALLET_B.to_string()]);

    t.remove_wallet(WALLET_B);
    assert!(t.record(WALLET_B).is_none());
    assert!(t.record(WALLET_A).is_some());
    assert!(t.unhealthy_wallets().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_records() {
    let reader = Arc::new(MockReader::new(ausd_responder).with_tx_count(WALLET_A, 6));
    let t = tracker(reader.clone());
    t.add_wallet(WALLET_A);

    let before = t.refresh().await.unwrap();

    reader.set_fail_batch(true);
    t.add_wallet(WALLET_B);
    let err = t.refresh().await.unwrap_err();
    assert!(matches!(err, EngineError::Batch(_)));
    assert!(matches!(t.status(), RefreshStatus::Failed(reason) if reason.contains("connection refused")));
    assert_eq!(t.snapshot(), before);

    // Recovery replaces the records wholesale.
    reader.set_fail_batch(false);
    let after = t.refresh().await.unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(t.status(), RefreshStatus::Ready);
}

#[tokio::test]
async fn test_empty_tracker_refreshes_without_io() {
    let reader = Arc::new(MockReader::new(ausd_responder));
    let t = tracker(reader.clone());
    let snapshot = t.refresh().await.unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(reader.batches.load(Ordering::SeqCst), 0);
    assert_eq!(t.status(), RefreshStatus::Ready);
}

#[tokio::test]
async fn test_overlapping_refresh_is_rejected() {
    let reader = Arc::new(MockReader::new(ausd_responder).gated());
    let t = tracker(reader.clone());
    t.add_wallet(WALLET_A);

    let (first, second) = tokio::join!(t.refresh(), async {
        while t.status() != RefreshStatus::Refreshing {
            tokio::task::yield_now().await;
        }
        let second = t.refresh().await;
        // Added mid-cycle: tracked, but not part of the running cycle.
        t.add_wallet(WALLET_B);
        reader.open_gate();
        second
    });

    assert!(matches!(second, Err(EngineError::RefreshInProgress)));
    let snapshot = first.unwrap();
    assert_eq!(snapshot.wallets, vec![WALLET_A.to_string()]);
    assert!(snapshot.get(WALLET_B).is_none());
    assert_eq!(t.wallets(), vec![WALLET_A, WALLET_B]);
    assert_eq!(reader.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wallet_removed_mid_cycle_stays_removed() {
    let reader = Arc::new(MockReader::new(ausd_responder).gated());
    let t = tracker(reader.clone());
    t.add_wallets([WALLET_A, WALLET_B]);

    let (result, _) = tokio::join!(t.refresh(), async {
        while reader.batches.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        t.remove_wallet(WALLET_A);
        reader.open_gate();
    });

    let snapshot = result.unwrap();
    assert!(snapshot.get(WALLET_A).is_none());
    assert!(snapshot.get(WALLET_B).is_some());
    assert_eq!(t.snapshot().wallets, vec![WALLET_B.to_string()]);
}

#[tokio::test]
async fn test_dropped_refresh_restores_status() {
    let reader = Arc::new(MockReader::new(ausd_responder).gated());
    let t = tracker(reader.clone());
    t.add_wallet(WALLET_A);

    // Abandon a cycle while its batch is held at the gate.
    let mut pending = Box::pin(t.refresh());
    assert!(pending.as_mut().now_or_never().is_none());
    assert_eq!(t.status(), RefreshStatus::Refreshing);
    drop(pending);
    assert_eq!(t.status(), RefreshStatus::Idle);

    // The guard is released too: the next cycle runs normally.
    reader.open_gate();
    t.refresh().await.unwrap();
    assert_eq!(t.status(), RefreshStatus::Ready);

    let mut pending = Box::pin(t.refresh());
    assert!(pending.as_mut().now_or_never().is_none());
    drop(pending);
    assert_eq!(t.status(), RefreshStatus::Ready);
    assert_eq!(t.snapshot().len(), 1);
}
