// Storage tests - ledger snapshot persistence on a temporary sled database

use dripnet::ledger::DripLedger;
use dripnet::storage::{LedgerStore, StoreError};
use dripnet::token::{EmissionSchedule, HolderId};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn populated_ledger() -> DripLedger {
    let mut ledger = DripLedger::new(EmissionSchedule::new(vec![10, 20]));
    let alice = HolderId::from_label("alice");
    let bob = HolderId::from_label("bob");

    ledger.start_dripping(&alice, 0, 1, 0).unwrap();
    ledger.mint(&alice, 2, 7, 3).unwrap();
    ledger.set_approval_for_all(&alice, &bob, true);
    ledger
}

// ============================================================================
// SNAPSHOT ROUNDTRIP TESTS
// ============================================================================

#[test]
fn test_snapshot_roundtrip_preserves_ledger_semantics() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();
    let alice = HolderId::from_label("alice");
    let bob = HolderId::from_label("bob");

    let ledger = populated_ledger();
    store.save_ledger(&ledger).unwrap();
    store.flush().unwrap();

    let restored = store.load_ledger().unwrap().unwrap();

    // accrual picks up where it left off: anchor and multiplier survived
    assert_eq!(restored.balance_of(&alice, 0, 10), 100);
    assert_eq!(restored.balance_of(&alice, 2, 10), 7);
    assert_eq!(restored.multiplier_of(&alice, 0), 1);
    assert_eq!(restored.anchor_tick(&alice, 0), Some(0));
    assert!(restored.is_approved_for_all(&alice, &bob));
    assert_eq!(restored.schedule().rate(1), 20);
}

#[test]
fn test_load_from_empty_store_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();

    assert!(store.is_empty());
    assert!(store.load_ledger().unwrap().is_none());
}

#[test]
fn test_save_overwrites_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();
    let alice = HolderId::from_label("alice");

    let mut ledger = populated_ledger();
    store.save_ledger(&ledger).unwrap();

    ledger.mint(&alice, 2, 93, 5).unwrap();
    store.save_ledger(&ledger).unwrap();

    let restored = store.load_ledger().unwrap().unwrap();
    assert_eq!(restored.balance_of(&alice, 2, 5), 100);
}

#[test]
fn test_clear_ledger_removes_the_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();

    store.save_ledger(&populated_ledger()).unwrap();
    assert!(store.load_ledger().unwrap().is_some());

    store.clear_ledger().unwrap();
    assert!(store.load_ledger().unwrap().is_none());
}

#[test]
fn test_corrupted_snapshot_surfaces_a_deserialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();

    store.put_raw(b"ledger:state", b"not a snapshot").unwrap();

    assert!(matches!(
        store.load_ledger(),
        Err(StoreError::DeserializationFailed(_))
    ));
}

// ============================================================================
// RAW OPERATION TESTS
// ============================================================================

#[test]
fn test_raw_put_get_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();

    store.put_raw(b"key", b"value").unwrap();
    assert_eq!(store.get_raw(b"key").unwrap(), Some(b"value".to_vec()));

    store.delete(b"key").unwrap();
    assert_eq!(store.get_raw(b"key").unwrap(), None);
}

#[test]
fn test_stats_counts_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::open(dir.path()).unwrap();

    store.save_ledger(&populated_ledger()).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.key_count, 1);
}
