// Storage module - PERSISTENCE
// Handles persistent ledger snapshots using sled

mod store;

pub use store::{LedgerStore, StorageStats, StoreError};
