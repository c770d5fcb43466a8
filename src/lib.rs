// dripnet - Multi-token ledger with lazily settled per-tick drip accrual
//
// Token classes below the configured threshold accrue balance every tick
// while a holder is subscribed; the rest behave as plain fungible counters.
// Pending accrual is realized lazily by a settlement step that runs before
// every balance mutation, so no per-tick bookkeeping ever happens.

pub mod ledger;
pub mod storage;
pub mod token;
