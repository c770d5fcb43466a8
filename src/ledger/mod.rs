// Ledger module - THE DRIP CORE
// Per-(holder, class) accounts, operator approvals, and the settlement
// protocol that reconciles continuous accrual with discrete mutations

mod account;
mod approval;
mod drip;

pub use account::DripAccount;
pub use approval::ApprovalRegistry;
pub use drip::{DripLedger, LedgerError, LedgerStats};
