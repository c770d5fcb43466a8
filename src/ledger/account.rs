// Drip account - settled balance plus lazily realized accrual

use crate::token::Tick;
use serde::{Deserialize, Serialize};

/// Per-(holder, class) balance state.
///
/// The effective balance at tick `t >= anchor` is
/// `settled + multiplier * rate * (t - anchor)`. Settlement folds that
/// pending growth into `settled` and moves the anchor forward; every other
/// mutation happens against the settled amount afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripAccount {
    /// Amount already realized, excluding pending accrual
    settled: u64,
    /// Sum of all active accrual subscriptions
    multiplier: u64,
    /// Tick at which `settled` and `multiplier` were last reconciled
    anchor: Tick,
}

impl DripAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Realized balance, excluding pending accrual
    pub fn settled(&self) -> u64 {
        self.settled
    }

    /// Sum of active accrual subscriptions
    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Tick of the last reconciliation
    pub fn anchor(&self) -> Tick {
        self.anchor
    }

    /// Accrual earned since the anchor, clamped to what a u64 can hold.
    /// A tick older than the anchor counts as zero elapsed time.
    pub fn pending(&self, rate: u64, tick: Tick) -> u64 {
        let elapsed = tick.saturating_sub(self.anchor);
        let grown = self.multiplier as u128 * rate as u128 * elapsed as u128;
        u64::try_from(grown).unwrap_or(u64::MAX)
    }

    /// Effective balance as-if settlement had just run
    pub fn effective(&self, rate: u64, tick: Tick) -> u64 {
        self.settled.saturating_add(self.pending(rate, tick))
    }

    /// Fold pending accrual into the settled balance and advance the anchor.
    /// Idempotent at equal ticks: zero elapsed yields zero pending.
    /// Returns the amount realized.
    pub(crate) fn settle(&mut self, rate: u64, tick: Tick) -> u64 {
        let pending = self.pending(rate, tick);
        self.settled = self.settled.saturating_add(pending);
        self.anchor = self.anchor.max(tick);
        pending
    }

    /// Overwrite the settled balance; the caller has already settled the
    /// account at the current tick and validated the new value
    pub(crate) fn set_settled(&mut self, settled: u64) {
        self.settled = settled;
    }

    /// Stack an accrual subscription onto this account
    pub(crate) fn add_multiplier(&mut self, multiplier: u64) {
        self.multiplier = self.multiplier.saturating_add(multiplier);
    }

    /// Retire part of the active multiplier; the caller has validated that
    /// at least this much is active
    pub(crate) fn sub_multiplier(&mut self, multiplier: u64) {
        self.multiplier = self.multiplier.saturating_sub(multiplier);
    }
}
