// Drip ledger - multi-token balances with lazily settled per-tick accrual

use crate::ledger::account::DripAccount;
use crate::ledger::approval::ApprovalRegistry;
use crate::token::{EmissionSchedule, HolderId, Tick, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur during ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Length mismatch: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Token {id} is not drippable")]
    NotDrippable { id: TokenId },

    #[error("Holder is not accruing this token")]
    NotAccruing,

    #[error("Insufficient multiplier: active {active}, requested {requested}")]
    InsufficientMultiplier { active: u64, requested: u64 },

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("Caller is neither the owner nor an approved operator")]
    NotAuthorized,

    #[error("Multiplier must be positive")]
    InvalidMultiplier,

    #[error("Balance would overflow")]
    BalanceOverflow,

    #[error("Snapshot decode failed: {0}")]
    SnapshotFailed(String),
}

/// Statistics about the ledger state
#[derive(Clone, Debug)]
pub struct LedgerStats {
    /// Number of holders with at least one account
    pub holder_count: usize,
    /// Number of (holder, class) accounts
    pub account_count: usize,
    /// Number of active operator grants
    pub approval_count: usize,
}

/// The drip ledger - owns per-(holder, class) accounts and operator grants.
///
/// Every mutating operation takes the environment's current tick as an
/// explicit argument and settles each drippable account it touches before
/// reading or changing it. Failed operations leave no state change behind,
/// not even settlement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DripLedger {
    /// Immutable drippable-class configuration
    schedule: EmissionSchedule,
    /// Holder -> class -> account
    accounts: HashMap<HolderId, HashMap<TokenId, DripAccount>>,
    /// Operator grants
    approvals: ApprovalRegistry,
}

impl DripLedger {
    /// Create an empty ledger over the given emission schedule
    pub fn new(schedule: EmissionSchedule) -> Self {
        Self {
            schedule,
            accounts: HashMap::new(),
            approvals: ApprovalRegistry::new(),
        }
    }

    /// Get the emission schedule
    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    /// Get ledger statistics
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            holder_count: self.accounts.len(),
            account_count: self.accounts.values().map(|classes| classes.len()).sum(),
            approval_count: self.approvals.grant_count(),
        }
    }

    // ========================================================================
    // BALANCE QUERIES
    // ========================================================================

    /// Effective balance of a holder for a class at the given tick.
    /// Computed as-if settlement had just run; absent accounts read as zero.
    pub fn balance_of(&self, holder: &HolderId, id: TokenId, tick: Tick) -> u64 {
        match self.account(holder, id) {
            Some(account) => account.effective(self.schedule.rate(id), tick),
            None => 0,
        }
    }

    /// Effective balances for parallel (holder, class) pairs
    pub fn balance_of_batch(
        &self,
        holders: &[HolderId],
        ids: &[TokenId],
        tick: Tick,
    ) -> Result<Vec<u64>, LedgerError> {
        check_lengths(holders.len(), ids.len())?;

        Ok(holders
            .iter()
            .zip(ids)
            .map(|(holder, &id)| self.balance_of(holder, id, tick))
            .collect())
    }

    /// Sum of all holders' effective balances for a class
    pub fn class_total(&self, id: TokenId, tick: Tick) -> u64 {
        let rate = self.schedule.rate(id);
        self.accounts
            .values()
            .filter_map(|classes| classes.get(&id))
            .map(|account| account.effective(rate, tick))
            .fold(0u64, |total, balance| total.saturating_add(balance))
    }

    /// Current multiplier sum for a holder and class
    pub fn multiplier_of(&self, holder: &HolderId, id: TokenId) -> u64 {
        self.account(holder, id)
            .map(|account| account.multiplier())
            .unwrap_or(0)
    }

    /// Tick the account was last settled at; None for untouched accounts
    pub fn anchor_tick(&self, holder: &HolderId, id: TokenId) -> Option<Tick> {
        self.account(holder, id).map(|account| account.anchor())
    }

    // ========================================================================
    // MINT AND BURN
    // ========================================================================

    /// Credit freshly minted tokens to a holder.
    ///
    /// Works identically for drippable and non-drippable classes and never
    /// alters the multiplier. Gating who may mint is the embedder's concern;
    /// the ledger only enforces the settlement discipline.
    pub fn mint(
        &mut self,
        to: &HolderId,
        id: TokenId,
        amount: u64,
        tick: Tick,
    ) -> Result<(), LedgerError> {
        let next = self
            .balance_of(to, id, tick)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        self.settle(to, id, tick).set_settled(next);
        debug!(to = %to, id, amount, tick, "mint");
        Ok(())
    }

    /// Mint several classes to one holder; entries may repeat a class and
    /// accumulate in array order. All-or-nothing.
    pub fn batch_mint(
        &mut self,
        to: &HolderId,
        ids: &[TokenId],
        amounts: &[u64],
        tick: Tick,
    ) -> Result<(), LedgerError> {
        check_lengths(ids.len(), amounts.len())?;

        let mut projected: HashMap<(HolderId, TokenId), u64> = HashMap::new();
        for (&id, &amount) in ids.iter().zip(amounts) {
            let next = self
                .projected_balance(&projected, to, id, tick)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow)?;
            projected.insert((to.clone(), id), next);
        }

        self.commit_projected(projected, tick);
        debug!(to = %to, entries = ids.len(), tick, "batch mint");
        Ok(())
    }

    /// Destroy tokens from a holder's settled balance
    pub fn burn(
        &mut self,
        from: &HolderId,
        id: TokenId,
        amount: u64,
        tick: Tick,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from, id, tick);
        let next = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available,
                required: amount,
            })?;

        self.settle(from, id, tick).set_settled(next);
        debug!(from = %from, id, amount, tick, "burn");
        Ok(())
    }

    /// Burn several classes from one holder; entries may repeat a class and
    /// accumulate in array order. All-or-nothing: a single insufficient
    /// entry leaves every balance untouched.
    pub fn batch_burn(
        &mut self,
        from: &HolderId,
        ids: &[TokenId],
        amounts: &[u64],
        tick: Tick,
    ) -> Result<(), LedgerError> {
        check_lengths(ids.len(), amounts.len())?;

        let mut projected: HashMap<(HolderId, TokenId), u64> = HashMap::new();
        for (&id, &amount) in ids.iter().zip(amounts) {
            let available = self.projected_balance(&projected, from, id, tick);
            let next = available
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    available,
                    required: amount,
                })?;
            projected.insert((from.clone(), id), next);
        }

        self.commit_projected(projected, tick);
        debug!(from = %from, entries = ids.len(), tick, "batch burn");
        Ok(())
    }

    // ========================================================================
    // DRIP SUBSCRIPTIONS
    // ========================================================================

    /// Subscribe a holder to accrual for a drippable class.
    ///
    /// Subscriptions stack: repeated calls add up with no cap or dedup.
    /// Settlement runs first, so growth earned under the old multiplier is
    /// captured before the rate changes.
    pub fn start_dripping(
        &mut self,
        holder: &HolderId,
        id: TokenId,
        multiplier: u64,
        tick: Tick,
    ) -> Result<(), LedgerError> {
        if !self.schedule.is_drippable(id) {
            return Err(LedgerError::NotDrippable { id });
        }
        if multiplier == 0 {
            return Err(LedgerError::InvalidMultiplier);
        }

        self.settle(holder, id, tick).add_multiplier(multiplier);
        debug!(holder = %holder, id, multiplier, tick, "start dripping");
        Ok(())
    }

    /// Retire part of a holder's active multiplier for a drippable class.
    ///
    /// Settlement runs first, realizing all accrual earned under the
    /// outgoing multiplier up to the current tick.
    pub fn stop_dripping(
        &mut self,
        holder: &HolderId,
        id: TokenId,
        multiplier: u64,
        tick: Tick,
    ) -> Result<(), LedgerError> {
        if !self.schedule.is_drippable(id) {
            return Err(LedgerError::NotDrippable { id });
        }
        if multiplier == 0 {
            return Err(LedgerError::InvalidMultiplier);
        }

        let active = self.multiplier_of(holder, id);
        if active == 0 {
            return Err(LedgerError::NotAccruing);
        }
        if active < multiplier {
            return Err(LedgerError::InsufficientMultiplier {
                active,
                requested: multiplier,
            });
        }

        self.settle(holder, id, tick).sub_multiplier(multiplier);
        debug!(holder = %holder, id, multiplier, tick, "stop dripping");
        Ok(())
    }

    // ========================================================================
    // TRANSFERS
    // ========================================================================

    /// Move tokens between holders.
    ///
    /// The caller must be `from` or an approved operator. Both sides settle
    /// independently and keep their own multiplier and anchor; accrual is a
    /// property of the account, not of the tokens, so it never moves with
    /// them. The opaque `data` payload is accepted for the benefit of
    /// receiver-side collaborators and ignored here.
    pub fn safe_transfer_from(
        &mut self,
        caller: &HolderId,
        from: &HolderId,
        to: &HolderId,
        id: TokenId,
        amount: u64,
        data: &[u8],
        tick: Tick,
    ) -> Result<(), LedgerError> {
        self.authorize(caller, from)?;

        let available = self.balance_of(from, id, tick);
        let new_from = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available,
                required: amount,
            })?;

        if from == to {
            self.settle(from, id, tick);
        } else {
            let new_to = self
                .balance_of(to, id, tick)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow)?;
            self.settle(from, id, tick).set_settled(new_from);
            self.settle(to, id, tick).set_settled(new_to);
        }

        debug!(from = %from, to = %to, id, amount, tick, data_len = data.len(), "transfer");
        Ok(())
    }

    /// Move several classes between two holders; entries may repeat a class
    /// and accumulate in array order. Authorization is checked once for the
    /// whole batch. All-or-nothing.
    pub fn safe_batch_transfer_from(
        &mut self,
        caller: &HolderId,
        from: &HolderId,
        to: &HolderId,
        ids: &[TokenId],
        amounts: &[u64],
        data: &[u8],
        tick: Tick,
    ) -> Result<(), LedgerError> {
        check_lengths(ids.len(), amounts.len())?;
        self.authorize(caller, from)?;

        let mut projected: HashMap<(HolderId, TokenId), u64> = HashMap::new();
        for (&id, &amount) in ids.iter().zip(amounts) {
            let available = self.projected_balance(&projected, from, id, tick);
            let new_from = available
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    available,
                    required: amount,
                })?;
            projected.insert((from.clone(), id), new_from);

            let new_to = self
                .projected_balance(&projected, to, id, tick)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow)?;
            projected.insert((to.clone(), id), new_to);
        }

        self.commit_projected(projected, tick);
        debug!(
            from = %from,
            to = %to,
            entries = ids.len(),
            tick,
            data_len = data.len(),
            "batch transfer"
        );
        Ok(())
    }

    // ========================================================================
    // APPROVALS
    // ========================================================================

    /// Grant or revoke an operator's right to move the owner's balances
    /// across all token classes
    pub fn set_approval_for_all(
        &mut self,
        owner: &HolderId,
        operator: &HolderId,
        approved: bool,
    ) {
        self.approvals.set(owner, operator, approved);
        debug!(owner = %owner, operator = %operator, approved, "set approval");
    }

    /// Whether the operator may move the owner's balances
    pub fn is_approved_for_all(&self, owner: &HolderId, operator: &HolderId) -> bool {
        self.approvals.is_approved(owner, operator)
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Serialize the ledger snapshot to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        postcard::to_allocvec(self).unwrap_or_default()
    }

    /// Deserialize a ledger snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        postcard::from_bytes(bytes).map_err(|e| LedgerError::SnapshotFailed(e.to_string()))
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn account(&self, holder: &HolderId, id: TokenId) -> Option<&DripAccount> {
        self.accounts.get(holder).and_then(|classes| classes.get(&id))
    }

    /// Settle the account at the given tick, creating it on first touch,
    /// and hand it back for mutation
    fn settle(&mut self, holder: &HolderId, id: TokenId, tick: Tick) -> &mut DripAccount {
        let rate = self.schedule.rate(id);
        let account = self
            .accounts
            .entry(holder.clone())
            .or_default()
            .entry(id)
            .or_default();

        let realized = account.settle(rate, tick);
        if realized > 0 {
            trace!(holder = %holder, id, realized, tick, "settled pending accrual");
        }
        account
    }

    fn authorize(&self, caller: &HolderId, from: &HolderId) -> Result<(), LedgerError> {
        if caller == from || self.approvals.is_approved(from, caller) {
            Ok(())
        } else {
            Err(LedgerError::NotAuthorized)
        }
    }

    /// Effective balance of an account as seen partway through validating a
    /// batch: the projected value if an earlier entry touched it, otherwise
    /// the live effective balance
    fn projected_balance(
        &self,
        projected: &HashMap<(HolderId, TokenId), u64>,
        holder: &HolderId,
        id: TokenId,
        tick: Tick,
    ) -> u64 {
        projected
            .get(&(holder.clone(), id))
            .copied()
            .unwrap_or_else(|| self.balance_of(holder, id, tick))
    }

    /// Apply a fully validated batch projection: settle each touched account
    /// at the tick, then store its projected settled balance
    fn commit_projected(&mut self, projected: HashMap<(HolderId, TokenId), u64>, tick: Tick) {
        for ((holder, id), settled) in projected {
            self.settle(&holder, id, tick).set_settled(settled);
        }
    }
}

fn check_lengths(left: usize, right: usize) -> Result<(), LedgerError> {
    if left != right {
        return Err(LedgerError::LengthMismatch { left, right });
    }
    Ok(())
}
