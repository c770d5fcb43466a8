// Emission schedule - the construction-time partition of token classes

use crate::token::TokenId;
use serde::{Deserialize, Serialize};

/// Drip configuration fixed at ledger creation.
///
/// Classes `0..k` are drippable, where `k` is the number of configured
/// rates; every id above that behaves as a plain fungible counter.
/// The schedule is immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSchedule {
    rates: Vec<u64>,
}

impl EmissionSchedule {
    /// Build a schedule from per-tick emission rates, one per drippable class
    pub fn new(rates: Vec<u64>) -> Self {
        Self { rates }
    }

    /// Number of drippable classes
    pub fn drippable_classes(&self) -> u64 {
        self.rates.len() as u64
    }

    /// Whether a class accrues balance while subscribed
    pub fn is_drippable(&self, id: TokenId) -> bool {
        id < self.rates.len() as u64
    }

    /// Per-tick emission rate for a class (0 for non-drippable ids)
    pub fn rate(&self, id: TokenId) -> u64 {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.rates.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// All configured rates, in class order
    pub fn rates(&self) -> &[u64] {
        &self.rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition() {
        let schedule = EmissionSchedule::new(vec![10, 20]);

        assert_eq!(schedule.drippable_classes(), 2);
        assert!(schedule.is_drippable(0));
        assert!(schedule.is_drippable(1));
        assert!(!schedule.is_drippable(2));
    }

    #[test]
    fn test_rates() {
        let schedule = EmissionSchedule::new(vec![10, 20]);

        assert_eq!(schedule.rate(0), 10);
        assert_eq!(schedule.rate(1), 20);
        assert_eq!(schedule.rate(2), 0);
        assert_eq!(schedule.rate(u64::MAX), 0);
    }

    #[test]
    fn test_empty_schedule_has_no_drippable_classes() {
        let schedule = EmissionSchedule::new(vec![]);

        assert_eq!(schedule.drippable_classes(), 0);
        assert!(!schedule.is_drippable(0));
    }
}
