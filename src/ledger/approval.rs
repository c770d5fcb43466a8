// Approval registry - operator grants across all token classes

use crate::token::HolderId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Operator approvals: which operators may move an owner's balances.
///
/// A grant covers every token class. Only the owner mutates their own
/// grants; an absent pair reads as not approved.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApprovalRegistry {
    grants: HashMap<HolderId, HashSet<HolderId>>,
}

impl ApprovalRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or revoke operator rights for an owner
    pub fn set(&mut self, owner: &HolderId, operator: &HolderId, approved: bool) {
        if approved {
            self.grants
                .entry(owner.clone())
                .or_default()
                .insert(operator.clone());
        } else if let Some(operators) = self.grants.get_mut(owner) {
            operators.remove(operator);
            if operators.is_empty() {
                self.grants.remove(owner);
            }
        }
    }

    /// Whether the operator may move the owner's balances
    pub fn is_approved(&self, owner: &HolderId, operator: &HolderId) -> bool {
        self.grants
            .get(owner)
            .map(|operators| operators.contains(operator))
            .unwrap_or(false)
    }

    /// Total number of active grants
    pub fn grant_count(&self) -> usize {
        self.grants.values().map(|operators| operators.len()).sum()
    }

    /// Check if no grants are active
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let owner = HolderId::from_label("owner");
        let operator = HolderId::from_label("operator");
        let mut registry = ApprovalRegistry::new();

        assert!(!registry.is_approved(&owner, &operator));

        registry.set(&owner, &operator, true);
        assert!(registry.is_approved(&owner, &operator));
        assert_eq!(registry.grant_count(), 1);

        registry.set(&owner, &operator, false);
        assert!(!registry.is_approved(&owner, &operator));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_grants_are_directional() {
        let owner = HolderId::from_label("owner");
        let operator = HolderId::from_label("operator");
        let mut registry = ApprovalRegistry::new();

        registry.set(&owner, &operator, true);

        assert!(!registry.is_approved(&operator, &owner));
    }

    #[test]
    fn test_revoking_absent_grant_is_harmless() {
        let owner = HolderId::from_label("owner");
        let operator = HolderId::from_label("operator");
        let mut registry = ApprovalRegistry::new();

        registry.set(&owner, &operator, false);

        assert!(registry.is_empty());
    }
}
