//! Reconciliation between stake records and the staker registry.
//!
//! The ledger keeps both views equal at every commit. These checks exist to
//! detect and repair drift if that ever fails.

use crate::ledger::StakingLedger;
use cairn_types::{Address, AdminRegistry, DaoError, DaoResult};
use std::collections::BTreeSet;

/// Outcome of a `repair_sync` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRepair {
    pub account: Address,
    /// Amount in the stake record (source of truth)
    pub record_amount: u64,
    pub registry_before: u64,
    pub registry_after: u64,
    pub total_stakers_before: usize,
    pub total_stakers_after: usize,
    pub total_staked_after: u64,
}

impl SyncRepair {
    pub fn changed(&self) -> bool {
        self.registry_before != self.registry_after
            || self.total_stakers_before != self.total_stakers_after
    }
}

impl StakingLedger {
    /// True when the registry mirrors the account's record.
    ///
    /// A zero record must have no registry entry; a nonzero record must have
    /// an entry with the same amount.
    pub fn validate_sync(&self, account: &Address) -> bool {
        let record = self.staked_balance(account);
        match self.registry.entries.get(account) {
            Some(&registered) => registered != 0 && registered == record,
            None => record == 0,
        }
    }

    /// Every account whose two views disagree, sorted.
    pub fn validate_all(&self) -> Vec<Address> {
        let accounts: BTreeSet<Address> = self
            .records
            .keys()
            .chain(self.registry.accounts())
            .copied()
            .collect();
        accounts
            .into_iter()
            .filter(|a| !self.validate_sync(a))
            .collect()
    }

    /// Rewrite the registry entry of `account` from its stake record.
    ///
    /// Admin-only. Also recounts stakers and recomputes the staked total.
    pub fn repair_sync(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        account: Address,
    ) -> DaoResult<SyncRepair> {
        if !admins.is_admin(self.org, caller) {
            return Err(DaoError::NotAdmin);
        }

        let total_staked_after = self
            .records
            .values()
            .try_fold(0u64, |acc, r| acc.checked_add(r.staked_amount))
            .ok_or(DaoError::Overflow)?;

        let record_amount = self.staked_balance(&account);
        let registry_before = self.registry.amount(&account);
        let total_stakers_before = self.registry.total_stakers();

        self.registry.set(account, record_amount);
        let total_stakers_after = self.registry.recount();
        self.total_staked = total_staked_after;

        let repair = SyncRepair {
            account,
            record_amount,
            registry_before,
            registry_after: self.registry.amount(&account),
            total_stakers_before,
            total_stakers_after,
            total_staked_after,
        };

        if repair.changed() {
            tracing::warn!(
                "{}: repaired staker registry for {}: {} -> {} (stakers {} -> {})",
                self.org,
                account,
                repair.registry_before,
                repair.registry_after,
                total_stakers_before,
                total_stakers_after
            );
        } else {
            tracing::debug!("{}: registry already in sync for {}", self.org, account);
        }

        Ok(repair)
    }
}

#[cfg(any(test, feature = "test-util"))]
impl StakingLedger {
    /// Overwrite the registry entry of `account` without touching its
    /// record or the totals. Zero leaves a zero entry in place.
    pub fn force_registry_amount(&mut self, account: Address, amount: u64) {
        self.registry.entries.insert(account, amount);
    }
}
