//! Stake ledger for one organization.
//!
//! Holds two views of every stake: the account's own [`StakeRecord`] and the
//! organization's [`StakerRegistry`]. Both are written inside the same method
//! after every new value has been computed and checked, so a failed operation
//! never leaves one side updated without the other.

use crate::registry::{EntryChange, StakerRegistry};
use crate::wallet::Wallet;
use cairn_types::{Address, DaoError, DaoResult, OrgId, Timestamp, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cool-down after the latest stake before any unstake is allowed.
pub const DEFAULT_LOCK_PERIOD_SECS: u64 = 7 * SECONDS_PER_DAY;

/// Stake held by one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Amount currently staked
    pub staked_amount: u64,
    /// Time of the most recent stake (restarts the time-lock)
    pub last_staked_at: Timestamp,
}

impl StakeRecord {
    /// Earliest time an unstake is permitted.
    pub fn unlocks_at(&self, lock_period: u64) -> Timestamp {
        self.last_staked_at.saturating_add(lock_period)
    }
}

/// Stake event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeEvent {
    pub account: Address,
    pub amount: u64,
    pub staked_after: u64,
    pub new_staker: bool,
    pub timestamp: Timestamp,
}

/// Unstake event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnstakeEvent {
    pub account: Address,
    pub amount: u64,
    pub staked_after: u64,
    pub staker_removed: bool,
    pub timestamp: Timestamp,
}

/// Staking state of one organization.
#[derive(Debug, Clone)]
pub struct StakingLedger {
    pub(crate) org: OrgId,
    pub(crate) lock_period: u64,
    pub(crate) records: HashMap<Address, StakeRecord>,
    pub(crate) registry: StakerRegistry,
    pub(crate) total_staked: u64,
    /// Funds held in the organization's locked vault
    pub(crate) vault_balance: u64,
}

impl StakingLedger {
    /// Create an empty ledger with the default 7-day lock.
    pub fn new(org: OrgId) -> Self {
        Self::with_lock_period(org, DEFAULT_LOCK_PERIOD_SECS)
    }

    pub fn with_lock_period(org: OrgId, lock_period: u64) -> Self {
        Self {
            org,
            lock_period,
            records: HashMap::new(),
            registry: StakerRegistry::new(),
            total_staked: 0,
            vault_balance: 0,
        }
    }

    pub fn org(&self) -> OrgId {
        self.org
    }

    pub fn lock_period(&self) -> u64 {
        self.lock_period
    }

    /// Lock `amount` from the account's wallet into the organization vault.
    ///
    /// # Errors
    /// - `InvalidParameter` for a zero amount
    /// - `InsufficientBalance` if the wallet holds less than `amount`
    /// - `Overflow` if any balance would exceed `u64::MAX`
    pub fn stake(
        &mut self,
        wallet: &dyn Wallet,
        account: Address,
        amount: u64,
        now: Timestamp,
    ) -> DaoResult<StakeEvent> {
        if amount == 0 {
            return Err(DaoError::InvalidParameter("stake amount must be nonzero".to_string()));
        }

        let have = wallet.balance_of(&account);
        if have < amount {
            return Err(DaoError::InsufficientBalance {
                required: amount,
                have,
            });
        }

        let current = self.staked_balance(&account);
        let staked_after = current.checked_add(amount).ok_or(DaoError::Overflow)?;
        let registry_after = self
            .registry
            .amount(&account)
            .checked_add(amount)
            .ok_or(DaoError::Overflow)?;
        let total_after = self.total_staked.checked_add(amount).ok_or(DaoError::Overflow)?;
        let vault_after = self.vault_balance.checked_add(amount).ok_or(DaoError::Overflow)?;

        wallet.debit(&account, amount)?;

        self.records.insert(
            account,
            StakeRecord {
                staked_amount: staked_after,
                last_staked_at: now,
            },
        );
        let change = self.registry.set(account, registry_after);
        self.total_staked = total_after;
        self.vault_balance = vault_after;

        tracing::info!(
            "{}: {} staked {} (balance {}, total staked {})",
            self.org,
            account,
            amount,
            staked_after,
            total_after
        );

        Ok(StakeEvent {
            account,
            amount,
            staked_after,
            new_staker: change == EntryChange::Inserted,
            timestamp: now,
        })
    }

    /// Release `amount` from the vault back to the account's wallet.
    ///
    /// # Errors
    /// - `InvalidUnstakeAmount` for zero or more than the staked amount
    /// - `TimeLockActive` before `last_staked_at + lock_period`
    /// - `InconsistentWeight` if the registry holds less than the record
    pub fn unstake(
        &mut self,
        wallet: &dyn Wallet,
        account: Address,
        amount: u64,
        now: Timestamp,
    ) -> DaoResult<UnstakeEvent> {
        let record = self.records.get(&account).copied();
        let staked = record.map(|r| r.staked_amount).unwrap_or(0);

        if amount == 0 || amount > staked {
            return Err(DaoError::InvalidUnstakeAmount {
                requested: amount,
                staked,
            });
        }
        let record = record.ok_or(DaoError::InvalidUnstakeAmount {
            requested: amount,
            staked,
        })?;

        let unlocks_at = record.unlocks_at(self.lock_period);
        if now < unlocks_at {
            return Err(DaoError::TimeLockActive { unlocks_at });
        }

        let registered = self.registry.amount(&account);
        let registry_after = registered
            .checked_sub(amount)
            .ok_or(DaoError::InconsistentWeight {
                stake: staked,
                power: registered,
            })?;
        let staked_after = staked - amount;
        let total_after = self.total_staked.checked_sub(amount).ok_or(DaoError::Overflow)?;
        let vault_after = self.vault_balance.checked_sub(amount).ok_or(DaoError::Overflow)?;

        wallet.credit(&account, amount)?;

        self.records.insert(
            account,
            StakeRecord {
                staked_amount: staked_after,
                last_staked_at: record.last_staked_at,
            },
        );
        let change = self.registry.set(account, registry_after);
        self.total_staked = total_after;
        self.vault_balance = vault_after;

        tracing::info!(
            "{}: {} unstaked {} (balance {}, total staked {})",
            self.org,
            account,
            amount,
            staked_after,
            total_after
        );

        Ok(UnstakeEvent {
            account,
            amount,
            staked_after,
            staker_removed: change == EntryChange::Removed,
            timestamp: now,
        })
    }

    /// Staked balance from the account's own record.
    pub fn staked_balance(&self, account: &Address) -> u64 {
        self.records
            .get(account)
            .map(|r| r.staked_amount)
            .unwrap_or(0)
    }

    /// Staked amount from the registry, 0 if absent.
    pub fn staker_amount(&self, account: &Address) -> u64 {
        self.registry.amount(account)
    }

    pub fn total_staked(&self) -> u64 {
        self.total_staked
    }

    pub fn total_stakers(&self) -> usize {
        self.registry.total_stakers()
    }

    pub fn vault_balance(&self) -> u64 {
        self.vault_balance
    }

    pub fn stake_record(&self, account: &Address) -> Option<&StakeRecord> {
        self.records.get(account)
    }

    /// Registry snapshot sorted by address.
    pub fn stakers(&self) -> Vec<(Address, u64)> {
        self.registry.entries()
    }

    pub fn registry(&self) -> &StakerRegistry {
        &self.registry
    }

    /// Vote weight of `account`, read now.
    ///
    /// The record is checked against the registry on every read; callers must
    /// not cache the result across operations.
    pub fn voting_weight(&self, account: &Address) -> DaoResult<u64> {
        let stake = self.staked_balance(account);
        let registered = self.staker_amount(account);
        if stake != registered {
            return Err(DaoError::InconsistentWeight {
                stake,
                power: registered,
            });
        }
        Ok(stake)
    }
}
