//! External wallet balances.
//!
//! Staking moves funds from an account's wallet into the organization vault
//! and back. The wallet itself is an outside collaborator.

use cairn_types::{Address, DaoError, DaoResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Balance check and transfer primitive used by stake/unstake.
pub trait Wallet: Send + Sync {
    /// Spendable balance of `account`.
    fn balance_of(&self, account: &Address) -> u64;

    /// Take `amount` out of the account. Fails without side effects when short.
    fn debit(&self, account: &Address, amount: u64) -> DaoResult<()>;

    /// Return `amount` to the account.
    fn credit(&self, account: &Address, amount: u64) -> DaoResult<()>;
}

/// In-memory wallet balances.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    balances: RwLock<HashMap<Address, u64>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set account balance
    pub fn set_balance(&self, account: Address, balance: u64) {
        self.balances.write().insert(account, balance);
    }

    /// Add funds to an account.
    pub fn fund(&self, account: Address, amount: u64) -> DaoResult<u64> {
        let mut balances = self.balances.write();
        let balance = balances.entry(account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(DaoError::Overflow)?;
        Ok(*balance)
    }
}

impl Wallet for InMemoryWallet {
    fn balance_of(&self, account: &Address) -> u64 {
        self.balances.read().get(account).copied().unwrap_or(0)
    }

    fn debit(&self, account: &Address, amount: u64) -> DaoResult<()> {
        let mut balances = self.balances.write();
        let have = balances.get(account).copied().unwrap_or(0);
        if have < amount {
            return Err(DaoError::InsufficientBalance {
                required: amount,
                have,
            });
        }
        balances.insert(*account, have - amount);
        Ok(())
    }

    fn credit(&self, account: &Address, amount: u64) -> DaoResult<()> {
        let mut balances = self.balances.write();
        let have = balances.get(account).copied().unwrap_or(0);
        let updated = have.checked_add(amount).ok_or(DaoError::Overflow)?;
        balances.insert(*account, updated);
        Ok(())
    }
}
