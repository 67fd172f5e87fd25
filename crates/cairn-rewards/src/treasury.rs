//! Treasury custody.
//!
//! The treasury holds each organization's funds. Reward claims are paid out
//! of it after the reward bookkeeping has committed.

use cairn_types::{Address, DaoError, DaoResult, OrgId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Fund custody consumed by the reward layer.
pub trait Treasury: Send + Sync {
    fn balance_of(&self, org: OrgId) -> u64;

    /// Pay `amount` to `to`. Fails with `InsufficientTreasury` when short.
    fn withdraw(&self, org: OrgId, to: &Address, amount: u64) -> DaoResult<()>;

    fn deposit(&self, org: OrgId, amount: u64) -> DaoResult<()>;
}

/// Transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

/// Treasury transaction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasuryTransaction {
    pub tx_type: TransactionType,
    pub amount: u64,
    pub recipient: Option<Address>,
    pub balance_after: u64,
}

#[derive(Debug, Default)]
struct TreasuryAccount {
    balance: u64,
    transactions: Vec<TreasuryTransaction>,
}

/// In-memory treasury keyed by organization.
#[derive(Debug, Default)]
pub struct InMemoryTreasury {
    accounts: RwLock<HashMap<OrgId, TreasuryAccount>>,
}

impl InMemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transaction history of one organization.
    pub fn transactions(&self, org: OrgId) -> Vec<TreasuryTransaction> {
        self.accounts
            .read()
            .get(&org)
            .map(|a| a.transactions.clone())
            .unwrap_or_default()
    }
}

impl Treasury for InMemoryTreasury {
    fn balance_of(&self, org: OrgId) -> u64 {
        self.accounts.read().get(&org).map(|a| a.balance).unwrap_or(0)
    }

    fn withdraw(&self, org: OrgId, to: &Address, amount: u64) -> DaoResult<()> {
        let mut accounts = self.accounts.write();
        let account = accounts.entry(org).or_default();
        if account.balance < amount {
            return Err(DaoError::InsufficientTreasury {
                required: amount,
                have: account.balance,
            });
        }
        account.balance -= amount;
        let balance_after = account.balance;
        account.transactions.push(TreasuryTransaction {
            tx_type: TransactionType::Withdrawal,
            amount,
            recipient: Some(*to),
            balance_after,
        });
        Ok(())
    }

    fn deposit(&self, org: OrgId, amount: u64) -> DaoResult<()> {
        let mut accounts = self.accounts.write();
        let account = accounts.entry(org).or_default();
        account.balance = account.balance.checked_add(amount).ok_or(DaoError::Overflow)?;
        let balance_after = account.balance;
        account.transactions.push(TreasuryTransaction {
            tx_type: TransactionType::Deposit,
            amount,
            recipient: None,
            balance_after,
        });
        Ok(())
    }
}
