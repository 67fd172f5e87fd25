//! Organization-wide staker registry.
//!
//! Mirrors every nonzero stake record. Entries are removed when their
//! amount reaches zero and `total_stakers` always equals the entry count.

use cairn_types::Address;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StakerRegistry {
    pub(crate) entries: HashMap<Address, u64>,
    pub(crate) total_stakers: usize,
}

/// What a registry write did to the entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryChange {
    Inserted,
    Updated,
    Removed,
    Unchanged,
}

impl StakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered amount for `account`, 0 if absent.
    pub fn amount(&self, account: &Address) -> u64 {
        self.entries.get(account).copied().unwrap_or(0)
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.entries.contains_key(account)
    }

    pub fn total_stakers(&self) -> usize {
        self.total_stakers
    }

    /// Registered stakers sorted by address.
    pub fn entries(&self) -> Vec<(Address, u64)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(a, v)| (*a, *v)).collect();
        entries.sort_by_key(|(a, _)| *a);
        entries
    }

    pub(crate) fn accounts(&self) -> impl Iterator<Item = &Address> {
        self.entries.keys()
    }

    /// Write the mirrored amount; zero removes the entry.
    pub(crate) fn set(&mut self, account: Address, amount: u64) -> EntryChange {
        if amount == 0 {
            return match self.entries.remove(&account) {
                Some(_) => {
                    self.total_stakers = self.total_stakers.saturating_sub(1);
                    EntryChange::Removed
                }
                None => EntryChange::Unchanged,
            };
        }

        match self.entries.insert(account, amount) {
            Some(_) => EntryChange::Updated,
            None => {
                self.total_stakers += 1;
                EntryChange::Inserted
            }
        }
    }

    /// Reset the staker counter to the entry count.
    pub(crate) fn recount(&mut self) -> usize {
        self.total_stakers = self.entries.len();
        self.total_stakers
    }
}
