//! Membership derived from stake.
//!
//! A membership record alone does not make an account an active member: the
//! account's current stake is re-checked against the joining threshold on
//! every call. Members who unstake below it keep their record until pruned.

use crate::config::MembershipConfig;
use cairn_staking::StakingLedger;
use cairn_types::{Address, AdminRegistry, DaoError, DaoResult, OrgId, Timestamp};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MembershipGate {
    org: OrgId,
    config: MembershipConfig,
    /// Member -> joined at
    members: BTreeMap<Address, Timestamp>,
}

impl MembershipGate {
    pub fn new(org: OrgId, config: MembershipConfig) -> DaoResult<Self> {
        config.validate()?;
        Ok(Self {
            org,
            config,
            members: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &MembershipConfig {
        &self.config
    }

    /// Replace the thresholds. Admin-only.
    pub fn set_config(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        config: MembershipConfig,
    ) -> DaoResult<()> {
        if !admins.is_admin(self.org, caller) {
            return Err(DaoError::NotAdmin);
        }
        config.validate()?;
        self.config = config;
        tracing::info!(
            "{}: membership thresholds set to join={} propose={}",
            self.org,
            config.min_stake_to_join,
            config.min_stake_to_propose
        );
        Ok(())
    }

    /// Create a membership record for `account`.
    pub fn join(
        &mut self,
        ledger: &StakingLedger,
        account: Address,
        now: Timestamp,
    ) -> DaoResult<()> {
        if self.members.contains_key(&account) {
            return Err(DaoError::InvalidParameter(format!(
                "{} is already a member",
                account
            )));
        }
        let have = ledger.staker_amount(&account);
        if have < self.config.min_stake_to_join {
            return Err(DaoError::InsufficientStake {
                required: self.config.min_stake_to_join,
                have,
            });
        }
        self.members.insert(account, now);
        tracing::info!("{}: {} joined with stake {}", self.org, account, have);
        Ok(())
    }

    /// Remove the caller's own membership record.
    pub fn leave(&mut self, account: &Address) -> DaoResult<()> {
        self.members.remove(account).ok_or(DaoError::NotMember)?;
        tracing::info!("{}: {} left", self.org, account);
        Ok(())
    }

    /// Drop every member whose stake fell below the joining threshold.
    pub fn prune(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        ledger: &StakingLedger,
    ) -> DaoResult<Vec<Address>> {
        if !admins.is_admin(self.org, caller) {
            return Err(DaoError::NotAdmin);
        }
        let min = self.config.min_stake_to_join;
        let lapsed: Vec<Address> = self
            .members
            .keys()
            .filter(|a| ledger.staker_amount(a) < min)
            .copied()
            .collect();
        for account in &lapsed {
            self.members.remove(account);
        }
        if !lapsed.is_empty() {
            tracing::info!("{}: pruned {} lapsed members", self.org, lapsed.len());
        }
        Ok(lapsed)
    }

    pub fn has_record(&self, account: &Address) -> bool {
        self.members.contains_key(account)
    }

    pub fn joined_at(&self, account: &Address) -> Option<Timestamp> {
        self.members.get(account).copied()
    }

    /// Membership list, including lapsed members not yet pruned.
    pub fn members(&self) -> Vec<Address> {
        self.members.keys().copied().collect()
    }

    /// Record present and current stake at or above the joining threshold.
    pub fn is_member(&self, ledger: &StakingLedger, account: &Address) -> bool {
        self.has_record(account) && ledger.staker_amount(account) >= self.config.min_stake_to_join
    }

    /// Active member with stake at or above the proposing threshold.
    pub fn can_propose(&self, ledger: &StakingLedger, account: &Address) -> bool {
        self.is_member(ledger, account)
            && ledger.staker_amount(account) >= self.config.min_stake_to_propose
    }

    /// Current registry stake; admins holding nothing get the proposing
    /// threshold as a floor.
    pub fn voting_power(
        &self,
        ledger: &StakingLedger,
        admins: &dyn AdminRegistry,
        account: &Address,
    ) -> u64 {
        let stake = ledger.staker_amount(account);
        if stake == 0 && admins.is_admin(self.org, account) {
            return self.config.min_stake_to_propose;
        }
        stake
    }
}
