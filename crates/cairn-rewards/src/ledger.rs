//! Pending rewards and claims.
//!
//! Entries live in one append-only vector. A per-recipient index holds the
//! positions of each account's entries in creation order. The only mutation
//! an entry ever sees is the `claimed` flip.

use crate::config::{RewardConfig, BPS_DENOMINATOR};
use cairn_types::{
    Address, AdminRegistry, DaoError, DaoResult, OrgId, RewardKind, RewardTrigger, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReward {
    pub id: u64,
    pub recipient: Address,
    pub amount: u64,
    pub kind: RewardKind,
    pub created_at: Timestamp,
    pub claimed: bool,
    pub claimed_at: Option<Timestamp>,
    pub related_proposal_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RewardLedger {
    pub(crate) org: OrgId,
    pub(crate) config: RewardConfig,
    entries: Vec<PendingReward>,
    by_recipient: HashMap<Address, Vec<usize>>,
    claimed_totals: HashMap<Address, u64>,
    total_distributed: u64,
    pub(crate) last_staking_distribution: Timestamp,
}

impl RewardLedger {
    /// `now` is the baseline for the first staking distribution.
    pub fn new(org: OrgId, config: RewardConfig, now: Timestamp) -> DaoResult<Self> {
        config.validate()?;
        Ok(Self {
            org,
            config,
            entries: Vec::new(),
            by_recipient: HashMap::new(),
            claimed_totals: HashMap::new(),
            total_distributed: 0,
            last_staking_distribution: now,
        })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn total_distributed(&self) -> u64 {
        self.total_distributed
    }

    pub fn last_staking_distribution(&self) -> Timestamp {
        self.last_staking_distribution
    }

    /// Append a reward entry. Returns its id, or `None` when rewards are
    /// disabled or the amount is zero.
    pub fn create_pending_reward(
        &mut self,
        recipient: Address,
        amount: u64,
        kind: RewardKind,
        related_proposal_id: Option<u64>,
        now: Timestamp,
    ) -> Option<u64> {
        if !self.config.enabled {
            tracing::debug!("{}: rewards disabled, no {} reward for {}", self.org, kind.name(), recipient);
            return None;
        }
        if amount == 0 {
            tracing::debug!("{}: zero {} reward for {} skipped", self.org, kind.name(), recipient);
            return None;
        }

        let id = self.entries.len() as u64 + 1;
        self.by_recipient
            .entry(recipient)
            .or_default()
            .push(self.entries.len());
        self.entries.push(PendingReward {
            id,
            recipient,
            amount,
            kind,
            created_at: now,
            claimed: false,
            claimed_at: None,
            related_proposal_id,
        });

        tracing::debug!(
            "{}: reward #{} of {} ({}) pending for {}",
            self.org,
            id,
            amount,
            kind.name(),
            recipient
        );
        Some(id)
    }

    /// Credit the configured amount for an action trigger.
    pub fn record_trigger(&mut self, trigger: &RewardTrigger, now: Timestamp) -> Option<u64> {
        let amount = self.config.amount_for(trigger.kind);
        self.create_pending_reward(trigger.recipient, amount, trigger.kind, trigger.proposal_id, now)
    }

    /// Claim every unclaimed reward of `account` at once.
    pub fn claim(&mut self, account: &Address, now: Timestamp) -> DaoResult<u64> {
        let mut amount = 0u64;
        let mut claimable = Vec::new();
        for &i in self.by_recipient.get(account).into_iter().flatten() {
            let entry = &self.entries[i];
            if !entry.claimed {
                amount = amount.checked_add(entry.amount).ok_or(DaoError::Overflow)?;
                claimable.push(i);
            }
        }
        if amount == 0 {
            return Err(DaoError::NothingToClaim);
        }

        let claimed_after = self
            .total_claimed(account)
            .checked_add(amount)
            .ok_or(DaoError::Overflow)?;
        let distributed_after = self
            .total_distributed
            .checked_add(amount)
            .ok_or(DaoError::Overflow)?;

        for i in claimable.iter().copied() {
            let entry = &mut self.entries[i];
            entry.claimed = true;
            entry.claimed_at = Some(now);
        }
        self.claimed_totals.insert(*account, claimed_after);
        self.total_distributed = distributed_after;

        tracing::info!(
            "{}: {} claimed {} across {} rewards",
            self.org,
            account,
            amount,
            claimable.len()
        );
        Ok(amount)
    }

    /// Unclaimed rewards of `account` in creation order.
    pub fn pending_rewards(&self, account: &Address) -> Vec<&PendingReward> {
        self.rewards_for(account)
            .into_iter()
            .filter(|r| !r.claimed)
            .collect()
    }

    pub fn total_claimable(&self, account: &Address) -> u64 {
        self.pending_rewards(account)
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.amount))
    }

    pub fn total_claimed(&self, account: &Address) -> u64 {
        self.claimed_totals.get(account).copied().unwrap_or(0)
    }

    /// Every reward of `account`, claimed or not.
    pub fn rewards_for(&self, account: &Address) -> Vec<&PendingReward> {
        self.by_recipient
            .get(account)
            .map(|idx| idx.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn reward(&self, id: u64) -> Option<&PendingReward> {
        id.checked_sub(1)
            .and_then(|i| self.entries.get(i as usize))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn ensure_admin(&self, admins: &dyn AdminRegistry, caller: &Address) -> DaoResult<()> {
        if admins.is_admin(self.org, caller) {
            Ok(())
        } else {
            Err(DaoError::NotAdmin)
        }
    }

    pub fn set_enabled(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        enabled: bool,
    ) -> DaoResult<()> {
        self.ensure_admin(admins, caller)?;
        self.config.enabled = enabled;
        tracing::info!("{}: rewards {}", self.org, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    pub fn set_action_rewards(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        voting: u64,
        proposal_creation: u64,
        proposal_success: u64,
    ) -> DaoResult<()> {
        self.ensure_admin(admins, caller)?;
        self.config.voting_reward = voting;
        self.config.proposal_creation_reward = proposal_creation;
        self.config.proposal_success_reward = proposal_success;
        tracing::info!(
            "{}: action rewards set to vote={} create={} success={}",
            self.org,
            voting,
            proposal_creation,
            proposal_success
        );
        Ok(())
    }

    pub fn set_staking_yield(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        yield_bps: u64,
    ) -> DaoResult<()> {
        self.ensure_admin(admins, caller)?;
        if yield_bps > BPS_DENOMINATOR {
            return Err(DaoError::InvalidParameter(format!(
                "staking yield {} bps above {}",
                yield_bps, BPS_DENOMINATOR
            )));
        }
        self.config.staking_yield_bps = yield_bps;
        tracing::info!("{}: staking yield set to {} bps", self.org, yield_bps);
        Ok(())
    }

    pub fn set_distribution_interval(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        interval_secs: u64,
    ) -> DaoResult<()> {
        self.ensure_admin(admins, caller)?;
        self.config.distribution_interval_secs = interval_secs;
        tracing::info!("{}: distribution interval set to {}s", self.org, interval_secs);
        Ok(())
    }
}
