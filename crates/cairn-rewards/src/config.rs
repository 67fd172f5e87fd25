//! Reward amounts and staking yield.

use cairn_types::{DaoError, DaoResult, RewardKind, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Basis-point denominator (10_000 = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Credit per vote cast
    pub voting_reward: u64,
    /// Credit per proposal created
    pub proposal_creation_reward: u64,
    /// Credit to the proposer when a proposal passes
    pub proposal_success_reward: u64,
    /// Annual staking yield (basis points)
    pub staking_yield_bps: u64,
    /// Minimum seconds between staking distributions
    pub distribution_interval_secs: u64,
    pub enabled: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            voting_reward: 10,
            proposal_creation_reward: 50,
            proposal_success_reward: 100,
            staking_yield_bps: 500, // 5% annual
            distribution_interval_secs: SECONDS_PER_DAY,
            enabled: true,
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> DaoResult<()> {
        if self.staking_yield_bps > BPS_DENOMINATOR {
            return Err(DaoError::InvalidParameter(format!(
                "staking yield {} bps above {}",
                self.staking_yield_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }

    /// Configured amount for an action trigger. Staking rewards are computed
    /// by distribution, not configured per action.
    pub fn amount_for(&self, kind: RewardKind) -> u64 {
        match kind {
            RewardKind::Voting => self.voting_reward,
            RewardKind::ProposalCreation => self.proposal_creation_reward,
            RewardKind::ProposalSuccess => self.proposal_success_reward,
            RewardKind::Staking => 0,
        }
    }
}
