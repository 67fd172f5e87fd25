//! Per-organization governance parameters.

use cairn_types::{DaoError, DaoResult, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Stake thresholds for joining and proposing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    /// Minimum stake to join and to remain an active member
    pub min_stake_to_join: u64,
    /// Minimum stake to create proposals (>= `min_stake_to_join`)
    pub min_stake_to_propose: u64,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            min_stake_to_join: 100,
            min_stake_to_propose: 500,
        }
    }
}

impl MembershipConfig {
    pub fn validate(&self) -> DaoResult<()> {
        if self.min_stake_to_propose < self.min_stake_to_join {
            return Err(DaoError::InvalidParameter(format!(
                "min_stake_to_propose {} below min_stake_to_join {}",
                self.min_stake_to_propose, self.min_stake_to_join
            )));
        }
        Ok(())
    }
}

/// Allowed voting durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub min_voting_duration_secs: u64,
    pub max_voting_duration_secs: u64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            min_voting_duration_secs: SECONDS_PER_DAY,
            max_voting_duration_secs: 30 * SECONDS_PER_DAY,
        }
    }
}

impl GovernanceConfig {
    pub fn validate(&self) -> DaoResult<()> {
        if self.min_voting_duration_secs > self.max_voting_duration_secs {
            return Err(DaoError::InvalidParameter(format!(
                "min voting duration {} exceeds max {}",
                self.min_voting_duration_secs, self.max_voting_duration_secs
            )));
        }
        Ok(())
    }

    pub fn allows_duration(&self, secs: u64) -> bool {
        (self.min_voting_duration_secs..=self.max_voting_duration_secs).contains(&secs)
    }
}
