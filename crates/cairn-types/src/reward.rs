use crate::Address;
use serde::{Deserialize, Serialize};

/// Action an incentive credit was earned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Voting,
    ProposalCreation,
    ProposalSuccess,
    Staking,
}

impl RewardKind {
    pub fn name(&self) -> &'static str {
        match self {
            RewardKind::Voting => "voting",
            RewardKind::ProposalCreation => "proposal_creation",
            RewardKind::ProposalSuccess => "proposal_success",
            RewardKind::Staking => "staking",
        }
    }
}

/// Reward-worthy action reported by the governance engine.
///
/// The reward ledger turns a trigger into a pending reward using the
/// organization's configured amount for `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTrigger {
    pub recipient: Address,
    pub kind: RewardKind,
    pub proposal_id: Option<u64>,
}

impl RewardTrigger {
    pub fn new(recipient: Address, kind: RewardKind, proposal_id: Option<u64>) -> Self {
        Self {
            recipient,
            kind,
            proposal_id,
        }
    }
}
