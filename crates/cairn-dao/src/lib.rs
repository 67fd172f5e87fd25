//! Cairn DAO - multi-organization staking, governance and rewards.
//!
//! [`Dao`] is the public surface. It keeps every organization behind its own
//! lock, reads the clock once per operation and settles reward claims
//! against the treasury.

pub mod config;
pub mod dao;
pub mod organization;
pub mod telemetry;

pub use config::{DaoConfig, LoggingConfig, StakingConfig};
pub use dao::Dao;
pub use organization::Organization;

pub use cairn_governance::{
    Finalization, GovernanceConfig, MembershipConfig, NewProposal, Proposal, ProposalStatus,
    StatusChange, TransitionReason, VoteType, VotingPhase,
};
pub use cairn_rewards::{
    DistributionReport, InMemoryTreasury, PendingReward, RewardConfig, Treasury,
};
pub use cairn_staking::{InMemoryWallet, StakeEvent, SyncRepair, UnstakeEvent, Wallet};
pub use cairn_types::{
    Address, AdminRegistry, Clock, DaoError, DaoResult, ManualClock, OrgId, RewardKind,
    StaticAdmins, SystemClock, Timestamp,
};
