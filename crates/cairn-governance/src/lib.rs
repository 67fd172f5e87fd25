//! Cairn Governance - stake-gated membership and proposal lifecycle.
//!
//! This crate provides:
//! - Membership derived from current stake
//! - Proposal lifecycle management with an auditable status history
//! - Stake-weighted voting with quorum and simple-majority resolution

pub mod config;
pub mod engine;
pub mod membership;
pub mod proposal;

pub use config::{GovernanceConfig, MembershipConfig};
pub use engine::{Finalization, GovernanceContext, NewProposal, ProposalEngine};
pub use membership::MembershipGate;
pub use proposal::{
    Proposal, ProposalStatus, StatusChange, TransitionReason, Vote, VoteType, VotingPhase,
};
