//! Cairn Rewards - incentive credits for voting, proposing and staking.
//!
//! This crate provides:
//! - Append-only pending rewards with exactly-once claims
//! - Time-based staking yield distribution
//! - The treasury collaborator that pays claims out

pub mod config;
pub mod distribution;
pub mod ledger;
pub mod treasury;

pub use config::RewardConfig;
pub use distribution::{staking_reward, DistributionReport};
pub use ledger::{PendingReward, RewardLedger};
pub use treasury::{InMemoryTreasury, TransactionType, Treasury, TreasuryTransaction};
