//! Cairn Staking - per-organization stake ledger.
//!
//! This crate provides:
//! - Stake records (per account) and the staker registry (per organization)
//! - Time-locked unstaking
//! - Ledger reconciliation (`validate_sync` / `repair_sync`)
//! - The external wallet collaborator

pub mod ledger;
pub mod registry;
pub mod sync;
pub mod wallet;

pub use ledger::{StakeEvent, StakeRecord, StakingLedger, UnstakeEvent, DEFAULT_LOCK_PERIOD_SECS};
pub use registry::StakerRegistry;
pub use sync::SyncRepair;
pub use wallet::{InMemoryWallet, Wallet};
