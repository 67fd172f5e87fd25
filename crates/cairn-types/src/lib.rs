//! Cairn Types - shared primitives for the CAIRN ledger crates.
//!
//! - Addresses (20-byte, Bech32m encoded)
//! - Organization identifiers
//! - Clock abstraction and timestamps
//! - Administrator capability check
//! - Reward triggers
//! - The shared error taxonomy

pub mod access;
pub mod address;
pub mod error;
pub mod org;
pub mod reward;
pub mod time;

pub use access::{AdminRegistry, StaticAdmins};
pub use address::Address;
pub use error::{AddressError, DaoError, DaoResult};
pub use org::OrgId;
pub use reward::{RewardKind, RewardTrigger};
pub use time::{Clock, ManualClock, SystemClock, Timestamp, SECONDS_PER_DAY, SECONDS_PER_YEAR};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Address, AdminRegistry, Clock, DaoError, DaoResult, OrgId, RewardKind, RewardTrigger,
        Timestamp,
    };
}
