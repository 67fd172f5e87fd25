use crate::org::OrgId;
use thiserror::Error;

/// Errors raised while parsing addresses.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AddressError {
    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    #[error("Invalid address length: expected 20, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Bech32 error: {0}")]
    Bech32(String),
}

impl From<hex::FromHexError> for AddressError {
    fn from(e: hex::FromHexError) -> Self {
        AddressError::InvalidHex(e.to_string())
    }
}

/// Errors that can occur in staking, governance and reward operations.
///
/// Every variant aborts the operation that produced it; no state is changed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DaoError {
    #[error("Insufficient balance: required {required}, have {have}")]
    InsufficientBalance { required: u64, have: u64 },

    #[error("Insufficient stake: required {required}, have {have}")]
    InsufficientStake { required: u64, have: u64 },

    #[error("Invalid unstake amount: requested {requested}, staked {staked}")]
    InvalidUnstakeAmount { requested: u64, staked: u64 },

    #[error("Stake is time-locked until {unlocks_at}")]
    TimeLockActive { unlocks_at: u64 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Not a member")]
    NotMember,

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Voting period not started")]
    VotingNotStarted,

    #[error("Voting period ended")]
    VotingEnded,

    #[error("Voting still in progress until {ends_at}")]
    VotingInProgress { ends_at: u64 },

    #[error("Execution window expired at {deadline}")]
    ExecutionWindowExpired { deadline: u64 },

    #[error("Proposal not found: {0}")]
    NoSuchProposal(u64),

    #[error("Nothing to claim")]
    NothingToClaim,

    #[error("Insufficient treasury: required {required}, have {have}")]
    InsufficientTreasury { required: u64, have: u64 },

    #[error("Caller is not an administrator")]
    NotAdmin,

    #[error("Caller is neither an administrator nor the proposer")]
    NotAdminOrProposer,

    #[error("Inconsistent voting weight: stake {stake}, voting power {power}")]
    InconsistentWeight { stake: u64, power: u64 },

    #[error("Votes exceed total stake: votes {votes}, staked {staked}")]
    PhantomVotes { votes: u64, staked: u64 },

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(u8),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown organization: {0}")]
    UnknownOrganization(OrgId),
}

/// Convenience alias used across the ledger crates.
pub type DaoResult<T> = Result<T, DaoError>;
