//! Proposal records.
//!
//! Proposals go through states: Draft -> Active -> Passed/Rejected -> Executed,
//! with Draft or Active -> Cancelled.

use cairn_types::{Address, DaoError, DaoResult, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Proposal status in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Created, voting not yet opened
    Draft,
    /// Voting is open
    Active,
    /// Quorum met and yes outweighed no
    Passed,
    /// Quorum missed or majority not reached
    Rejected,
    /// Passed proposal carried out
    Executed,
    /// Withdrawn before a result
    Cancelled,
}

impl ProposalStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Executed | ProposalStatus::Rejected | ProposalStatus::Cancelled
        )
    }

    pub fn can_vote(&self) -> bool {
        matches!(self, ProposalStatus::Active)
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self, ProposalStatus::Draft | ProposalStatus::Active)
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, ProposalStatus::Passed)
    }
}

/// Vote options. Wire codes: 1 = Yes, 2 = No, 3 = Abstain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteType {
    Yes,
    No,
    /// Counts toward quorum but not toward the majority
    Abstain,
}

impl VoteType {
    pub fn code(&self) -> u8 {
        match self {
            VoteType::Yes => 1,
            VoteType::No => 2,
            VoteType::Abstain => 3,
        }
    }
}

impl TryFrom<u8> for VoteType {
    type Error = DaoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(VoteType::Yes),
            2 => Ok(VoteType::No),
            3 => Ok(VoteType::Abstain),
            other => Err(DaoError::InvalidVoteType(other)),
        }
    }
}

/// A recorded vote. Immutable once cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: Address,
    pub vote_type: VoteType,
    /// Stake snapshot at cast time
    pub weight: u64,
    pub voted_at: Timestamp,
}

/// Why a status change happened. Serialized as a stable tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    Created,
    VotingStarted,
    QuorumNotMet,
    MajorityNotReached,
    MajorityReached,
    Executed,
    Cancelled,
}

impl TransitionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionReason::Created => "created",
            TransitionReason::VotingStarted => "voting_started",
            TransitionReason::QuorumNotMet => "quorum_not_met",
            TransitionReason::MajorityNotReached => "majority_not_reached",
            TransitionReason::MajorityReached => "majority_reached",
            TransitionReason::Executed => "executed",
            TransitionReason::Cancelled => "cancelled",
        }
    }
}

/// Audit record of one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub proposal_id: u64,
    /// `None` for creation
    pub from: Option<ProposalStatus>,
    pub to: ProposalStatus,
    pub reason: TransitionReason,
    pub actor: Address,
    pub at: Timestamp,
}

/// Where a proposal stands at a given instant.
///
/// Deadlines are never applied by a timer; this is computed from the stored
/// status and the caller's `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotingPhase {
    /// Draft, voting not opened
    NotOpen,
    /// Active and inside the voting window
    Open,
    /// Active but the window is over; waiting for finalize
    AwaitingFinalization,
    /// Passed, still inside the execution window
    ExecutionOpen,
    /// Passed, execution window elapsed
    ExecutionExpired,
    /// Terminal status
    Closed,
}

/// Governance proposal.
#[derive(Debug, Clone, Serialize)]
pub struct Proposal {
    /// Unique proposal ID (per organization)
    pub id: u64,
    pub proposer: Address,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    /// Votes in cast order
    pub votes: Vec<Vote>,
    pub yes_weight: u64,
    pub no_weight: u64,
    pub abstain_weight: u64,
    pub created_at: Timestamp,
    pub voting_start: Timestamp,
    pub voting_end: Timestamp,
    /// Seconds after `voting_end` during which a passed proposal may execute
    pub execution_window: u64,
    pub min_quorum_percent: u64,
    pub executed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    /// Voter -> position in `votes`
    #[serde(skip)]
    voter_index: HashMap<Address, usize>,
}

impl Proposal {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: u64,
        proposer: Address,
        title: String,
        description: String,
        created_at: Timestamp,
        voting_end: Timestamp,
        execution_window: u64,
        min_quorum_percent: u64,
    ) -> Self {
        Self {
            id,
            proposer,
            title,
            description,
            status: ProposalStatus::Draft,
            votes: Vec::new(),
            yes_weight: 0,
            no_weight: 0,
            abstain_weight: 0,
            created_at,
            voting_start: created_at,
            voting_end,
            execution_window,
            min_quorum_percent,
            executed_at: None,
            cancelled_at: None,
            voter_index: HashMap::new(),
        }
    }

    /// Check if voter has voted.
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voter_index.contains_key(voter)
    }

    pub fn vote_of(&self, voter: &Address) -> Option<&Vote> {
        self.voter_index.get(voter).map(|&i| &self.votes[i])
    }

    /// yes + no + abstain
    pub fn total_votes(&self) -> DaoResult<u64> {
        self.yes_weight
            .checked_add(self.no_weight)
            .and_then(|v| v.checked_add(self.abstain_weight))
            .ok_or(DaoError::Overflow)
    }

    /// Last instant a passed proposal may execute.
    pub fn execution_deadline(&self) -> Timestamp {
        self.voting_end.saturating_add(self.execution_window)
    }

    /// Phase of this proposal at `now`.
    pub fn phase(&self, now: Timestamp) -> VotingPhase {
        match self.status {
            ProposalStatus::Draft => VotingPhase::NotOpen,
            ProposalStatus::Active if now < self.voting_start => VotingPhase::NotOpen,
            ProposalStatus::Active if now <= self.voting_end => VotingPhase::Open,
            ProposalStatus::Active => VotingPhase::AwaitingFinalization,
            ProposalStatus::Passed if now <= self.execution_deadline() => {
                VotingPhase::ExecutionOpen
            }
            ProposalStatus::Passed => VotingPhase::ExecutionExpired,
            ProposalStatus::Rejected | ProposalStatus::Executed | ProposalStatus::Cancelled => {
                VotingPhase::Closed
            }
        }
    }

    /// Append a vote and add its weight to the matching tally.
    pub(crate) fn record_vote(&mut self, vote: Vote) -> DaoResult<()> {
        if self.has_voted(&vote.voter) {
            return Err(DaoError::AlreadyVoted);
        }
        let tally = match vote.vote_type {
            VoteType::Yes => &mut self.yes_weight,
            VoteType::No => &mut self.no_weight,
            VoteType::Abstain => &mut self.abstain_weight,
        };
        *tally = tally.checked_add(vote.weight).ok_or(DaoError::Overflow)?;
        self.voter_index.insert(vote.voter, self.votes.len());
        self.votes.push(vote);
        Ok(())
    }
}
