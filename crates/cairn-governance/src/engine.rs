//! Proposal state machine for one organization.
//!
//! Every transition checks all preconditions before touching the proposal,
//! appends a [`StatusChange`] to the audit history and returns any reward
//! trigger the caller should hand to the reward ledger.

use crate::config::GovernanceConfig;
use crate::membership::MembershipGate;
use crate::proposal::{Proposal, ProposalStatus, StatusChange, TransitionReason, Vote, VoteType};
use cairn_staking::StakingLedger;
use cairn_types::{
    Address, AdminRegistry, DaoError, DaoResult, OrgId, RewardKind, RewardTrigger, Timestamp,
};
use std::collections::BTreeMap;

/// Read-only view of the state a governance operation depends on.
///
/// `now` is read once per operation by the caller.
pub struct GovernanceContext<'a> {
    pub ledger: &'a StakingLedger,
    pub membership: &'a MembershipGate,
    pub admins: &'a dyn AdminRegistry,
    pub now: Timestamp,
}

impl GovernanceContext<'_> {
    fn is_admin(&self, org: OrgId, account: &Address) -> bool {
        self.admins.is_admin(org, account)
    }
}

/// Arguments of a new proposal.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub voting_duration: u64,
    pub execution_window: u64,
    pub min_quorum_percent: u64,
}

/// Result of finalizing a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalization {
    pub status: ProposalStatus,
    /// Participation as a percentage of total stake
    pub quorum_percent: u64,
    pub reward: Option<RewardTrigger>,
}

#[derive(Debug, Clone)]
pub struct ProposalEngine {
    org: OrgId,
    config: GovernanceConfig,
    proposals: BTreeMap<u64, Proposal>,
    next_id: u64,
    history: Vec<StatusChange>,
}

impl ProposalEngine {
    pub fn new(org: OrgId, config: GovernanceConfig) -> DaoResult<Self> {
        config.validate()?;
        Ok(Self {
            org,
            config,
            proposals: BTreeMap::new(),
            next_id: 1,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Replace the voting duration bounds. Admin-only.
    pub fn set_config(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        config: GovernanceConfig,
    ) -> DaoResult<()> {
        if !admins.is_admin(self.org, caller) {
            return Err(DaoError::NotAdmin);
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Create a proposal in Draft.
    ///
    /// # Errors
    /// - `NotMember` / `InsufficientStake` if a non-admin caller may not propose
    /// - `InvalidStatus` if the voting duration is outside the configured bounds
    /// - `InvalidParameter` for an empty title or a quorum above 100
    pub fn create(
        &mut self,
        ctx: &GovernanceContext<'_>,
        caller: Address,
        args: NewProposal,
    ) -> DaoResult<(u64, RewardTrigger)> {
        if !ctx.is_admin(self.org, &caller) {
            if !ctx.membership.is_member(ctx.ledger, &caller) {
                return Err(DaoError::NotMember);
            }
            if !ctx.membership.can_propose(ctx.ledger, &caller) {
                return Err(DaoError::InsufficientStake {
                    required: ctx.membership.config().min_stake_to_propose,
                    have: ctx.ledger.staker_amount(&caller),
                });
            }
        }

        if !self.config.allows_duration(args.voting_duration) {
            return Err(DaoError::InvalidStatus(format!(
                "voting duration {}s outside [{}s, {}s]",
                args.voting_duration,
                self.config.min_voting_duration_secs,
                self.config.max_voting_duration_secs
            )));
        }
        if args.title.trim().is_empty() {
            return Err(DaoError::InvalidParameter("title must not be empty".to_string()));
        }
        if args.min_quorum_percent > 100 {
            return Err(DaoError::InvalidParameter(format!(
                "quorum {}% above 100%",
                args.min_quorum_percent
            )));
        }

        let voting_end = ctx
            .now
            .checked_add(args.voting_duration)
            .ok_or(DaoError::Overflow)?;
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(DaoError::Overflow)?;

        let proposal = Proposal::new(
            id,
            caller,
            args.title,
            args.description,
            ctx.now,
            voting_end,
            args.execution_window,
            args.min_quorum_percent,
        );
        self.proposals.insert(id, proposal);
        self.next_id = next_id;

        self.record(id, None, ProposalStatus::Draft, TransitionReason::Created, caller, ctx.now);

        Ok((
            id,
            RewardTrigger::new(caller, RewardKind::ProposalCreation, Some(id)),
        ))
    }

    /// Draft -> Active. Proposer or admin.
    pub fn start_voting(
        &mut self,
        ctx: &GovernanceContext<'_>,
        caller: Address,
        id: u64,
    ) -> DaoResult<()> {
        let is_admin = ctx.is_admin(self.org, &caller);
        let proposal = self.proposal_mut(id)?;

        if proposal.status != ProposalStatus::Draft {
            return Err(DaoError::InvalidStatus(format!(
                "cannot start voting from {:?}",
                proposal.status
            )));
        }
        if caller != proposal.proposer && !is_admin {
            return Err(DaoError::NotAdminOrProposer);
        }

        proposal.status = ProposalStatus::Active;
        proposal.voting_start = ctx.now;

        self.record(
            id,
            Some(ProposalStatus::Draft),
            ProposalStatus::Active,
            TransitionReason::VotingStarted,
            caller,
            ctx.now,
        );
        Ok(())
    }

    /// Cast a stake-weighted vote.
    ///
    /// The weight is read from the ledger now and cross-checked against the
    /// membership gate's voting power.
    pub fn cast_vote(
        &mut self,
        ctx: &GovernanceContext<'_>,
        caller: Address,
        id: u64,
        vote_type: VoteType,
    ) -> DaoResult<RewardTrigger> {
        let org = self.org;
        let proposal = self.proposal_mut(id)?;

        match proposal.status {
            ProposalStatus::Active => {}
            ProposalStatus::Draft => return Err(DaoError::VotingNotStarted),
            other => {
                return Err(DaoError::InvalidStatus(format!("cannot vote on {:?}", other)))
            }
        }
        if ctx.now < proposal.voting_start {
            return Err(DaoError::VotingNotStarted);
        }
        if ctx.now > proposal.voting_end {
            return Err(DaoError::VotingEnded);
        }
        if !ctx.membership.is_member(ctx.ledger, &caller) {
            return Err(DaoError::NotMember);
        }
        if proposal.has_voted(&caller) {
            return Err(DaoError::AlreadyVoted);
        }

        let weight = ctx.ledger.voting_weight(&caller)?;
        if weight == 0 {
            return Err(DaoError::InsufficientStake {
                required: 1,
                have: 0,
            });
        }
        let power = ctx.membership.voting_power(ctx.ledger, ctx.admins, &caller);
        if power != weight {
            return Err(DaoError::InconsistentWeight {
                stake: weight,
                power,
            });
        }

        proposal.record_vote(Vote {
            voter: caller,
            vote_type,
            weight,
            voted_at: ctx.now,
        })?;

        tracing::info!(
            "{}: {} voted {:?} on proposal {} with weight {}",
            org,
            caller,
            vote_type,
            id,
            weight
        );

        Ok(RewardTrigger::new(caller, RewardKind::Voting, Some(id)))
    }

    /// Close voting and resolve quorum and majority.
    ///
    /// Anyone may finalize once the voting window has ended.
    pub fn finalize(
        &mut self,
        ctx: &GovernanceContext<'_>,
        caller: Address,
        id: u64,
    ) -> DaoResult<Finalization> {
        let total_staked = ctx.ledger.total_staked();
        let proposal = self.proposal_mut(id)?;

        if proposal.status != ProposalStatus::Active {
            return Err(DaoError::InvalidStatus(format!(
                "cannot finalize from {:?}",
                proposal.status
            )));
        }
        if ctx.now < proposal.voting_end {
            return Err(DaoError::VotingInProgress {
                ends_at: proposal.voting_end,
            });
        }

        let total_votes = proposal.total_votes()?;
        if total_votes > total_staked {
            return Err(DaoError::PhantomVotes {
                votes: total_votes,
                staked: total_staked,
            });
        }

        let quorum_percent = if total_staked == 0 {
            0
        } else {
            // total_votes <= total_staked, so this fits in u64
            (u128::from(total_votes) * 100 / u128::from(total_staked)) as u64
        };

        let (status, reason) = if quorum_percent < proposal.min_quorum_percent {
            (ProposalStatus::Rejected, TransitionReason::QuorumNotMet)
        } else if proposal.yes_weight > proposal.no_weight {
            (ProposalStatus::Passed, TransitionReason::MajorityReached)
        } else {
            (ProposalStatus::Rejected, TransitionReason::MajorityNotReached)
        };

        proposal.status = status;
        let proposer = proposal.proposer;

        self.record(id, Some(ProposalStatus::Active), status, reason, caller, ctx.now);

        let reward = (status == ProposalStatus::Passed)
            .then(|| RewardTrigger::new(proposer, RewardKind::ProposalSuccess, Some(id)));

        Ok(Finalization {
            status,
            quorum_percent,
            reward,
        })
    }

    /// Passed -> Executed, within the execution window. Proposer or admin.
    pub fn execute(
        &mut self,
        ctx: &GovernanceContext<'_>,
        caller: Address,
        id: u64,
    ) -> DaoResult<()> {
        let is_admin = ctx.is_admin(self.org, &caller);
        let proposal = self.proposal_mut(id)?;

        if !proposal.status.is_executable() {
            return Err(DaoError::InvalidStatus(format!(
                "cannot execute from {:?}",
                proposal.status
            )));
        }
        if caller != proposal.proposer && !is_admin {
            return Err(DaoError::NotAdminOrProposer);
        }
        let deadline = proposal.execution_deadline();
        if ctx.now > deadline {
            return Err(DaoError::ExecutionWindowExpired { deadline });
        }

        proposal.status = ProposalStatus::Executed;
        proposal.executed_at = Some(ctx.now);

        self.record(
            id,
            Some(ProposalStatus::Passed),
            ProposalStatus::Executed,
            TransitionReason::Executed,
            caller,
            ctx.now,
        );
        Ok(())
    }

    /// Draft/Active -> Cancelled. Proposer or admin.
    pub fn cancel(
        &mut self,
        ctx: &GovernanceContext<'_>,
        caller: Address,
        id: u64,
    ) -> DaoResult<()> {
        let is_admin = ctx.is_admin(self.org, &caller);
        let proposal = self.proposal_mut(id)?;

        if !proposal.status.can_cancel() {
            return Err(DaoError::InvalidStatus(format!(
                "cannot cancel from {:?}",
                proposal.status
            )));
        }
        if caller != proposal.proposer && !is_admin {
            return Err(DaoError::NotAdminOrProposer);
        }

        let from = proposal.status;
        proposal.status = ProposalStatus::Cancelled;
        proposal.cancelled_at = Some(ctx.now);

        self.record(
            id,
            Some(from),
            ProposalStatus::Cancelled,
            TransitionReason::Cancelled,
            caller,
            ctx.now,
        );
        Ok(())
    }

    /// Get a proposal.
    pub fn proposal(&self, id: u64) -> DaoResult<&Proposal> {
        self.proposals.get(&id).ok_or(DaoError::NoSuchProposal(id))
    }

    fn proposal_mut(&mut self, id: u64) -> DaoResult<&mut Proposal> {
        self.proposals
            .get_mut(&id)
            .ok_or(DaoError::NoSuchProposal(id))
    }

    /// All proposals in id order.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    /// Get proposals by status.
    pub fn proposals_by_status(&self, status: ProposalStatus) -> Vec<&Proposal> {
        self.proposals
            .values()
            .filter(|p| p.status == status)
            .collect()
    }

    /// Full audit trail in the order transitions happened.
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    pub fn history_for(&self, id: u64) -> Vec<&StatusChange> {
        self.history
            .iter()
            .filter(|c| c.proposal_id == id)
            .collect()
    }

    fn record(
        &mut self,
        proposal_id: u64,
        from: Option<ProposalStatus>,
        to: ProposalStatus,
        reason: TransitionReason,
        actor: Address,
        at: Timestamp,
    ) {
        tracing::info!(
            target: "cairn::proposal",
            org = %self.org,
            proposal_id,
            from = ?from,
            to = ?to,
            reason = reason.as_str(),
            "proposal status changed"
        );
        self.history.push(StatusChange {
            proposal_id,
            from,
            to,
            reason,
            actor,
            at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MembershipConfig;
    use cairn_staking::InMemoryWallet;
    use cairn_types::{StaticAdmins, SECONDS_PER_DAY};

    const DAY: u64 = SECONDS_PER_DAY;
    const T0: Timestamp = 1_700_000_000;
    const ORG: OrgId = OrgId::new(1);

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    const ALICE: u8 = 1;
    const BOB: u8 = 2;
    const CAROL: u8 = 3;
    const ADMIN: u8 = 9;

    struct Fixture {
        engine: ProposalEngine,
        ledger: StakingLedger,
        gate: MembershipGate,
        admins: StaticAdmins,
    }

    impl Fixture {
        /// Alice stakes 500, Bob 300, Carol 150; all join.
        fn new() -> Self {
            let wallet = InMemoryWallet::new();
            let mut ledger = StakingLedger::new(ORG);
            let mut gate = MembershipGate::new(ORG, MembershipConfig::default()).unwrap();
            for (n, amount) in [(ALICE, 500), (BOB, 300), (CAROL, 150)] {
                wallet.set_balance(addr(n), 10_000);
                ledger.stake(&wallet, addr(n), amount, T0).unwrap();
                gate.join(&ledger, addr(n), T0).unwrap();
            }
            let admins = StaticAdmins::new();
            admins.grant(ORG, addr(ADMIN));
            Self {
                engine: ProposalEngine::new(ORG, GovernanceConfig::default()).unwrap(),
                ledger,
                gate,
                admins,
            }
        }

        fn create(&mut self, caller: u8, quorum: u64) -> DaoResult<u64> {
            let ctx = GovernanceContext {
                ledger: &self.ledger,
                membership: &self.gate,
                admins: &self.admins,
                now: T0,
            };
            self.engine
                .create(&ctx, addr(caller), args(3 * DAY, quorum))
                .map(|(id, _)| id)
        }

        fn active(&mut self, quorum: u64) -> u64 {
            let id = self.create(ALICE, quorum).unwrap();
            let ctx = GovernanceContext {
                ledger: &self.ledger,
                membership: &self.gate,
                admins: &self.admins,
                now: T0,
            };
            self.engine.start_voting(&ctx, addr(ALICE), id).unwrap();
            id
        }
    }

    fn args(voting_duration: u64, quorum: u64) -> NewProposal {
        NewProposal {
            title: "Fund the lighthouse".to_string(),
            description: "Move 1000 units to maintenance".to_string(),
            voting_duration,
            execution_window: 2 * DAY,
            min_quorum_percent: quorum,
        }
    }

    macro_rules! with_ctx {
        ($fx:ident, $now:expr, |$engine:ident, $ctx:ident| $body:expr) => {{
            let $ctx = GovernanceContext {
                ledger: &$fx.ledger,
                membership: &$fx.gate,
                admins: &$fx.admins,
                now: $now,
            };
            let $engine = &mut $fx.engine;
            $body
        }};
    }

    #[test]
    fn test_create_assigns_monotonic_ids() {
        let mut fx = Fixture::new();
        assert_eq!(fx.create(ALICE, 10), Ok(1));
        assert_eq!(fx.create(ADMIN, 10), Ok(2));
        let p = fx.engine.proposal(1).unwrap();
        assert_eq!(p.status, ProposalStatus::Draft);
        assert_eq!(p.voting_end, T0 + 3 * DAY);
        assert_eq!(p.proposer, addr(ALICE));
    }

    #[test]
    fn test_create_returns_creation_reward() {
        let mut fx = Fixture::new();
        let (id, trigger) = with_ctx!(fx, T0, |engine, ctx| engine.create(
            &ctx,
            addr(ALICE),
            args(DAY, 10)
        ))
        .unwrap();
        assert_eq!(
            trigger,
            RewardTrigger::new(addr(ALICE), RewardKind::ProposalCreation, Some(id))
        );
    }

    #[test]
    fn test_create_requires_membership() {
        let mut fx = Fixture::new();
        assert_eq!(fx.create(7, 10), Err(DaoError::NotMember));
        // Carol is a member below the proposing threshold
        assert_eq!(
            fx.create(CAROL, 10),
            Err(DaoError::InsufficientStake { required: 500, have: 150 })
        );
        assert!(fx.engine.history().is_empty());
    }

    #[test]
    fn test_create_rejects_short_duration() {
        let mut fx = Fixture::new();
        let result = with_ctx!(fx, T0, |engine, ctx| engine.create(
            &ctx,
            addr(ALICE),
            args(DAY - 1, 10)
        ));
        assert!(matches!(result, Err(DaoError::InvalidStatus(_))));

        let result = with_ctx!(fx, T0, |engine, ctx| engine.create(
            &ctx,
            addr(ALICE),
            args(31 * DAY, 10)
        ));
        assert!(matches!(result, Err(DaoError::InvalidStatus(_))));
    }

    #[test]
    fn test_create_rejects_quorum_above_100() {
        let mut fx = Fixture::new();
        assert!(matches!(fx.create(ALICE, 101), Err(DaoError::InvalidParameter(_))));
    }

    #[test]
    fn test_start_voting_permissions() {
        let mut fx = Fixture::new();
        let id = fx.create(ALICE, 10).unwrap();

        let r = with_ctx!(fx, T0 + 5, |engine, ctx| engine.start_voting(&ctx, addr(BOB), id));
        assert_eq!(r, Err(DaoError::NotAdminOrProposer));

        with_ctx!(fx, T0 + 5, |engine, ctx| engine.start_voting(&ctx, addr(ADMIN), id)).unwrap();
        let p = fx.engine.proposal(id).unwrap();
        assert_eq!(p.status, ProposalStatus::Active);
        assert_eq!(p.voting_start, T0 + 5);

        let r = with_ctx!(fx, T0 + 6, |engine, ctx| engine.start_voting(&ctx, addr(ALICE), id));
        assert!(matches!(r, Err(DaoError::InvalidStatus(_))));
    }

    #[test]
    fn test_vote_on_draft_not_started() {
        let mut fx = Fixture::new();
        let id = fx.create(ALICE, 10).unwrap();
        let r = with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::Yes));
        assert_eq!(r, Err(DaoError::VotingNotStarted));
    }

    #[test]
    fn test_weighted_vote_and_pass() {
        let mut fx = Fixture::new();
        let id = fx.active(50);

        let trigger = with_ctx!(fx, T0 + DAY, |engine, ctx| engine.cast_vote(
            &ctx,
            addr(ALICE),
            id,
            VoteType::Yes
        ))
        .unwrap();
        assert_eq!(trigger.kind, RewardKind::Voting);
        with_ctx!(fx, T0 + DAY, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::No))
            .unwrap();

        let p = fx.engine.proposal(id).unwrap();
        assert_eq!(p.yes_weight, 500);
        assert_eq!(p.no_weight, 300);

        let fin = with_ctx!(fx, T0 + 3 * DAY, |engine, ctx| engine.finalize(&ctx, addr(CAROL), id))
            .unwrap();
        assert_eq!(fin.status, ProposalStatus::Passed);
        assert_eq!(fin.quorum_percent, 84); // 800 * 100 / 950
        assert_eq!(
            fin.reward,
            Some(RewardTrigger::new(addr(ALICE), RewardKind::ProposalSuccess, Some(id)))
        );
    }

    #[test]
    fn test_double_vote_rejected() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::Yes))
            .unwrap();
        let r = with_ctx!(fx, T0 + 2, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::No));
        assert_eq!(r, Err(DaoError::AlreadyVoted));
        assert_eq!(fx.engine.proposal(id).unwrap().votes.len(), 1);
    }

    #[test]
    fn test_vote_after_window() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        let r = with_ctx!(fx, T0 + 3 * DAY + 1, |engine, ctx| engine.cast_vote(
            &ctx,
            addr(BOB),
            id,
            VoteType::Yes
        ));
        assert_eq!(r, Err(DaoError::VotingEnded));
    }

    #[test]
    fn test_non_member_cannot_vote() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        let r = with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(7), id, VoteType::Yes));
        assert_eq!(r, Err(DaoError::NotMember));

        // Admin floor power does not let a zero-stake admin vote
        let r = with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(
            &ctx,
            addr(ADMIN),
            id,
            VoteType::Yes
        ));
        assert_eq!(r, Err(DaoError::NotMember));
    }

    #[test]
    fn test_quorum_not_met() {
        let mut fx = Fixture::new();
        let id = fx.active(50);
        with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::Yes))
            .unwrap();

        let fin = with_ctx!(fx, T0 + 3 * DAY, |engine, ctx| engine.finalize(&ctx, addr(BOB), id))
            .unwrap();
        assert_eq!(fin.status, ProposalStatus::Rejected);
        assert_eq!(fin.quorum_percent, 31);
        assert_eq!(fin.reward, None);
        let last = fx.engine.history().last().unwrap();
        assert_eq!(last.reason, TransitionReason::QuorumNotMet);
    }

    #[test]
    fn test_tie_is_rejected() {
        let mut fx = Fixture::new();
        let id = fx.active(0);
        let fin = with_ctx!(fx, T0 + 3 * DAY, |engine, ctx| engine.finalize(&ctx, addr(BOB), id))
            .unwrap();
        assert_eq!(fin.status, ProposalStatus::Rejected);
        assert_eq!(
            fx.engine.history().last().unwrap().reason,
            TransitionReason::MajorityNotReached
        );
    }

    #[test]
    fn test_finalize_before_end() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        let r = with_ctx!(fx, T0 + 3 * DAY - 1, |engine, ctx| engine.finalize(&ctx, addr(BOB), id));
        assert_eq!(r, Err(DaoError::VotingInProgress { ends_at: T0 + 3 * DAY }));
    }

    #[test]
    fn test_phantom_votes_rejected() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(ALICE), id, VoteType::Yes))
            .unwrap();

        // Alice leaves the vault after voting; total stake drops below the tally
        let wallet = InMemoryWallet::new();
        fx.ledger.unstake(&wallet, addr(ALICE), 500, T0 + 8 * DAY).unwrap();

        let r = with_ctx!(fx, T0 + 8 * DAY, |engine, ctx| engine.finalize(&ctx, addr(BOB), id));
        assert_eq!(r, Err(DaoError::PhantomVotes { votes: 500, staked: 450 }));
        assert_eq!(fx.engine.proposal(id).unwrap().status, ProposalStatus::Active);
    }

    #[test]
    fn test_vote_rejected_on_drifted_ledger() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        fx.ledger.force_registry_amount(addr(BOB), 250);

        let r = with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::Yes));
        assert_eq!(r, Err(DaoError::InconsistentWeight { stake: 300, power: 250 }));

        let p = fx.engine.proposal(id).unwrap();
        assert_eq!(p.yes_weight, 0);
        assert!(p.votes.is_empty());
        assert!(!p.has_voted(&addr(BOB)));

        // Once reconciled the same vote goes through
        fx.ledger.force_registry_amount(addr(BOB), 300);
        with_ctx!(fx, T0 + 2, |engine, ctx| engine.cast_vote(&ctx, addr(BOB), id, VoteType::Yes))
            .unwrap();
        assert_eq!(fx.engine.proposal(id).unwrap().yes_weight, 300);
    }

    #[test]
    fn test_execute_window() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(ALICE), id, VoteType::Yes))
            .unwrap();
        with_ctx!(fx, T0 + 3 * DAY, |engine, ctx| engine.finalize(&ctx, addr(BOB), id)).unwrap();

        let r = with_ctx!(fx, T0 + 3 * DAY + 1, |engine, ctx| engine.execute(&ctx, addr(BOB), id));
        assert_eq!(r, Err(DaoError::NotAdminOrProposer));

        let late = T0 + 5 * DAY + 1;
        let r = with_ctx!(fx, late, |engine, ctx| engine.execute(&ctx, addr(ALICE), id));
        assert_eq!(r, Err(DaoError::ExecutionWindowExpired { deadline: T0 + 5 * DAY }));
        assert_eq!(fx.engine.proposal(id).unwrap().status, ProposalStatus::Passed);

        with_ctx!(fx, T0 + 5 * DAY, |engine, ctx| engine.execute(&ctx, addr(ADMIN), id)).unwrap();
        let p = fx.engine.proposal(id).unwrap();
        assert_eq!(p.status, ProposalStatus::Executed);
        assert_eq!(p.executed_at, Some(T0 + 5 * DAY));

        let r = with_ctx!(fx, T0 + 5 * DAY, |engine, ctx| engine.execute(&ctx, addr(ADMIN), id));
        assert!(matches!(r, Err(DaoError::InvalidStatus(_))));
    }

    #[test]
    fn test_cancel() {
        let mut fx = Fixture::new();
        let draft = fx.create(ALICE, 10).unwrap();
        let r = with_ctx!(fx, T0 + 1, |engine, ctx| engine.cancel(&ctx, addr(BOB), draft));
        assert_eq!(r, Err(DaoError::NotAdminOrProposer));
        with_ctx!(fx, T0 + 1, |engine, ctx| engine.cancel(&ctx, addr(ALICE), draft)).unwrap();
        assert_eq!(fx.engine.proposal(draft).unwrap().cancelled_at, Some(T0 + 1));

        let active = fx.active(10);
        with_ctx!(fx, T0 + 2, |engine, ctx| engine.cancel(&ctx, addr(ADMIN), active)).unwrap();

        // Terminal: no way back
        let r = with_ctx!(fx, T0 + 3, |engine, ctx| engine.cancel(&ctx, addr(ALICE), active));
        assert!(matches!(r, Err(DaoError::InvalidStatus(_))));
        let r = with_ctx!(fx, T0 + 3, |engine, ctx| engine.start_voting(&ctx, addr(ALICE), draft));
        assert!(matches!(r, Err(DaoError::InvalidStatus(_))));
    }

    #[test]
    fn test_unknown_proposal() {
        let mut fx = Fixture::new();
        assert!(matches!(fx.engine.proposal(42), Err(DaoError::NoSuchProposal(42))));
        let r = with_ctx!(fx, T0, |engine, ctx| engine.finalize(&ctx, addr(BOB), 42));
        assert_eq!(r, Err(DaoError::NoSuchProposal(42)));
    }

    #[test]
    fn test_history_records_every_transition() {
        let mut fx = Fixture::new();
        let id = fx.active(10);
        with_ctx!(fx, T0 + 1, |engine, ctx| engine.cast_vote(&ctx, addr(ALICE), id, VoteType::Yes))
            .unwrap();
        with_ctx!(fx, T0 + 3 * DAY, |engine, ctx| engine.finalize(&ctx, addr(BOB), id)).unwrap();
        with_ctx!(fx, T0 + 3 * DAY, |engine, ctx| engine.execute(&ctx, addr(ALICE), id)).unwrap();

        let trail: Vec<_> = fx
            .engine
            .history_for(id)
            .iter()
            .map(|c| (c.from, c.to, c.reason.as_str()))
            .collect();
        assert_eq!(
            trail,
            vec![
                (None, ProposalStatus::Draft, "created"),
                (Some(ProposalStatus::Draft), ProposalStatus::Active, "voting_started"),
                (Some(ProposalStatus::Active), ProposalStatus::Passed, "majority_reached"),
                (Some(ProposalStatus::Passed), ProposalStatus::Executed, "executed"),
            ]
        );
        assert_eq!(fx.engine.proposals_by_status(ProposalStatus::Executed).len(), 1);
    }
}
