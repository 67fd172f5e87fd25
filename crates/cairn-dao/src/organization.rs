//! One organization's state and the operations that span its components.
//!
//! The governance engine never touches rewards directly; it hands back
//! reward triggers which are recorded here in the same call.

use crate::config::DaoConfig;
use cairn_governance::{
    Finalization, GovernanceContext, MembershipGate, NewProposal, ProposalEngine, VoteType,
};
use cairn_rewards::{DistributionReport, RewardLedger, Treasury};
use cairn_staking::{StakingLedger, Wallet};
use cairn_types::{Address, AdminRegistry, DaoError, DaoResult, OrgId, Timestamp};

#[derive(Debug, Clone)]
pub struct Organization {
    id: OrgId,
    created_at: Timestamp,
    staking: StakingLedger,
    membership: MembershipGate,
    proposals: ProposalEngine,
    rewards: RewardLedger,
}

fn governance_ctx<'a>(
    ledger: &'a StakingLedger,
    membership: &'a MembershipGate,
    admins: &'a dyn AdminRegistry,
    now: Timestamp,
) -> GovernanceContext<'a> {
    GovernanceContext {
        ledger,
        membership,
        admins,
        now,
    }
}

impl Organization {
    pub fn new(id: OrgId, config: &DaoConfig, now: Timestamp) -> DaoResult<Self> {
        if config.staking.lock_period_secs == 0 {
            return Err(DaoError::InvalidParameter(
                "lock period must be nonzero".to_string(),
            ));
        }
        Ok(Self {
            id,
            created_at: now,
            staking: StakingLedger::with_lock_period(id, config.staking.lock_period_secs),
            membership: MembershipGate::new(id, config.membership)?,
            proposals: ProposalEngine::new(id, config.governance)?,
            rewards: RewardLedger::new(id, config.rewards, now)?,
        })
    }

    pub fn id(&self) -> OrgId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn staking(&self) -> &StakingLedger {
        &self.staking
    }

    pub fn membership(&self) -> &MembershipGate {
        &self.membership
    }

    pub fn proposals(&self) -> &ProposalEngine {
        &self.proposals
    }

    pub fn rewards(&self) -> &RewardLedger {
        &self.rewards
    }

    pub(crate) fn staking_mut(&mut self) -> &mut StakingLedger {
        &mut self.staking
    }

    pub(crate) fn rewards_mut(&mut self) -> &mut RewardLedger {
        &mut self.rewards
    }

    pub fn stake(
        &mut self,
        wallet: &dyn Wallet,
        account: Address,
        amount: u64,
        now: Timestamp,
    ) -> DaoResult<cairn_staking::StakeEvent> {
        self.staking.stake(wallet, account, amount, now)
    }

    pub fn unstake(
        &mut self,
        wallet: &dyn Wallet,
        account: Address,
        amount: u64,
        now: Timestamp,
    ) -> DaoResult<cairn_staking::UnstakeEvent> {
        self.staking.unstake(wallet, account, amount, now)
    }

    pub fn join(&mut self, account: Address, now: Timestamp) -> DaoResult<()> {
        self.membership.join(&self.staking, account, now)
    }

    pub fn leave(&mut self, account: &Address) -> DaoResult<()> {
        self.membership.leave(account)
    }

    pub fn prune_members(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
    ) -> DaoResult<Vec<Address>> {
        self.membership.prune(admins, caller, &self.staking)
    }

    pub fn create_proposal(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: Address,
        args: NewProposal,
        now: Timestamp,
    ) -> DaoResult<u64> {
        let ctx = governance_ctx(&self.staking, &self.membership, admins, now);
        let (id, trigger) = self.proposals.create(&ctx, caller, args)?;
        self.rewards.record_trigger(&trigger, now);
        Ok(id)
    }

    pub fn start_voting(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: Address,
        id: u64,
        now: Timestamp,
    ) -> DaoResult<()> {
        let ctx = governance_ctx(&self.staking, &self.membership, admins, now);
        self.proposals.start_voting(&ctx, caller, id)
    }

    pub fn cast_vote(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: Address,
        id: u64,
        vote_type: VoteType,
        now: Timestamp,
    ) -> DaoResult<()> {
        let ctx = governance_ctx(&self.staking, &self.membership, admins, now);
        let trigger = self.proposals.cast_vote(&ctx, caller, id, vote_type)?;
        self.rewards.record_trigger(&trigger, now);
        Ok(())
    }

    pub fn finalize_proposal(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: Address,
        id: u64,
        now: Timestamp,
    ) -> DaoResult<Finalization> {
        let ctx = governance_ctx(&self.staking, &self.membership, admins, now);
        let finalization = self.proposals.finalize(&ctx, caller, id)?;
        if let Some(trigger) = &finalization.reward {
            self.rewards.record_trigger(trigger, now);
        }
        Ok(finalization)
    }

    pub fn execute_proposal(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: Address,
        id: u64,
        now: Timestamp,
    ) -> DaoResult<()> {
        let ctx = governance_ctx(&self.staking, &self.membership, admins, now);
        self.proposals.execute(&ctx, caller, id)
    }

    pub fn cancel_proposal(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: Address,
        id: u64,
        now: Timestamp,
    ) -> DaoResult<()> {
        let ctx = governance_ctx(&self.staking, &self.membership, admins, now);
        self.proposals.cancel(&ctx, caller, id)
    }

    /// Accrue staking yield for every current staker, reading amounts from
    /// the staker registry.
    pub fn distribute_staking_rewards(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        now: Timestamp,
    ) -> DaoResult<DistributionReport> {
        let (stakers, amounts): (Vec<Address>, Vec<u64>) =
            self.staking.stakers().into_iter().unzip();
        self.rewards
            .distribute_staking_rewards(admins, caller, &stakers, &amounts, now)
    }

    /// Claim all pending rewards and pay them from the treasury.
    ///
    /// The treasury is checked before anything is marked claimed.
    pub fn claim_rewards(
        &mut self,
        treasury: &dyn Treasury,
        account: Address,
        now: Timestamp,
    ) -> DaoResult<u64> {
        let claimable = self.rewards.total_claimable(&account);
        if claimable == 0 {
            return Err(DaoError::NothingToClaim);
        }
        let available = treasury.balance_of(self.id);
        if available < claimable {
            return Err(DaoError::InsufficientTreasury {
                required: claimable,
                have: available,
            });
        }

        let amount = self.rewards.claim(&account, now)?;
        if let Err(e) = treasury.withdraw(self.id, &account, amount) {
            tracing::error!(
                "{}: payout of {} to {} failed after claim was recorded: {}",
                self.id,
                amount,
                account,
                e
            );
            return Err(e);
        }
        Ok(amount)
    }
}
