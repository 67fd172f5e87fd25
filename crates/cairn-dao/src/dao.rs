//! Organization store and public operations.
//!
//! Each organization sits behind its own mutex inside a sharded map, so
//! operations on one organization run one at a time while different
//! organizations proceed independently. Every operation reads the clock
//! once and holds the organization lock until it completes.

use crate::config::DaoConfig;
use crate::organization::Organization;
use cairn_governance::{Finalization, NewProposal, Proposal, StatusChange, VoteType};
use cairn_rewards::{DistributionReport, PendingReward, Treasury};
use cairn_staking::{StakeEvent, SyncRepair, UnstakeEvent, Wallet};
use cairn_types::{Address, AdminRegistry, Clock, DaoError, DaoResult, OrgId, Timestamp};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct Dao {
    orgs: DashMap<OrgId, Arc<Mutex<Organization>>>,
    clock: Arc<dyn Clock>,
    wallet: Arc<dyn Wallet>,
    treasury: Arc<dyn Treasury>,
    admins: Arc<dyn AdminRegistry>,
}

impl Dao {
    pub fn new(
        clock: Arc<dyn Clock>,
        wallet: Arc<dyn Wallet>,
        treasury: Arc<dyn Treasury>,
        admins: Arc<dyn AdminRegistry>,
    ) -> Self {
        Self {
            orgs: DashMap::new(),
            clock,
            wallet,
            treasury,
            admins,
        }
    }

    pub fn create_organization(&self, id: OrgId, config: &DaoConfig) -> DaoResult<()> {
        let now = self.clock.now();
        match self.orgs.entry(id) {
            Entry::Occupied(_) => Err(DaoError::InvalidParameter(format!("{} already exists", id))),
            Entry::Vacant(slot) => {
                let org = Organization::new(id, config, now)?;
                slot.insert(Arc::new(Mutex::new(org)));
                tracing::info!("Created organization {}", id);
                Ok(())
            }
        }
    }

    /// Registered organizations, ascending.
    pub fn organizations(&self) -> Vec<OrgId> {
        let mut ids: Vec<OrgId> = self.orgs.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Shared handle to an organization.
    pub fn organization(&self, id: OrgId) -> DaoResult<Arc<Mutex<Organization>>> {
        self.orgs
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(DaoError::UnknownOrganization(id))
    }

    fn with_org<T>(
        &self,
        id: OrgId,
        f: impl FnOnce(&mut Organization, Timestamp) -> DaoResult<T>,
    ) -> DaoResult<T> {
        let handle = self.organization(id)?;
        let mut org = handle.lock();
        let now = self.clock.now();
        f(&mut *org, now)
    }

    fn read_org<T>(&self, id: OrgId, f: impl FnOnce(&Organization) -> T) -> DaoResult<T> {
        let handle = self.organization(id)?;
        let org = handle.lock();
        Ok(f(&*org))
    }

    // Staking

    pub fn stake(&self, org: OrgId, account: Address, amount: u64) -> DaoResult<StakeEvent> {
        let wallet = Arc::clone(&self.wallet);
        self.with_org(org, |o, now| o.stake(wallet.as_ref(), account, amount, now))
    }

    pub fn unstake(&self, org: OrgId, account: Address, amount: u64) -> DaoResult<UnstakeEvent> {
        let wallet = Arc::clone(&self.wallet);
        self.with_org(org, |o, now| o.unstake(wallet.as_ref(), account, amount, now))
    }

    pub fn get_staked_balance(&self, org: OrgId, account: &Address) -> DaoResult<u64> {
        self.read_org(org, |o| o.staking().staked_balance(account))
    }

    pub fn get_total_staked(&self, org: OrgId) -> DaoResult<u64> {
        self.read_org(org, |o| o.staking().total_staked())
    }

    pub fn get_staker_amount(&self, org: OrgId, account: &Address) -> DaoResult<u64> {
        self.read_org(org, |o| o.staking().staker_amount(account))
    }

    pub fn validate_sync(&self, org: OrgId, account: &Address) -> DaoResult<bool> {
        self.read_org(org, |o| o.staking().validate_sync(account))
    }

    pub fn repair_sync(&self, org: OrgId, caller: Address, account: Address) -> DaoResult<SyncRepair> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, _| {
            o.staking_mut().repair_sync(admins.as_ref(), &caller, account)
        })
    }

    // Membership

    pub fn join(&self, org: OrgId, account: Address) -> DaoResult<()> {
        self.with_org(org, |o, now| o.join(account, now))
    }

    pub fn leave(&self, org: OrgId, account: Address) -> DaoResult<()> {
        self.with_org(org, |o, _| o.leave(&account))
    }

    pub fn prune_members(&self, org: OrgId, caller: Address) -> DaoResult<Vec<Address>> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, _| o.prune_members(admins.as_ref(), &caller))
    }

    pub fn is_member(&self, org: OrgId, account: &Address) -> DaoResult<bool> {
        self.read_org(org, |o| o.membership().is_member(o.staking(), account))
    }

    pub fn can_propose(&self, org: OrgId, account: &Address) -> DaoResult<bool> {
        self.read_org(org, |o| o.membership().can_propose(o.staking(), account))
    }

    pub fn voting_power(&self, org: OrgId, account: &Address) -> DaoResult<u64> {
        let admins = Arc::clone(&self.admins);
        self.read_org(org, |o| {
            o.membership()
                .voting_power(o.staking(), admins.as_ref(), account)
        })
    }

    // Governance

    pub fn create_proposal(&self, org: OrgId, caller: Address, args: NewProposal) -> DaoResult<u64> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| o.create_proposal(admins.as_ref(), caller, args, now))
    }

    pub fn start_voting(&self, org: OrgId, caller: Address, id: u64) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| o.start_voting(admins.as_ref(), caller, id, now))
    }

    /// Cast a vote given its wire code (1 = Yes, 2 = No, 3 = Abstain).
    pub fn cast_vote(&self, org: OrgId, caller: Address, id: u64, vote_code: u8) -> DaoResult<()> {
        let vote_type = VoteType::try_from(vote_code)?;
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| {
            o.cast_vote(admins.as_ref(), caller, id, vote_type, now)
        })
    }

    pub fn finalize_proposal(&self, org: OrgId, caller: Address, id: u64) -> DaoResult<Finalization> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| o.finalize_proposal(admins.as_ref(), caller, id, now))
    }

    pub fn execute_proposal(&self, org: OrgId, caller: Address, id: u64) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| o.execute_proposal(admins.as_ref(), caller, id, now))
    }

    pub fn cancel_proposal(&self, org: OrgId, caller: Address, id: u64) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| o.cancel_proposal(admins.as_ref(), caller, id, now))
    }

    pub fn get_proposal(&self, org: OrgId, id: u64) -> DaoResult<Proposal> {
        self.read_org(org, |o| o.proposals().proposal(id).cloned())?
    }

    /// Audit trail of one proposal, oldest first.
    pub fn proposal_history(&self, org: OrgId, id: u64) -> DaoResult<Vec<StatusChange>> {
        self.read_org(org, |o| {
            o.proposals().proposal(id)?;
            Ok(o.proposals().history_for(id).into_iter().cloned().collect())
        })?
    }

    // Rewards

    pub fn claim_rewards(&self, org: OrgId, account: Address) -> DaoResult<u64> {
        let treasury = Arc::clone(&self.treasury);
        self.with_org(org, |o, now| o.claim_rewards(treasury.as_ref(), account, now))
    }

    pub fn get_pending_rewards(&self, org: OrgId, account: &Address) -> DaoResult<Vec<PendingReward>> {
        self.read_org(org, |o| {
            o.rewards()
                .pending_rewards(account)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn get_total_claimable(&self, org: OrgId, account: &Address) -> DaoResult<u64> {
        self.read_org(org, |o| o.rewards().total_claimable(account))
    }

    /// Accrue staking yield using the amounts in the staker registry.
    pub fn distribute_staking_rewards(&self, org: OrgId, caller: Address) -> DaoResult<DistributionReport> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, now| {
            o.distribute_staking_rewards(admins.as_ref(), &caller, now)
        })
    }

    pub fn set_rewards_enabled(&self, org: OrgId, caller: Address, enabled: bool) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, _| {
            o.rewards_mut().set_enabled(admins.as_ref(), &caller, enabled)
        })
    }

    pub fn set_action_rewards(
        &self,
        org: OrgId,
        caller: Address,
        voting: u64,
        proposal_creation: u64,
        proposal_success: u64,
    ) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, _| {
            o.rewards_mut().set_action_rewards(
                admins.as_ref(),
                &caller,
                voting,
                proposal_creation,
                proposal_success,
            )
        })
    }

    pub fn set_staking_yield(&self, org: OrgId, caller: Address, yield_bps: u64) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, _| {
            o.rewards_mut().set_staking_yield(admins.as_ref(), &caller, yield_bps)
        })
    }

    pub fn set_distribution_interval(&self, org: OrgId, caller: Address, interval_secs: u64) -> DaoResult<()> {
        let admins = Arc::clone(&self.admins);
        self.with_org(org, |o, _| {
            o.rewards_mut()
                .set_distribution_interval(admins.as_ref(), &caller, interval_secs)
        })
    }
}
