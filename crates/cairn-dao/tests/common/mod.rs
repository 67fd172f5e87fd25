//! Shared harness for DAO integration tests.

#![allow(dead_code)]

use cairn_dao::{
    Address, Dao, DaoConfig, InMemoryTreasury, InMemoryWallet, ManualClock, NewProposal, OrgId,
    StaticAdmins, Treasury,
};
use std::sync::Arc;

pub const T0: u64 = 1_700_000_000;
pub const DAY: u64 = 24 * 3600;
pub const ORG: OrgId = OrgId::new(1);

pub const ALICE: Address = Address::from_bytes([1u8; 20]);
pub const BOB: Address = Address::from_bytes([2u8; 20]);
pub const CAROL: Address = Address::from_bytes([3u8; 20]);
pub const ADMIN: Address = Address::from_bytes([9u8; 20]);

pub struct Harness {
    pub dao: Dao,
    pub clock: Arc<ManualClock>,
    pub wallet: Arc<InMemoryWallet>,
    pub treasury: Arc<InMemoryTreasury>,
    pub admins: Arc<StaticAdmins>,
}

impl Harness {
    /// One organization with default config, funded wallets and treasury.
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let wallet = Arc::new(InMemoryWallet::new());
        let treasury = Arc::new(InMemoryTreasury::new());
        let admins = Arc::new(StaticAdmins::new());

        let dao = Dao::new(clock.clone(), wallet.clone(), treasury.clone(), admins.clone());
        dao.create_organization(ORG, &DaoConfig::default()).unwrap();
        admins.grant(ORG, ADMIN);
        treasury.deposit(ORG, 1_000_000).unwrap();
        for account in [ALICE, BOB, CAROL] {
            wallet.set_balance(account, 10_000);
        }

        Self {
            dao,
            clock,
            wallet,
            treasury,
            admins,
        }
    }

    /// Alice 500, Bob 300, Carol 150, all joined.
    pub fn with_members() -> Self {
        let h = Self::new();
        for (account, amount) in [(ALICE, 500), (BOB, 300), (CAROL, 150)] {
            h.dao.stake(ORG, account, amount).unwrap();
            h.dao.join(ORG, account).unwrap();
        }
        h
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(secs);
    }

    /// Create a proposal as `proposer` and open voting on it.
    pub fn open_proposal(&self, proposer: Address, quorum: u64) -> u64 {
        let id = self
            .dao
            .create_proposal(ORG, proposer, proposal("Fund the bridge", DAY, quorum))
            .unwrap();
        self.dao.start_voting(ORG, proposer, id).unwrap();
        id
    }
}

pub fn proposal(title: &str, voting_duration: u64, min_quorum_percent: u64) -> NewProposal {
    NewProposal {
        title: title.to_string(),
        description: format!("{} for the next season", title),
        voting_duration,
        execution_window: DAY,
        min_quorum_percent,
    }
}
