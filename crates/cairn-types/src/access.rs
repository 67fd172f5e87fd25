//! Administrator capability check.
//!
//! Role management lives outside the ledger; the core only asks whether an
//! account may call privileged operations for an organization.

use crate::{Address, OrgId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Answers `is_admin(org, account)`.
pub trait AdminRegistry: Send + Sync {
    fn is_admin(&self, org: OrgId, account: &Address) -> bool;
}

/// In-memory administrator table.
#[derive(Debug, Default)]
pub struct StaticAdmins {
    admins: RwLock<HashMap<OrgId, HashSet<Address>>>,
}

impl StaticAdmins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant administrator rights. Returns false if already granted.
    pub fn grant(&self, org: OrgId, account: Address) -> bool {
        self.admins.write().entry(org).or_default().insert(account)
    }

    /// Revoke administrator rights. Returns false if the account was not an admin.
    pub fn revoke(&self, org: OrgId, account: &Address) -> bool {
        self.admins
            .write()
            .get_mut(&org)
            .map(|set| set.remove(account))
            .unwrap_or(false)
    }
}

impl AdminRegistry for StaticAdmins {
    fn is_admin(&self, org: OrgId, account: &Address) -> bool {
        self.admins
            .read()
            .get(&org)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let admins = StaticAdmins::new();
        let org = OrgId::new(1);
        let alice = Address::from_bytes([1u8; 20]);

        assert!(!admins.is_admin(org, &alice));
        assert!(admins.grant(org, alice));
        assert!(!admins.grant(org, alice));
        assert!(admins.is_admin(org, &alice));

        // Scoped per organization
        assert!(!admins.is_admin(OrgId::new(2), &alice));

        assert!(admins.revoke(org, &alice));
        assert!(!admins.is_admin(org, &alice));
        assert!(!admins.revoke(org, &alice));
    }
}
