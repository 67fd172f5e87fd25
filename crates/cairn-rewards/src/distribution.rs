//! Time-based staking yield.

use crate::config::BPS_DENOMINATOR;
use crate::ledger::RewardLedger;
use cairn_types::{
    Address, AdminRegistry, DaoError, DaoResult, RewardKind, Timestamp, SECONDS_PER_YEAR,
};

const YIELD_DENOMINATOR: u128 = (SECONDS_PER_YEAR as u128) * (BPS_DENOMINATOR as u128);

/// `staked * yield_bps * elapsed / (year * 10_000)`.
///
/// Products are taken in u128; `Overflow` only when the reward itself does
/// not fit in u64.
pub fn staking_reward(staked: u64, yield_bps: u64, elapsed: u64) -> DaoResult<u64> {
    let reward = u128::from(staked)
        .checked_mul(u128::from(yield_bps))
        .and_then(|v| v.checked_mul(u128::from(elapsed)))
        .map(|v| v / YIELD_DENOMINATOR)
        .ok_or(DaoError::Overflow)?;
    u64::try_from(reward).map_err(|_| DaoError::Overflow)
}

/// Outcome of one distribution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Interval had not elapsed; nothing changed
    pub skipped: bool,
    pub elapsed: u64,
    /// (staker, reward id, amount)
    pub credited: Vec<(Address, u64, u64)>,
    /// Stakers whose reward overflowed
    pub overflowed: Vec<Address>,
}

impl DistributionReport {
    pub fn total(&self) -> u64 {
        self.credited
            .iter()
            .fold(0u64, |acc, (_, _, amount)| acc.saturating_add(*amount))
    }
}

impl RewardLedger {
    /// Accrue staking yield for the time since the previous distribution.
    ///
    /// `stakers[i]` holds `amounts[i]`. Stakers whose reward overflows or
    /// rounds to zero are skipped; the rest are credited.
    pub fn distribute_staking_rewards(
        &mut self,
        admins: &dyn AdminRegistry,
        caller: &Address,
        stakers: &[Address],
        amounts: &[u64],
        now: Timestamp,
    ) -> DaoResult<DistributionReport> {
        self.ensure_admin(admins, caller)?;
        if stakers.len() != amounts.len() {
            return Err(DaoError::InvalidParameter(format!(
                "{} stakers but {} amounts",
                stakers.len(),
                amounts.len()
            )));
        }

        let elapsed = now.saturating_sub(self.last_staking_distribution);
        if elapsed < self.config.distribution_interval_secs {
            tracing::debug!(
                "{}: staking distribution skipped, {}s of {}s elapsed",
                self.org,
                elapsed,
                self.config.distribution_interval_secs
            );
            return Ok(DistributionReport {
                skipped: true,
                elapsed,
                ..Default::default()
            });
        }

        let yield_bps = self.config.staking_yield_bps;
        let mut report = DistributionReport {
            elapsed,
            ..Default::default()
        };

        for (staker, &staked) in stakers.iter().zip(amounts) {
            match staking_reward(staked, yield_bps, elapsed) {
                Ok(0) => {
                    tracing::debug!("{}: staking reward for {} rounds to zero", self.org, staker);
                }
                Ok(amount) => {
                    if let Some(id) =
                        self.create_pending_reward(*staker, amount, RewardKind::Staking, None, now)
                    {
                        report.credited.push((*staker, id, amount));
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        "{}: staking reward for {} overflowed (staked {}, {}s), skipped",
                        self.org,
                        staker,
                        staked,
                        elapsed
                    );
                    report.overflowed.push(*staker);
                }
            }
        }

        self.last_staking_distribution = now;
        tracing::info!(
            "{}: distributed {} in staking rewards to {} stakers over {}s",
            self.org,
            report.total(),
            report.credited.len(),
            elapsed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardConfig;
    use cairn_types::{OrgId, StaticAdmins, SECONDS_PER_DAY};

    const T0: Timestamp = 1_700_000_000;
    const ORG: OrgId = OrgId::new(1);

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    fn setup() -> (RewardLedger, StaticAdmins) {
        let admins = StaticAdmins::new();
        admins.grant(ORG, addr(9));
        (RewardLedger::new(ORG, RewardConfig::default(), T0).unwrap(), admins)
    }

    #[test]
    fn test_staking_reward_formula() {
        // 5% of 1_000_000 over a full year
        assert_eq!(staking_reward(1_000_000, 500, SECONDS_PER_YEAR), Ok(50_000));
        assert_eq!(staking_reward(1_000_000, 500, 0), Ok(0));
        // Full yield over two years doubles the stake past u64
        assert_eq!(
            staking_reward(u64::MAX, 10_000, 2 * SECONDS_PER_YEAR),
            Err(DaoError::Overflow)
        );
        assert_eq!(staking_reward(u64::MAX, 10_000, u64::MAX), Err(DaoError::Overflow));
    }

    #[test]
    fn test_staking_reward_large_stakes() {
        assert_eq!(
            staking_reward(2_000_000_000, 500, SECONDS_PER_YEAR),
            Ok(100_000_000)
        );
        assert_eq!(
            staking_reward(1_000_000_000_000, 500, SECONDS_PER_DAY),
            Ok(136_986_301)
        );
        assert_eq!(staking_reward(u64::MAX, 10_000, SECONDS_PER_YEAR), Ok(u64::MAX));
    }

    #[test]
    fn test_distribution_requires_admin() {
        let (mut ledger, admins) = setup();
        assert_eq!(
            ledger.distribute_staking_rewards(&admins, &addr(1), &[], &[], T0 + SECONDS_PER_DAY),
            Err(DaoError::NotAdmin)
        );
    }

    #[test]
    fn test_distribution_rejects_mismatched_inputs() {
        let (mut ledger, admins) = setup();
        let result =
            ledger.distribute_staking_rewards(&admins, &addr(9), &[addr(1)], &[], T0 + SECONDS_PER_DAY);
        assert!(matches!(result, Err(DaoError::InvalidParameter(_))));
    }

    #[test]
    fn test_distribution_skipped_before_interval() {
        let (mut ledger, admins) = setup();
        let report = ledger
            .distribute_staking_rewards(&admins, &addr(9), &[addr(1)], &[1_000_000], T0 + 60)
            .unwrap();
        assert!(report.skipped);
        assert!(ledger.is_empty());
        assert_eq!(ledger.last_staking_distribution(), T0);
    }

    #[test]
    fn test_distribution_credits_stakers() {
        let (mut ledger, admins) = setup();
        let now = T0 + SECONDS_PER_YEAR;
        let report = ledger
            .distribute_staking_rewards(
                &admins,
                &addr(9),
                &[addr(1), addr(2), addr(3)],
                &[1_000_000, 10, 2_000_000_000],
                now,
            )
            .unwrap();

        assert!(!report.skipped);
        assert_eq!(report.credited.len(), 2);
        assert_eq!(report.credited[0].0, addr(1));
        assert_eq!(report.credited[0].2, 50_000);
        assert!(report.overflowed.is_empty());
        assert_eq!(ledger.total_claimable(&addr(1)), 50_000);
        assert_eq!(ledger.total_claimable(&addr(2)), 0);
        assert_eq!(ledger.total_claimable(&addr(3)), 100_000_000);
        assert_eq!(ledger.last_staking_distribution(), now);

        // Immediately again: interval not elapsed
        let again = ledger
            .distribute_staking_rewards(&admins, &addr(9), &[addr(1)], &[1_000_000], now + 1)
            .unwrap();
        assert!(again.skipped);
    }

    #[test]
    fn test_distribution_skips_overflowing_staker() {
        let (mut ledger, admins) = setup();
        ledger.set_staking_yield(&admins, &addr(9), 10_000).unwrap();
        let now = T0 + 2 * SECONDS_PER_YEAR;
        let report = ledger
            .distribute_staking_rewards(
                &admins,
                &addr(9),
                &[addr(1), addr(2)],
                &[1_000, u64::MAX],
                now,
            )
            .unwrap();

        assert_eq!(report.overflowed, vec![addr(2)]);
        assert_eq!(ledger.total_claimable(&addr(1)), 2_000);
        assert_eq!(ledger.total_claimable(&addr(2)), 0);
    }

    #[test]
    fn test_disabled_distribution_still_advances() {
        let (mut ledger, admins) = setup();
        ledger.set_enabled(&admins, &addr(9), false).unwrap();
        let now = T0 + SECONDS_PER_YEAR;
        let report = ledger
            .distribute_staking_rewards(&admins, &addr(9), &[addr(1)], &[1_000_000], now)
            .unwrap();
        assert!(report.credited.is_empty());
        assert_eq!(ledger.last_staking_distribution(), now);
    }
}
