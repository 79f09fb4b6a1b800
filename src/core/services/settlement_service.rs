//! Settlement sweeps: explicit and policy-driven folding of pending entries.

use chrono::{DateTime, Utc};

use crate::core::time::Clock;
use crate::report::{ReportRepository, SettledBucket, SettlementPolicy, YearMonth};

use super::ServiceResult;

pub struct SettlementService;

impl SettlementService {
    pub fn settle_month<T, R>(repo: &R, key: &str, month: YearMonth) -> ServiceResult<()>
    where
        R: ReportRepository<T> + ?Sized,
    {
        repo.settle(key, month)?;
        Ok(())
    }

    /// Settles every month recorded for `key`; unknown keys are a no-op.
    pub fn settle_key<T, R>(repo: &R, key: &str) -> ServiceResult<()>
    where
        R: ReportRepository<T> + ?Sized,
    {
        for month in repo.find_months(key)? {
            repo.settle(key, month)?;
        }
        Ok(())
    }

    pub fn settle_all<T, R>(repo: &R) -> ServiceResult<()>
    where
        R: ReportRepository<T> + ?Sized,
    {
        repo.settle_all()?;
        Ok(())
    }

    /// Walks every bucket and settles the ones `policy` selects.
    ///
    /// A bucket's age is the whole number of days between its oldest pending
    /// entry and `clock.now()`. Buckets with nothing pending are skipped.
    pub fn settle_smart<T, R>(
        repo: &R,
        policy: &dyn SettlementPolicy,
        clock: &dyn Clock,
    ) -> ServiceResult<Vec<SettledBucket>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        let now = clock.now();
        let mut settled = Vec::new();
        let mut inspected = 0usize;
        for key in repo.find_keys()? {
            for month in repo.find_months(&key)? {
                let Some(oldest) = repo.find_oldest_pending(&key, month)? else {
                    continue;
                };
                let pending_count = repo.find_pending_count(&key, month)?;
                inspected += 1;
                let age = age_in_days(oldest, now);
                if policy.should_settle(pending_count, age) {
                    repo.settle(&key, month)?;
                    settled.push(SettledBucket {
                        key: key.clone(),
                        month,
                    });
                }
            }
        }
        tracing::info!(
            inspected,
            settled = settled.len(),
            "policy-driven settlement finished"
        );
        Ok(settled)
    }
}

fn age_in_days(oldest: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - oldest).num_days().max(0)
}
