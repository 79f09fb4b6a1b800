use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::operator::ValueOperator;
use crate::report::{ReportRepository, YearMonth};

use super::ServiceResult;

/// Composite view of one (key, month) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary<T> {
    pub key: String,
    pub month: YearMonth,
    pub base_value: T,
    pub incremental_value: T,
    pub total_value: T,
    pub incremental_count: usize,
}

/// Read-only queries over a report repository.
pub struct SummaryService;

impl SummaryService {
    /// Base, pending and total values plus pending count for one bucket.
    pub fn summary<T, R>(repo: &R, key: &str, month: YearMonth) -> ServiceResult<ReportSummary<T>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        let base_value = repo.find_base_value(key, month)?;
        let incremental_value = repo.find_incremental_value(key, month)?;
        let total_value = repo.find_total_value(key, month)?;
        let incremental_count = repo.find_pending_count(key, month)?;
        Ok(ReportSummary {
            key: key.to_string(),
            month,
            base_value,
            incremental_value,
            total_value,
            incremental_count,
        })
    }

    /// Monthly totals for `key`, ordered chronologically.
    pub fn monthly_report<T, R>(repo: &R, key: &str) -> ServiceResult<BTreeMap<YearMonth, T>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        Ok(repo.find_all_monthly_values(key)?.into_iter().collect())
    }

    /// Monthly totals for `key` folded by calendar year.
    pub fn yearly_report<T, R, O>(
        repo: &R,
        operator: &O,
        key: &str,
    ) -> ServiceResult<BTreeMap<i32, T>>
    where
        R: ReportRepository<T> + ?Sized,
        O: ValueOperator<T> + ?Sized,
    {
        let mut yearly: BTreeMap<i32, T> = BTreeMap::new();
        for (month, value) in Self::monthly_report(repo, key)? {
            let combined = match yearly.remove(&month.year()) {
                Some(current) => operator.combine(current, value),
                None => operator.combine(operator.identity(), value),
            };
            yearly.insert(month.year(), combined);
        }
        Ok(yearly)
    }

    pub fn keys<T, R>(repo: &R) -> ServiceResult<BTreeSet<String>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        Ok(repo.find_keys()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::DecimalOperator;
    use crate::report::MonthlyReport;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn summary_combines_base_and_pending() {
        let report = MonthlyReport::with_utc(DecimalOperator::currency());
        let day = |d| Utc.with_ymd_and_hms(2025, 2, d, 8, 0, 0).unwrap();
        report.add("fees", dec!(10.00), day(1));
        report.add("fees", dec!(2.50), day(2));
        report.settle_all();
        report.add("fees", dec!(1.25), day(3));

        let summary = SummaryService::summary(&report, "fees", ym(2025, 2)).unwrap();
        assert_eq!(summary.base_value, dec!(12.50));
        assert_eq!(summary.incremental_value, dec!(1.25));
        assert_eq!(summary.total_value, dec!(13.75));
        assert_eq!(summary.incremental_count, 1);
    }

    #[test]
    fn summary_of_unknown_bucket_is_identity() {
        let report = MonthlyReport::with_utc(DecimalOperator::default());
        let summary = SummaryService::summary(&report, "missing", ym(2025, 2)).unwrap();
        assert_eq!(summary.total_value, dec!(0));
        assert_eq!(summary.incremental_count, 0);
    }

    #[test]
    fn yearly_report_groups_months() {
        let report = MonthlyReport::with_utc(DecimalOperator::default());
        report.add("rent", dec!(900), Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        report.add("rent", dec!(950), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        report.add("rent", dec!(950), Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        let yearly =
            SummaryService::yearly_report(&report, &DecimalOperator::default(), "rent").unwrap();
        assert_eq!(yearly.get(&2024), Some(&dec!(900)));
        assert_eq!(yearly.get(&2025), Some(&dec!(1900)));

        let monthly = SummaryService::monthly_report(&report, "rent").unwrap();
        let months: Vec<_> = monthly.keys().copied().collect();
        assert_eq!(months, vec![ym(2024, 12), ym(2025, 1), ym(2025, 2)]);
    }
}
