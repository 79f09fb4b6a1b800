use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::errors::ReportError;
use crate::operator::ValueOperator;

use super::entry::{ReportEntry, YearMonth};
use super::store::MonthlyReport;

/// Abstraction over report backends.
///
/// The service layer talks to this trait only, so a durable backend can stand
/// in for the in-memory [`MonthlyReport`]. Queries for unknown keys or months
/// must answer with the operator's identity or an empty collection, not an
/// error.
pub trait ReportRepository<T>: Send + Sync {
    fn save(&self, entry: ReportEntry<T>) -> Result<(), ReportError>;

    fn save_batch(&self, entries: Vec<ReportEntry<T>>) -> Result<(), ReportError> {
        for entry in entries {
            self.save(entry)?;
        }
        Ok(())
    }

    fn settle(&self, key: &str, month: YearMonth) -> Result<(), ReportError>;
    fn settle_all(&self) -> Result<(), ReportError>;
    fn clear(&self) -> Result<(), ReportError>;
    fn remove(&self, key: &str) -> Result<bool, ReportError>;

    fn find_keys(&self) -> Result<BTreeSet<String>, ReportError>;
    fn find_months(&self, key: &str) -> Result<BTreeSet<YearMonth>, ReportError>;
    fn find_base_value(&self, key: &str, month: YearMonth) -> Result<T, ReportError>;
    fn find_incremental_value(&self, key: &str, month: YearMonth) -> Result<T, ReportError>;
    fn find_total_value(&self, key: &str, month: YearMonth) -> Result<T, ReportError>;
    fn find_all_monthly_values(&self, key: &str) -> Result<HashMap<YearMonth, T>, ReportError>;
    fn find_pending_entries(
        &self,
        key: &str,
        month: YearMonth,
    ) -> Result<Vec<ReportEntry<T>>, ReportError>;
    fn find_pending_count(&self, key: &str, month: YearMonth) -> Result<usize, ReportError>;
    /// Timestamp of the earliest pending entry, `None` when nothing is pending.
    fn find_oldest_pending(
        &self,
        key: &str,
        month: YearMonth,
    ) -> Result<Option<DateTime<Utc>>, ReportError>;
}

impl<T, O> ReportRepository<T> for MonthlyReport<T, O>
where
    T: Clone + Send + Sync,
    O: ValueOperator<T> + Clone,
{
    fn save(&self, entry: ReportEntry<T>) -> Result<(), ReportError> {
        self.add_entry(entry);
        Ok(())
    }

    fn settle(&self, key: &str, month: YearMonth) -> Result<(), ReportError> {
        self.settle_month(key, month);
        Ok(())
    }

    fn settle_all(&self) -> Result<(), ReportError> {
        MonthlyReport::settle_all(self);
        Ok(())
    }

    fn clear(&self) -> Result<(), ReportError> {
        MonthlyReport::clear(self);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, ReportError> {
        Ok(MonthlyReport::remove(self, key))
    }

    fn find_keys(&self) -> Result<BTreeSet<String>, ReportError> {
        Ok(self.keys())
    }

    fn find_months(&self, key: &str) -> Result<BTreeSet<YearMonth>, ReportError> {
        Ok(self.months(key))
    }

    fn find_base_value(&self, key: &str, month: YearMonth) -> Result<T, ReportError> {
        Ok(self.base_value(key, month))
    }

    fn find_incremental_value(&self, key: &str, month: YearMonth) -> Result<T, ReportError> {
        Ok(self.incremental_sum(key, month))
    }

    fn find_total_value(&self, key: &str, month: YearMonth) -> Result<T, ReportError> {
        Ok(self.total_sum(key, month))
    }

    fn find_all_monthly_values(&self, key: &str) -> Result<HashMap<YearMonth, T>, ReportError> {
        Ok(self.all_monthly_sums(key))
    }

    fn find_pending_entries(
        &self,
        key: &str,
        month: YearMonth,
    ) -> Result<Vec<ReportEntry<T>>, ReportError> {
        Ok(self.pending_entries(key, month))
    }

    fn find_pending_count(&self, key: &str, month: YearMonth) -> Result<usize, ReportError> {
        Ok(self.pending_count(key, month))
    }

    fn find_oldest_pending(
        &self,
        key: &str,
        month: YearMonth,
    ) -> Result<Option<DateTime<Utc>>, ReportError> {
        Ok(self.oldest_pending(key, month))
    }
}
