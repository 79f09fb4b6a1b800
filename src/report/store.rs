use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use dashmap::{mapref::one::Ref, DashMap};

use crate::config::ReportConfig;
use crate::errors::ReportError;
use crate::operator::{OperatorRegistry, ValueOperator};

use super::bucket::MonthlyBucket;
use super::entry::{ReportEntry, YearMonth};

type MonthMap<T, O> = DashMap<YearMonth, MonthlyBucket<T, O>>;

/// Store whose operator was chosen at runtime, e.g. through [`OperatorRegistry`].
pub type DynMonthlyReport<T> = MonthlyReport<T, Arc<dyn ValueOperator<T>>>;

/// Diagnostic counts summed from live state at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportStats {
    pub key_count: usize,
    pub bucket_count: usize,
    pub total_pending_count: usize,
}

/// Two-level index `key -> month -> MonthlyBucket`.
///
/// Buckets are created lazily, and only by writes: queries for an unknown key
/// or month return the operator's identity (or an empty collection) without
/// touching the index. Creation goes through `DashMap::entry`, so racing
/// writers to a fresh (key, month) pair always land in the same bucket.
///
/// Every timestamp is mapped to a month in the single zone given at
/// construction. Feeding months computed in another zone to the query methods
/// yields unspecified placement.
pub struct MonthlyReport<T, O> {
    operator: O,
    zone: FixedOffset,
    data: DashMap<String, MonthMap<T, O>>,
}

impl<T, O> MonthlyReport<T, O>
where
    T: Clone,
    O: ValueOperator<T> + Clone,
{
    pub fn new(operator: O, zone: FixedOffset) -> Self {
        Self {
            operator,
            zone,
            data: DashMap::new(),
        }
    }

    pub fn with_utc(operator: O) -> Self {
        Self::new(operator, utc())
    }

    pub fn from_config(operator: O, config: &ReportConfig) -> Result<Self, ReportError> {
        Ok(Self::new(operator, config.zone()?))
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Calendar month a timestamp falls into for this store.
    pub fn month_of(&self, timestamp: DateTime<Utc>) -> YearMonth {
        YearMonth::from_instant(timestamp, &self.zone)
    }

    // -- writes --------------------------------------------------------------

    pub fn add_entry(&self, entry: ReportEntry<T>) {
        let month = self.month_of(entry.timestamp);
        let months = self.months_or_create(&entry.key);
        let bucket = match months.get(&month) {
            Some(bucket) => bucket,
            None => months
                .entry(month)
                .or_insert_with(|| {
                    tracing::debug!(key = %entry.key, %month, "creating report bucket");
                    MonthlyBucket::new(self.operator.clone())
                })
                .downgrade(),
        };
        bucket.add_pending(entry);
    }

    pub fn add(&self, key: impl Into<String>, value: T, timestamp: DateTime<Utc>) {
        self.add_entry(ReportEntry::new(key, value, timestamp));
    }

    // -- queries -------------------------------------------------------------

    pub fn keys(&self) -> BTreeSet<String> {
        self.data.iter().map(|item| item.key().clone()).collect()
    }

    /// Months with a bucket for `key`; empty when the key is unknown.
    pub fn months(&self, key: &str) -> BTreeSet<YearMonth> {
        self.data
            .get(key)
            .map(|months| months.iter().map(|item| *item.key()).collect())
            .unwrap_or_default()
    }

    pub fn incremental_sum(&self, key: &str, month: YearMonth) -> T {
        self.read_bucket(key, month, MonthlyBucket::pending_sum)
            .unwrap_or_else(|| self.operator.identity())
    }

    pub fn base_value(&self, key: &str, month: YearMonth) -> T {
        self.read_bucket(key, month, MonthlyBucket::base_value)
            .unwrap_or_else(|| self.operator.identity())
    }

    pub fn total_sum(&self, key: &str, month: YearMonth) -> T {
        self.read_bucket(key, month, MonthlyBucket::total)
            .unwrap_or_else(|| self.operator.identity())
    }

    pub fn pending_count(&self, key: &str, month: YearMonth) -> usize {
        self.read_bucket(key, month, MonthlyBucket::pending_count)
            .unwrap_or(0)
    }

    pub fn pending_entries(&self, key: &str, month: YearMonth) -> Vec<ReportEntry<T>> {
        self.read_bucket(key, month, MonthlyBucket::pending_entries)
            .unwrap_or_default()
    }

    pub fn oldest_pending(&self, key: &str, month: YearMonth) -> Option<DateTime<Utc>> {
        self.read_bucket(key, month, MonthlyBucket::oldest_pending)
            .flatten()
    }

    /// Total per month for `key`. Unordered; callers sort when they need to.
    pub fn all_monthly_sums(&self, key: &str) -> HashMap<YearMonth, T> {
        let Some(months) = self.data.get(key) else {
            return HashMap::new();
        };
        months
            .iter()
            .map(|item| (*item.key(), item.value().total()))
            .collect()
    }

    /// Total across every month recorded for `key`, folded chronologically.
    pub fn key_sum(&self, key: &str) -> T {
        self.all_monthly_sums(key)
            .into_iter()
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .fold(self.operator.identity(), |acc, value| {
                self.operator.combine(acc, value)
            })
    }

    /// Monthly totals for `key` folded by calendar year, in chronological order.
    pub fn yearly_sums(&self, key: &str) -> BTreeMap<i32, T> {
        let monthly: BTreeMap<YearMonth, T> = self.all_monthly_sums(key).into_iter().collect();
        let mut yearly: BTreeMap<i32, T> = BTreeMap::new();
        for (month, value) in monthly {
            let slot = yearly
                .entry(month.year())
                .or_insert_with(|| self.operator.identity());
            let current = std::mem::replace(slot, self.operator.identity());
            *slot = self.operator.combine(current, value);
        }
        yearly
    }

    // -- settlement ----------------------------------------------------------

    /// Settles every bucket. Returns the number of buckets that had pending entries.
    pub fn settle_all(&self) -> usize {
        let mut settled = 0;
        for months in self.data.iter() {
            settled += settle_each(months.value());
        }
        tracing::info!(buckets = settled, "settled all report buckets");
        settled
    }

    /// Settles every month of `key`; a no-op for unknown keys.
    pub fn settle_key(&self, key: &str) -> usize {
        let settled = self
            .data
            .get(key)
            .map(|months| settle_each(months.value()))
            .unwrap_or(0);
        tracing::debug!(key, buckets = settled, "settled report key");
        settled
    }

    /// Settles one bucket and returns the amount folded (identity if absent).
    pub fn settle_month(&self, key: &str, month: YearMonth) -> T {
        self.read_bucket(key, month, MonthlyBucket::settle)
            .unwrap_or_else(|| self.operator.identity())
    }

    // -- management ----------------------------------------------------------

    pub fn remove(&self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    pub fn stats(&self) -> ReportStats {
        let mut stats = ReportStats::default();
        for months in self.data.iter() {
            stats.key_count += 1;
            for bucket in months.value().iter() {
                stats.bucket_count += 1;
                stats.total_pending_count += bucket.value().pending_count();
            }
        }
        stats
    }

    fn months_or_create(&self, key: &str) -> Ref<'_, String, MonthMap<T, O>> {
        if let Some(months) = self.data.get(key) {
            return months;
        }
        self.data
            .entry(key.to_owned())
            .or_insert_with(DashMap::new)
            .downgrade()
    }

    fn read_bucket<R>(
        &self,
        key: &str,
        month: YearMonth,
        read: impl FnOnce(&MonthlyBucket<T, O>) -> R,
    ) -> Option<R> {
        let months = self.data.get(key)?;
        let bucket = months.get(&month)?;
        Some(read(bucket.value()))
    }
}

impl<T> DynMonthlyReport<T>
where
    T: Clone + 'static,
{
    /// Builds a store whose operator is resolved from `registry` by value type.
    pub fn from_registry(
        registry: &OperatorRegistry,
        zone: FixedOffset,
    ) -> Result<Self, ReportError> {
        Ok(Self::new(registry.get::<T>()?, zone))
    }
}

fn settle_each<T, O>(months: &MonthMap<T, O>) -> usize
where
    T: Clone,
    O: ValueOperator<T>,
{
    let mut settled = 0;
    for bucket in months.iter() {
        if bucket.value().pending_count() > 0 {
            bucket.value().settle();
            settled += 1;
        }
    }
    settled
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{IntOperator, LongOperator};
    use chrono::TimeZone;

    fn march(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap()
    }

    fn april(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap()
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn entries_are_bucketed_by_month() {
        let report = MonthlyReport::with_utc(IntOperator);
        report.add("product-a", 100, march(3));
        report.add("product-a", 50, march(20));
        report.add("product-a", 7, april(1));

        let months: Vec<_> = report.months("product-a").into_iter().collect();
        assert_eq!(months, vec![ym(2025, 3), ym(2025, 4)]);
        assert_eq!(report.total_sum("product-a", ym(2025, 3)), 150);
        assert_eq!(report.total_sum("product-a", ym(2025, 4)), 7);
        assert_eq!(report.key_sum("product-a"), 157);
    }

    #[test]
    fn absent_buckets_read_as_identity_without_creation() {
        let report = MonthlyReport::with_utc(LongOperator);
        assert_eq!(report.total_sum("unknown-key", ym(2025, 1)), 0);
        assert_eq!(report.incremental_sum("unknown-key", ym(2025, 1)), 0);
        assert_eq!(report.base_value("unknown-key", ym(2025, 1)), 0);
        assert!(report.months("unknown-key").is_empty());
        assert!(report.all_monthly_sums("unknown-key").is_empty());
        assert_eq!(report.key_sum("unknown-key"), 0);
        assert_eq!(report.stats(), ReportStats::default());
    }

    #[test]
    fn settle_variants_target_expected_buckets() {
        let report = MonthlyReport::with_utc(IntOperator);
        report.add("a", 1, march(1));
        report.add("a", 2, april(1));
        report.add("b", 3, march(2));

        assert_eq!(report.settle_month("a", ym(2025, 3)), 1);
        assert_eq!(report.pending_count("a", ym(2025, 3)), 0);
        assert_eq!(report.pending_count("a", ym(2025, 4)), 1);

        assert_eq!(report.settle_key("a"), 1);
        assert_eq!(report.base_value("a", ym(2025, 4)), 2);
        assert_eq!(report.pending_count("b", ym(2025, 3)), 1);

        assert_eq!(report.settle_all(), 1);
        assert_eq!(report.stats().total_pending_count, 0);

        assert_eq!(report.settle_month("missing", ym(2025, 3)), 0);
        assert_eq!(report.settle_key("missing"), 0);
    }

    #[test]
    fn remove_and_clear_drop_buckets() {
        let report = MonthlyReport::with_utc(IntOperator);
        report.add("a", 1, march(1));
        report.add("b", 1, march(1));
        assert!(report.remove("a"));
        assert!(!report.remove("a"));
        assert_eq!(report.keys().into_iter().collect::<Vec<_>>(), vec!["b"]);
        report.clear();
        assert!(report.keys().is_empty());
    }

    #[test]
    fn stats_sum_live_state() {
        let report = MonthlyReport::with_utc(IntOperator);
        report.add("a", 1, march(1));
        report.add("a", 1, march(2));
        report.add("a", 1, april(2));
        report.add("b", 1, april(3));
        assert_eq!(
            report.stats(),
            ReportStats {
                key_count: 2,
                bucket_count: 3,
                total_pending_count: 4,
            }
        );
        report.settle_key("a");
        assert_eq!(report.stats().total_pending_count, 1);
    }

    #[test]
    fn yearly_sums_fold_months_by_year() {
        let report = MonthlyReport::with_utc(IntOperator);
        report.add("rent", 900, Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap());
        report.add("rent", 900, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        report.add("rent", 950, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let yearly = report.yearly_sums("rent");
        assert_eq!(yearly.into_iter().collect::<Vec<_>>(), vec![(2024, 1800), (2025, 950)]);
    }

    #[test]
    fn zone_decides_month_boundary() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let report = MonthlyReport::new(IntOperator, tokyo);
        report.add("k", 1, Utc.with_ymd_and_hms(2025, 3, 31, 20, 0, 0).unwrap());
        assert_eq!(report.months("k").into_iter().collect::<Vec<_>>(), vec![ym(2025, 4)]);
    }

    #[test]
    fn registry_backed_store_uses_resolved_operator() {
        let registry = OperatorRegistry::with_builtins();
        let report = DynMonthlyReport::<i64>::from_registry(&registry, utc()).expect("i64 builtin");
        report.add("k", 40, march(1));
        report.add("k", 2, march(2));
        assert_eq!(report.total_sum("k", ym(2025, 3)), 42);

        let empty = OperatorRegistry::new();
        assert!(DynMonthlyReport::<i64>::from_registry(&empty, utc()).is_err());
    }

    #[test]
    fn decimal_totals_saturate_near_the_limit() {
        use crate::operator::DecimalOperator;
        use rust_decimal::Decimal;

        let report = MonthlyReport::with_utc(DecimalOperator::default());
        report.add("ledger", Decimal::MAX, march(1));
        report.add("ledger", Decimal::MAX, march(2));
        assert_eq!(report.total_sum("ledger", ym(2025, 3)), Decimal::MAX);
        assert_eq!(report.settle_month("ledger", ym(2025, 3)), Decimal::MAX);
        assert_eq!(report.key_sum("ledger"), Decimal::MAX);
    }
}
