//! Monthly report aggregation: entries, buckets, the keyed store and the
//! repository contract it fulfils.

pub mod bucket;
pub mod entry;
pub mod repository;
pub mod settlement;
pub mod store;

pub use bucket::MonthlyBucket;
pub use entry::{ReportEntry, YearMonth};
pub use repository::ReportRepository;
pub use settlement::{DefaultSettlementPolicy, SettledBucket, SettlementPolicy};
pub use store::{DynMonthlyReport, MonthlyReport, ReportStats};
