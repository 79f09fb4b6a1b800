//! Validated writes into a report repository.

use chrono::{DateTime, Utc};

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::time::Clock;
use crate::report::{ReportEntry, ReportRepository};

/// Validates entries before they reach the repository.
///
/// Every rule is checked up front, so a rejected call leaves the repository
/// exactly as it was.
pub struct EntryService;

impl EntryService {
    /// Records a single value for `key` at `timestamp`.
    pub fn add<T, R>(
        repo: &R,
        clock: &dyn Clock,
        key: &str,
        value: T,
        timestamp: DateTime<Utc>,
    ) -> ServiceResult<()>
    where
        R: ReportRepository<T> + ?Sized,
    {
        Self::add_entry(repo, clock, ReportEntry::new(key, value, timestamp))
    }

    pub fn add_entry<T, R>(repo: &R, clock: &dyn Clock, entry: ReportEntry<T>) -> ServiceResult<()>
    where
        R: ReportRepository<T> + ?Sized,
    {
        validate(&entry, clock.now())?;
        repo.save(entry)?;
        Ok(())
    }

    /// Records every entry or none of them.
    pub fn add_batch<T, R>(
        repo: &R,
        clock: &dyn Clock,
        entries: Vec<ReportEntry<T>>,
    ) -> ServiceResult<usize>
    where
        R: ReportRepository<T> + ?Sized,
    {
        if entries.is_empty() {
            tracing::warn!("rejected empty report batch");
            return Err(ServiceError::Validation(
                "Entries list cannot be empty".into(),
            ));
        }
        let now = clock.now();
        for (idx, entry) in entries.iter().enumerate() {
            validate(entry, now).map_err(|err| match err {
                ServiceError::Validation(message) => {
                    ServiceError::Validation(format!("entry {idx}: {message}"))
                }
                other => other,
            })?;
        }
        let count = entries.len();
        repo.save_batch(entries)?;
        tracing::debug!(count, "saved report batch");
        Ok(count)
    }
}

fn validate<T>(entry: &ReportEntry<T>, now: DateTime<Utc>) -> ServiceResult<()> {
    if entry.key.trim().is_empty() {
        tracing::warn!("rejected report entry with blank key");
        return Err(ServiceError::Validation(
            "Report key cannot be blank".into(),
        ));
    }
    if entry.timestamp > now {
        tracing::warn!(key = %entry.key, timestamp = %entry.timestamp, "rejected future-dated report entry");
        return Err(ServiceError::Validation(format!(
            "Timestamp {} cannot be in the future",
            entry.timestamp
        )));
    }
    Ok(())
}
