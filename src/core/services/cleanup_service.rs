use crate::report::ReportRepository;

use super::ServiceResult;

/// Removal helpers for report data.
pub struct CleanupService;

impl CleanupService {
    /// Removes all buckets for `key`, returning whether anything was removed.
    pub fn remove_key<T, R>(repo: &R, key: &str) -> ServiceResult<bool>
    where
        R: ReportRepository<T> + ?Sized,
    {
        let removed = repo.remove(key)?;
        tracing::debug!(key, removed, "removed report key");
        Ok(removed)
    }

    pub fn clear_all<T, R>(repo: &R) -> ServiceResult<()>
    where
        R: ReportRepository<T> + ?Sized,
    {
        repo.clear()?;
        tracing::info!("cleared all report data");
        Ok(())
    }

    /// Drops keys that no longer own any month and returns how many went.
    pub fn remove_empty_keys<T, R>(repo: &R) -> ServiceResult<usize>
    where
        R: ReportRepository<T> + ?Sized,
    {
        let mut removed = 0;
        for key in repo.find_keys()? {
            if repo.find_months(&key)?.is_empty() && repo.remove(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
