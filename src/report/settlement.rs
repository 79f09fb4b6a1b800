use std::fmt;

use serde::{Deserialize, Serialize};

use super::entry::YearMonth;
use crate::config::SettlementConfig;

/// Decides whether a bucket's pending entries should be folded now.
pub trait SettlementPolicy: Send + Sync {
    fn should_settle(&self, pending_count: usize, age_in_days: i64) -> bool;
}

/// Settles once enough entries pile up or the oldest one is old enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSettlementPolicy {
    pub pending_threshold: usize,
    pub max_age_days: i64,
}

impl DefaultSettlementPolicy {
    pub fn new(pending_threshold: usize, max_age_days: i64) -> Self {
        Self {
            pending_threshold,
            max_age_days,
        }
    }
}

impl Default for DefaultSettlementPolicy {
    fn default() -> Self {
        Self::new(1000, 30)
    }
}

impl From<&SettlementConfig> for DefaultSettlementPolicy {
    fn from(config: &SettlementConfig) -> Self {
        Self::new(config.pending_threshold, config.max_age_days)
    }
}

impl SettlementPolicy for DefaultSettlementPolicy {
    fn should_settle(&self, pending_count: usize, age_in_days: i64) -> bool {
        pending_count >= self.pending_threshold || age_in_days >= self.max_age_days
    }
}

/// Identifies a bucket settled by a policy-driven sweep.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettledBucket {
    pub key: String,
    pub month: YearMonth,
}

impl fmt::Display for SettledBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.month)
    }
}
