use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::operator::{sum_with, ValueOperator};

use super::entry::ReportEntry;

struct BucketState<T> {
    base: T,
    pending: Vec<ReportEntry<T>>,
}

/// Accumulation cell for one (key, month) pair.
///
/// Holds the settled base value and the pending entries not yet folded into
/// it. Readers share the lock; `add_pending`, `settle` and `clear` take it
/// exclusively, so operations on one bucket are linearizable while separate
/// buckets never contend.
pub struct MonthlyBucket<T, O> {
    operator: O,
    state: RwLock<BucketState<T>>,
}

impl<T, O> MonthlyBucket<T, O>
where
    T: Clone,
    O: ValueOperator<T>,
{
    pub fn new(operator: O) -> Self {
        let base = operator.identity();
        Self {
            operator,
            state: RwLock::new(BucketState {
                base,
                pending: Vec::new(),
            }),
        }
    }

    pub fn add_pending(&self, entry: ReportEntry<T>) {
        self.state.write().pending.push(entry);
    }

    /// Sum of pending entries in insertion order.
    pub fn pending_sum(&self) -> T {
        let state = self.state.read();
        self.fold(&state.pending)
    }

    /// Base value combined with the pending sum.
    pub fn total(&self) -> T {
        let state = self.state.read();
        let pending = self.fold(&state.pending);
        self.operator.combine(state.base.clone(), pending)
    }

    /// Folds pending entries into the base value and returns the amount settled.
    ///
    /// With nothing pending this returns the identity and leaves the base untouched.
    pub fn settle(&self) -> T {
        let mut state = self.state.write();
        if state.pending.is_empty() {
            return self.operator.identity();
        }
        let settled = self.fold(&state.pending);
        let base = std::mem::replace(&mut state.base, self.operator.identity());
        state.base = self.operator.combine(base, settled.clone());
        state.pending.clear();
        settled
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.base = self.operator.identity();
        state.pending.clear();
    }

    pub fn base_value(&self) -> T {
        self.state.read().base.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.state.read().pending.len()
    }

    /// Copy of the pending entries; safe to hold without the lock.
    pub fn pending_entries(&self) -> Vec<ReportEntry<T>> {
        self.state.read().pending.clone()
    }

    /// Earliest timestamp among pending entries.
    pub fn oldest_pending(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .pending
            .iter()
            .map(|entry| entry.timestamp)
            .min()
    }

    fn fold(&self, pending: &[ReportEntry<T>]) -> T {
        sum_with(&self.operator, pending.iter().map(|entry| entry.value.clone()))
    }
}
