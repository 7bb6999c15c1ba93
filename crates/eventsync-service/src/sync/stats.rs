//! Propagation counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of the synchronizer's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Successful upserts.
    pub upserts: u64,
    /// Successful removals.
    pub removals: u64,
    /// Successful commits.
    pub commits: u64,
    /// Failed index calls of any kind.
    pub failures: u64,
    /// Writes staged since the last successful commit.
    pub staged: u64,
    /// Event ids awaiting re-propagation.
    pub pending: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SyncCounters {
    pub upserts: AtomicU64,
    pub removals: AtomicU64,
    pub commits: AtomicU64,
    pub failures: AtomicU64,
    pub staged: AtomicU64,
}

impl SyncCounters {
    pub fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self, pending: usize) -> SyncStats {
        SyncStats {
            upserts: self.upserts.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            staged: self.staged.load(Ordering::Relaxed),
            pending: pending as u64,
        }
    }
}
