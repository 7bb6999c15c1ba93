//! Search index propagation.

pub mod pending;
pub mod stats;
pub mod synchronizer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use pending::{PendingEntry, PendingSet};
pub use stats::SyncStats;
pub use synchronizer::IndexSynchronizer;

/// Kind of index write propagated for a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    /// Full document add-or-replace.
    Upsert,
    /// Removal by id.
    Remove,
    /// Commit of staged writes.
    Commit,
}

impl SyncOperation {
    /// Return the operation as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upsert => "upsert",
            Self::Remove => "remove",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
