//! Index synchronization configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// When staged index writes are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit after every single propagation. Serializes unrelated writes;
    /// intended for tests and tooling.
    AfterEach,
    /// Commit on a timer, or early once `max_pending` writes are staged.
    Batched {
        /// Flush interval in milliseconds.
        #[serde(default = "default_batch_interval")]
        interval_ms: u64,
        /// Staged write count that forces an immediate commit.
        #[serde(default = "default_max_pending")]
        max_pending: usize,
    },
    /// Commit only when the caller asks for it.
    Manual,
}

impl CommitPolicy {
    /// Flush interval for the timer-driven flusher, if this policy has one.
    pub fn flush_interval(&self) -> Option<Duration> {
        match self {
            Self::Batched { interval_ms, .. } => Some(Duration::from_millis(*interval_ms)),
            Self::AfterEach | Self::Manual => None,
        }
    }
}

impl Default for CommitPolicy {
    fn default() -> Self {
        Self::Batched {
            interval_ms: default_batch_interval(),
            max_pending: default_max_pending(),
        }
    }
}

/// Backoff settings for re-propagating failed index operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound on the delay between retries, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// Exponential backoff delay after `attempts` failures.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let exp = attempts.saturating_sub(1).min(20);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exp);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

/// Index synchronization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Commit policy for the search index.
    #[serde(default)]
    pub commit_policy: CommitPolicy,
    /// Bound on each primary store call, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    /// Bound on each search index call, in milliseconds.
    #[serde(default = "default_index_timeout")]
    pub index_timeout_ms: u64,
    /// Retry backoff for failed propagations.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl SyncConfig {
    /// Store call timeout as a `Duration`.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Index call timeout as a `Duration`.
    pub fn index_timeout(&self) -> Duration {
        Duration::from_millis(self.index_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            commit_policy: CommitPolicy::default(),
            store_timeout_ms: default_store_timeout(),
            index_timeout_ms: default_index_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_batch_interval() -> u64 {
    1000
}

fn default_max_pending() -> usize {
    100
}

fn default_store_timeout() -> u64 {
    5000
}

fn default_index_timeout() -> u64 {
    5000
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    60_000
}
