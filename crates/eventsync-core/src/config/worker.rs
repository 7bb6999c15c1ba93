//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between scans of the reconcile-pending set.
    #[serde(default = "default_resync_interval")]
    pub resync_interval_seconds: u64,
    /// Cron expression (with seconds) for the full store/index reconciliation sweep.
    #[serde(default = "default_reconcile_cron")]
    pub reconcile_cron: String,
    /// Whether the reconciliation sweep is scheduled at all.
    #[serde(default = "default_true")]
    pub reconcile_enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            resync_interval_seconds: default_resync_interval(),
            reconcile_cron: default_reconcile_cron(),
            reconcile_enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_resync_interval() -> u64 {
    5
}

fn default_reconcile_cron() -> String {
    "0 */30 * * * *".to_string()
}
