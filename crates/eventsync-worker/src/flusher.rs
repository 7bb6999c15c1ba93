//! Timer-driven commit of staged index writes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use eventsync_service::IndexSynchronizer;

/// Commits staged index writes on a fixed interval.
#[derive(Debug, Clone)]
pub struct CommitFlusher {
    sync: Arc<IndexSynchronizer>,
    interval: Duration,
}

impl CommitFlusher {
    /// Create a flusher committing every `interval`.
    pub fn new(sync: Arc<IndexSynchronizer>, interval: Duration) -> Self {
        Self { sync, interval }
    }

    /// Run until the cancel signal flips to `true`, then flush once more.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "Commit flusher started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => self.flush_once().await,
            }
        }

        self.flush_once().await;
        info!("Commit flusher stopped");
    }

    /// Commit if anything is staged, logging failures.
    pub async fn flush_once(&self) {
        match self.sync.flush().await {
            Ok(true) => debug!("Flushed staged index writes"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Scheduled index commit failed"),
        }
    }
}
