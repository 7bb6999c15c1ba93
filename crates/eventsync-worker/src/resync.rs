//! Periodic retry of pending index propagations.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use eventsync_service::EventStore;

/// Polls the reconcile-pending set and re-propagates due events.
#[derive(Debug, Clone)]
pub struct ResyncLoop {
    store: EventStore,
    interval: Duration,
}

impl ResyncLoop {
    /// Create a loop polling every `interval`.
    pub fn new(store: EventStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run until the cancel signal flips to `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Resync loop started");

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        break;
                    }
                }
                _ = time::sleep(self.interval) => {
                    let report = self.store.resync_pending().await;
                    if report.attempted > 0 {
                        debug!(?report, "Resync tick");
                    }
                }
            }
        }

        info!("Resync loop stopped");
    }
}
