//! Re-propagation of events whose index state lags the store.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use eventsync_core::result::AppResult;
use eventsync_core::types::EventId;
use eventsync_entity::Event;

use super::service::EventStore;

/// Outcome of one resync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResyncReport {
    /// Pending ids whose backoff had elapsed.
    pub attempted: usize,
    /// Ids brought back in line with the store.
    pub resolved: usize,
    /// Ids that failed again and stay pending.
    pub failed: usize,
}

impl EventStore {
    /// Every stored event id, bounded by the store timeout.
    pub async fn stored_ids(&self) -> AppResult<Vec<EventId>> {
        self.bounded("list_ids", self.repository().list_ids()).await
    }

    /// Read an event for repair work; absence is not an error here.
    pub async fn load(&self, id: EventId) -> AppResult<Option<Event>> {
        self.bounded("find_by_id", self.repository().find_by_id(id)).await
    }

    /// Retry every pending event whose backoff has elapsed.
    ///
    /// Each id is re-read from the store: an event that still exists is
    /// upserted with its current state, one that is gone is removed. A
    /// store read failure leaves the id pending for the next pass.
    pub async fn resync_pending(&self) -> ResyncReport {
        let due = self.synchronizer().due_pending();
        let mut report = ResyncReport {
            attempted: due.len(),
            ..ResyncReport::default()
        };
        if due.is_empty() {
            return report;
        }

        for id in due {
            let current = match self.load(id).await {
                Ok(current) => current,
                Err(e) => {
                    warn!(event_id = %id, error = %e, "Resync skipped: store read failed");
                    report.failed += 1;
                    continue;
                }
            };

            let result = match &current {
                Some(event) => self.synchronizer().on_create_or_update(event).await,
                None => self.synchronizer().on_delete(id).await,
            };

            match result {
                Ok(()) => {
                    debug!(event_id = %id, present = current.is_some(), "Resync succeeded");
                    report.resolved += 1;
                }
                Err(_) => report.failed += 1,
            }
        }

        info!(
            attempted = report.attempted,
            resolved = report.resolved,
            failed = report.failed,
            "Resync pass finished"
        );
        report
    }
}
