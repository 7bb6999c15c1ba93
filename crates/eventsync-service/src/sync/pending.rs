//! Reconcile-pending set.
//!
//! Holds one entry per event id whose index state may lag the store. An
//! entry does not record what to replay: the retry path re-reads the
//! store and propagates whatever is current, so a stale upsert can never
//! resurrect a deleted event.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::time::Instant;

use eventsync_core::config::RetryConfig;
use eventsync_core::types::EventId;

use super::SyncOperation;

/// Bookkeeping for one lagging event.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    /// Consecutive failed propagations.
    pub attempts: u32,
    /// Earliest time the next retry may run.
    pub next_attempt_at: Instant,
    /// Operation that failed most recently.
    pub last_operation: SyncOperation,
    /// Message of the most recent failure.
    pub last_error: String,
}

/// Concurrent map of lagging event ids with exponential backoff.
#[derive(Debug, Clone)]
pub struct PendingSet {
    entries: Arc<DashMap<EventId, PendingEntry>>,
    retry: RetryConfig,
}

impl PendingSet {
    /// Create an empty set using the given backoff.
    pub fn new(retry: RetryConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            retry,
        }
    }

    /// Record a failure for `id`, pushing its next attempt out.
    ///
    /// Returns the attempt count after this failure.
    pub fn mark(&self, id: EventId, operation: SyncOperation, error: &str) -> u32 {
        let now = Instant::now();
        let mut entry = self.entries.entry(id).or_insert_with(|| PendingEntry {
            attempts: 0,
            next_attempt_at: now,
            last_operation: operation,
            last_error: String::new(),
        });
        entry.attempts = entry.attempts.saturating_add(1);
        entry.next_attempt_at = now + self.retry.delay_for(entry.attempts);
        entry.last_operation = operation;
        entry.last_error = error.to_string();
        entry.attempts
    }

    /// Forget `id` after a successful propagation.
    pub fn clear(&self, id: EventId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Ids whose backoff has elapsed, oldest deadline first.
    pub fn due(&self) -> Vec<EventId> {
        let now = Instant::now();
        let mut due: Vec<(Instant, EventId)> = self
            .entries
            .iter()
            .filter(|e| e.next_attempt_at <= now)
            .map(|e| (e.next_attempt_at, *e.key()))
            .collect();
        due.sort();
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Snapshot of one entry.
    pub fn get(&self, id: EventId) -> Option<PendingEntry> {
        self.entries.get(&id).map(|e| e.value().clone())
    }

    /// Whether `id` is pending.
    pub fn contains(&self, id: EventId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of pending ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn set() -> PendingSet {
        PendingSet::new(RetryConfig {
            base_delay_ms: 100,
            max_delay_ms: 1000,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_gates_due() {
        let pending = set();
        let id = EventId::new();

        assert_eq!(pending.mark(id, SyncOperation::Upsert, "down"), 1);
        assert!(pending.due().is_empty());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(pending.due(), vec![id]);

        assert_eq!(pending.mark(id, SyncOperation::Remove, "still down"), 2);
        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(pending.due().is_empty());
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(pending.due(), vec![id]);

        let entry = pending.get(id).unwrap();
        assert_eq!(entry.last_operation, SyncOperation::Remove);
        assert_eq!(entry.last_error, "still down");
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let pending = set();
        let id = EventId::new();
        pending.mark(id, SyncOperation::Upsert, "x");
        assert!(pending.clear(id));
        assert!(!pending.clear(id));
        assert!(pending.is_empty());
    }
}
