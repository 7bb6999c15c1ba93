//! Propagation of store mutations into the search index.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, warn};

use eventsync_core::config::{CommitPolicy, SyncConfig};
use eventsync_core::error::{AppError, ErrorKind};
use eventsync_core::result::AppResult;
use eventsync_core::traits::SearchIndex;
use eventsync_core::types::EventId;
use eventsync_entity::Event;

use super::pending::PendingSet;
use super::stats::{SyncCounters, SyncStats};
use super::SyncOperation;
use crate::document::build_document;

/// Mirrors store mutations into a [`SearchIndex`].
///
/// Every upsert carries the complete current document, so repeating one
/// is harmless. A failed propagation is never rolled back into the store;
/// the event id is recorded in the [`PendingSet`] and the error is
/// returned as `IndexSync`.
#[derive(Debug)]
pub struct IndexSynchronizer {
    index: Arc<dyn SearchIndex>,
    policy: CommitPolicy,
    timeout: Duration,
    pending: PendingSet,
    counters: SyncCounters,
}

impl IndexSynchronizer {
    /// Create a synchronizer for `index` using the sync settings.
    pub fn new(index: Arc<dyn SearchIndex>, config: &SyncConfig) -> Self {
        Self {
            index,
            policy: config.commit_policy,
            timeout: config.index_timeout(),
            pending: PendingSet::new(config.retry.clone()),
            counters: SyncCounters::default(),
        }
    }

    /// The index this synchronizer writes to.
    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    /// The configured commit policy.
    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// The reconcile-pending set.
    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    /// Upsert the full current document for `event`.
    pub async fn on_create_or_update(&self, event: &Event) -> AppResult<()> {
        let document = build_document(event);
        let result = self
            .bounded(SyncOperation::Upsert.as_str(), self.index.upsert(document))
            .await;
        self.after_write(event.id, SyncOperation::Upsert, result)
            .await
    }

    /// Remove the document for a deleted event.
    pub async fn on_delete(&self, id: EventId) -> AppResult<()> {
        let result = self
            .bounded(SyncOperation::Remove.as_str(), self.index.remove(&id.index_key()))
            .await;
        self.after_write(id, SyncOperation::Remove, result).await
    }

    /// Commit staged writes, making them visible to queries.
    pub async fn commit(&self) -> AppResult<()> {
        let staged = self.counters.staged.load(Ordering::Acquire);
        match self
            .bounded(SyncOperation::Commit.as_str(), self.index.commit())
            .await
        {
            Ok(()) => {
                // Writes staged while the commit ran stay counted.
                let _ = self.counters.staged.fetch_update(
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    |current| Some(current.saturating_sub(staged)),
                );
                SyncCounters::bump(&self.counters.commits);
                debug!(committed = staged, backend = self.index.backend(), "Index commit");
                Ok(())
            }
            Err(e) => {
                SyncCounters::bump(&self.counters.failures);
                warn!(error = %e, staged, "Index commit failed");
                Err(e)
            }
        }
    }

    /// Commit only if something was staged since the last commit.
    ///
    /// Returns whether a commit was issued.
    pub async fn flush(&self) -> AppResult<bool> {
        if self.counters.staged.load(Ordering::Acquire) == 0 {
            return Ok(false);
        }
        self.commit().await.map(|()| true)
    }

    /// Record an out-of-band failure for `id` (e.g. a panicked propagation task).
    pub fn mark_pending(&self, id: EventId, operation: SyncOperation, error: &str) {
        let attempts = self.pending.mark(id, operation, error);
        SyncCounters::bump(&self.counters.failures);
        warn!(event_id = %id, %operation, attempts, error, "Index propagation failed");
    }

    /// Ids whose retry backoff has elapsed.
    pub fn due_pending(&self) -> Vec<EventId> {
        self.pending.due()
    }

    /// Every document id the index holds, bounded by the index timeout.
    pub async fn list_index_ids(&self) -> AppResult<Vec<String>> {
        self.bounded("list_ids", self.index.list_ids()).await
    }

    /// Remove a document by its raw index id.
    ///
    /// Used for documents whose id is not a valid event id, so nothing is
    /// recorded in the pending set on failure.
    pub async fn remove_document(&self, doc_id: &str) -> AppResult<()> {
        self.bounded(SyncOperation::Remove.as_str(), self.index.remove(doc_id))
            .await?;
        SyncCounters::bump(&self.counters.removals);
        SyncCounters::bump(&self.counters.staged);
        Ok(())
    }

    /// Current counters.
    pub fn stats(&self) -> SyncStats {
        self.counters.snapshot(self.pending.len())
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!(
                "index {what} exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    async fn after_write(
        &self,
        id: EventId,
        operation: SyncOperation,
        result: AppResult<()>,
    ) -> AppResult<()> {
        if let Err(e) = result {
            self.mark_pending(id, operation, &e.to_string());
            return Err(index_sync_error(operation, e));
        }

        match operation {
            SyncOperation::Remove => SyncCounters::bump(&self.counters.removals),
            _ => SyncCounters::bump(&self.counters.upserts),
        };
        let staged = SyncCounters::bump(&self.counters.staged);

        match self.policy {
            CommitPolicy::AfterEach => {
                if let Err(e) = self.commit().await {
                    self.pending.mark(id, SyncOperation::Commit, &e.to_string());
                    return Err(index_sync_error(SyncOperation::Commit, e));
                }
            }
            CommitPolicy::Batched { max_pending, .. } if staged >= max_pending as u64 => {
                // The flusher retries a failed early commit.
                if self.commit().await.is_err() {
                    debug!(event_id = %id, %operation, staged, "Early commit after write failed");
                }
            }
            CommitPolicy::Batched { .. } | CommitPolicy::Manual => {}
        }

        if self.pending.clear(id) {
            debug!(event_id = %id, %operation, "Pending propagation resolved");
        }
        Ok(())
    }
}

fn index_sync_error(operation: SyncOperation, cause: AppError) -> AppError {
    AppError::with_source(
        ErrorKind::IndexSync,
        format!("index {operation} failed: {}", cause.message),
        cause,
    )
}
