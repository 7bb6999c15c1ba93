//! Full store-versus-index reconciliation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use eventsync_core::result::AppResult;
use eventsync_core::types::EventId;
use eventsync_service::EventStore;

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Events in the store.
    pub stored: usize,
    /// Documents in the index before the sweep.
    pub indexed: usize,
    /// Stored events that were missing from the index and re-upserted.
    pub upserted: usize,
    /// Index documents with no stored event that were removed.
    pub removed: usize,
    /// Repairs that failed; they are left to the next sweep or the resync loop.
    pub failed: usize,
}

/// Repairs drift between the store and the index.
///
/// The index is listed before the store, so an event created during the
/// sweep can only show up as missing (and be harmlessly re-upserted),
/// never as an orphan. Orphans are re-checked against the store before
/// they are removed.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: EventStore,
}

impl Reconciler {
    /// Create a reconciler over `store` and its synchronizer.
    pub fn new(store: EventStore) -> Self {
        Self { store }
    }

    /// Run one sweep and commit the repairs.
    pub async fn run_once(&self) -> AppResult<ReconcileReport> {
        let sync = self.store.synchronizer();
        let index_ids: BTreeSet<String> = sync.list_index_ids().await?.into_iter().collect();
        let store_ids: BTreeSet<EventId> = self.store.stored_ids().await?.into_iter().collect();

        let mut report = ReconcileReport {
            stored: store_ids.len(),
            indexed: index_ids.len(),
            ..ReconcileReport::default()
        };

        for id in &store_ids {
            if index_ids.contains(&id.index_key()) {
                continue;
            }
            let Some(event) = self.store.load(*id).await? else {
                continue;
            };
            match sync.on_create_or_update(&event).await {
                Ok(()) => report.upserted += 1,
                Err(_) => report.failed += 1,
            }
        }

        for raw in &index_ids {
            let Ok(id) = raw.parse::<EventId>() else {
                warn!(doc_id = %raw, "Index holds a document with a malformed id");
                match sync.remove_document(raw).await {
                    Ok(()) => report.removed += 1,
                    Err(_) => report.failed += 1,
                }
                continue;
            };
            if store_ids.contains(&id) || self.store.load(id).await?.is_some() {
                continue;
            }
            match sync.on_delete(id).await {
                Ok(()) => report.removed += 1,
                Err(_) => report.failed += 1,
            }
        }

        if report.upserted + report.removed > 0 {
            sync.commit().await?;
        }

        info!(
            stored = report.stored,
            indexed = report.indexed,
            upserted = report.upserted,
            removed = report.removed,
            failed = report.failed,
            "Reconciliation sweep finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use eventsync_core::config::{CommitPolicy, SyncConfig};
    use eventsync_core::traits::SearchIndex;
    use eventsync_core::types::IndexDocument;
    use eventsync_database::{EventRepository, MemoryEventRepository};
    use eventsync_entity::{EventContent, MessageBody, TextFormat};
    use eventsync_search::memory::MemorySearchIndex;
    use eventsync_service::IndexSynchronizer;
    use eventsync_storage::providers::memory::MemoryAttachmentStore;

    use super::*;

    #[tokio::test]
    async fn test_repairs_missing_and_orphaned() {
        let config = SyncConfig {
            commit_policy: CommitPolicy::Manual,
            ..SyncConfig::default()
        };
        let repo = Arc::new(MemoryEventRepository::new());
        let index = MemorySearchIndex::new();
        let sync = Arc::new(IndexSynchronizer::new(Arc::new(index.clone()), &config));
        let store = EventStore::new(
            repo.clone(),
            sync,
            Arc::new(MemoryAttachmentStore::new()),
            &config,
        );

        // Written straight to the repository, so never propagated.
        let content =
            EventContent::message(MessageBody::new("lost", TextFormat::PlainText)).authored_on(Utc::now());
        let missing = repo.insert("fp".into(), content).await.unwrap();

        let orphan = EventId::new();
        index
            .upsert(IndexDocument::new(orphan.index_key(), "Message").with_text("text", "ghost"))
            .await
            .unwrap();
        index.upsert(IndexDocument::new("not-a-uuid", "Message")).await.unwrap();
        index.commit().await.unwrap();

        let report = Reconciler::new(store).run_once().await.unwrap();
        assert_eq!(report.stored, 1);
        assert_eq!(report.indexed, 2);
        assert_eq!(report.upserted, 1);
        assert_eq!(report.removed, 2);
        assert_eq!(index.list_ids().await.unwrap(), vec![missing.id.to_string()]);
    }
}
