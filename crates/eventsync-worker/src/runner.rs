//! Worker runner: owns the background loops and the cron scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing;

use eventsync_core::config::WorkerConfig;
use eventsync_core::error::AppError;
use eventsync_service::{EventStore, IndexSynchronizer};

use crate::flusher::CommitFlusher;
use crate::reconcile::Reconciler;
use crate::resync::ResyncLoop;
use crate::scheduler::CronScheduler;

/// Runs every background task until the cancel signal is received.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Event store shared with the request path
    store: EventStore,
    /// Worker configuration
    config: WorkerConfig,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(store: EventStore, config: WorkerConfig) -> Self {
        Self { store, config }
    }

    fn sync(&self) -> Arc<IndexSynchronizer> {
        Arc::clone(self.store.synchronizer())
    }

    /// Start the worker. Runs until the cancel signal flips to `true`,
    /// then stops the scheduler and performs a final flush.
    pub async fn run(&self, cancel: watch::Receiver<bool>) -> Result<(), AppError> {
        let policy = self.sync().policy();
        tracing::info!(
            ?policy,
            resync_interval_secs = self.config.resync_interval_seconds,
            reconcile = self.config.reconcile_enabled,
            "Worker started"
        );

        let scheduler = if self.config.reconcile_enabled {
            let scheduler = CronScheduler::new().await?;
            scheduler
                .register_reconcile(&self.config.reconcile_cron, Reconciler::new(self.store.clone()))
                .await?;
            scheduler.start().await?;
            Some(scheduler)
        } else {
            None
        };

        let resync = ResyncLoop::new(
            self.store.clone(),
            Duration::from_secs(self.config.resync_interval_seconds.max(1)),
        );

        match policy.flush_interval() {
            Some(interval) => {
                let flusher = CommitFlusher::new(self.sync(), interval.max(Duration::from_millis(1)));
                tokio::join!(flusher.run(cancel.clone()), resync.run(cancel));
            }
            None => resync.run(cancel).await,
        }

        if let Some(scheduler) = scheduler {
            if let Err(e) = scheduler.shutdown().await {
                tracing::error!(error = %e, "Failed to stop cron scheduler");
            }
        }

        if let Err(e) = self.sync().flush().await {
            tracing::error!(error = %e, "Final index flush failed");
        }

        tracing::info!(stats = ?self.sync().stats(), "Worker shut down complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use eventsync_core::config::{CommitPolicy, SyncConfig};
    use eventsync_core::traits::SearchIndex;
    use eventsync_database::MemoryEventRepository;
    use eventsync_entity::{EventContent, MessageBody, TextFormat};
    use eventsync_search::memory::MemorySearchIndex;
    use eventsync_storage::providers::memory::MemoryAttachmentStore;

    use super::*;

    #[tokio::test]
    async fn test_manual_policy_flushes_on_shutdown() {
        let config = SyncConfig {
            commit_policy: CommitPolicy::Manual,
            ..SyncConfig::default()
        };
        let index = MemorySearchIndex::new();
        let sync = Arc::new(IndexSynchronizer::new(Arc::new(index.clone()), &config));
        let store = EventStore::new(
            Arc::new(MemoryEventRepository::new()),
            sync,
            Arc::new(MemoryAttachmentStore::new()),
            &config,
        );

        store
            .create(
                EventContent::message(MessageBody::new("later", TextFormat::PlainText))
                    .authored_on(Utc::now()),
            )
            .await
            .unwrap();
        assert!(index.list_ids().await.unwrap().is_empty());

        let runner = WorkerRunner::new(
            store,
            WorkerConfig {
                reconcile_enabled: false,
                ..WorkerConfig::default()
            },
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });
        tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(index.list_ids().await.unwrap().len(), 1);
    }
}
