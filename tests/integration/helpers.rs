//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use eventsync_core::config::{CommitPolicy, RetryConfig, SyncConfig};
use eventsync_core::error::AppError;
use eventsync_core::result::AppResult;
use eventsync_core::traits::SearchIndex;
use eventsync_core::types::IndexDocument;
use eventsync_database::MemoryEventRepository;
use eventsync_entity::{EventContent, MessageBody, TextFormat};
use eventsync_search::memory::MemorySearchIndex;
use eventsync_service::{EventStore, IndexSynchronizer};
use eventsync_storage::providers::memory::MemoryAttachmentStore;

/// In-memory index that can be switched offline and slowed down.
#[derive(Debug, Clone, Default)]
pub struct FlakyIndex {
    inner: MemorySearchIndex,
    offline: Arc<AtomicBool>,
    stall_listing: Arc<AtomicBool>,
    upsert_delay: Option<Duration>,
}

impl FlakyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every upsert by `delay`.
    pub fn with_upsert_delay(mut self, delay: Duration) -> Self {
        self.upsert_delay = Some(delay);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `list_ids` hang until switched back.
    pub fn set_stall_listing(&self, stall: bool) {
        self.stall_listing.store(stall, Ordering::SeqCst);
    }

    /// The committed index, bypassing the offline switch.
    pub fn inner(&self) -> &MemorySearchIndex {
        &self.inner
    }

    fn check(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AppError::service_unavailable("index offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchIndex for FlakyIndex {
    fn backend(&self) -> &str {
        "flaky"
    }

    async fn upsert(&self, document: IndexDocument) -> AppResult<()> {
        if let Some(delay) = self.upsert_delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        self.inner.upsert(document).await
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        self.check()?;
        self.inner.remove(id).await
    }

    async fn commit(&self) -> AppResult<()> {
        self.check()?;
        self.inner.commit().await
    }

    async fn query(&self, query: &str, limit: usize) -> AppResult<Vec<String>> {
        self.check()?;
        self.inner.query(query, limit).await
    }

    async fn list_ids(&self) -> AppResult<Vec<String>> {
        if self.stall_listing.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.check()?;
        self.inner.list_ids().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.offline.load(Ordering::SeqCst))
    }
}

/// Test application context
pub struct TestApp {
    pub store: EventStore,
    pub index: FlakyIndex,
    pub attachments: MemoryAttachmentStore,
}

impl TestApp {
    /// Create a test app committing after every write, with retries due immediately.
    pub fn new() -> Self {
        Self::with_index(FlakyIndex::new(), CommitPolicy::AfterEach)
    }

    pub fn with_index(index: FlakyIndex, commit_policy: CommitPolicy) -> Self {
        Self::with_config(
            index,
            SyncConfig {
                commit_policy,
                ..SyncConfig::default()
            },
        )
    }

    /// Create a test app from explicit sync settings; retries are always due immediately.
    pub fn with_config(index: FlakyIndex, config: SyncConfig) -> Self {
        let config = SyncConfig {
            retry: RetryConfig {
                base_delay_ms: 0,
                max_delay_ms: 0,
            },
            ..config
        };
        let repo = Arc::new(MemoryEventRepository::new());
        let attachments = MemoryAttachmentStore::new();
        let sync = Arc::new(IndexSynchronizer::new(Arc::new(index.clone()), &config));
        let store = EventStore::new(
            repo,
            sync,
            Arc::new(attachments.clone()),
            &config,
        );

        Self {
            store,
            index,
            attachments,
        }
    }

    /// Ids currently committed to the index.
    pub async fn indexed_ids(&self) -> Vec<String> {
        self.index.inner().list_ids().await.expect("list ids")
    }

    /// Ids committed to the index that match `query`.
    pub async fn search(&self, query: &str) -> Vec<String> {
        self.index.inner().query(query, 100).await.expect("query")
    }
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

/// A valid message from `from` to `to`.
pub fn message(from: &str, to: &str, text: &str, format: TextFormat) -> EventContent {
    EventContent::message(MessageBody::new(text, format).from(from).to(to)).authored_on(at(9))
}
