//! Attachment manager that dispatches to the configured store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use eventsync_core::config::StorageConfig;
use eventsync_core::error::AppError;
use eventsync_core::result::AppResult;
use eventsync_core::traits::AttachmentStore;

/// Wraps the configured [`AttachmentStore`].
#[derive(Debug, Clone)]
pub struct AttachmentManager {
    inner: Arc<dyn AttachmentStore>,
}

impl AttachmentManager {
    /// Create the store selected by configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn AttachmentStore> = match config.provider.as_str() {
            #[cfg(feature = "local")]
            "local" => {
                info!(root = %config.local.root_path, "Initializing local attachment store");
                Arc::new(crate::providers::local::LocalAttachmentStore::new(&config.local.root_path).await?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory attachment store");
                Arc::new(crate::providers::memory::MemoryAttachmentStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: memory, local"
                )));
            }
        };
        Ok(Self { inner })
    }

    /// Wrap an existing store (for testing).
    pub fn from_store(store: Arc<dyn AttachmentStore>) -> Self {
        Self { inner: store }
    }

    /// The wrapped store.
    pub fn store(&self) -> Arc<dyn AttachmentStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl AttachmentStore for AttachmentManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn put(&self, data: Bytes) -> AppResult<String> {
        self.inner.put(data).await
    }

    async fn get(&self, reference: &str) -> AppResult<Bytes> {
        self.inner.get(reference).await
    }

    async fn content_digest(&self, reference: &str) -> AppResult<Option<String>> {
        self.inner.content_digest(reference).await
    }

    async fn exists(&self, reference: &str) -> AppResult<bool> {
        self.inner.exists(reference).await
    }

    async fn delete(&self, reference: &str) -> AppResult<()> {
        self.inner.delete(reference).await
    }
}
