//! Search manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use eventsync_core::config::SearchConfig;
use eventsync_core::error::AppError;
use eventsync_core::result::AppResult;
use eventsync_core::traits::SearchIndex;
use eventsync_core::types::IndexDocument;

/// Wraps the configured [`SearchIndex`] backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct SearchManager {
    inner: Arc<dyn SearchIndex>,
}

impl SearchManager {
    /// Create a new search manager from configuration.
    pub fn new(config: &SearchConfig) -> AppResult<Self> {
        let inner: Arc<dyn SearchIndex> = match config.provider.as_str() {
            #[cfg(feature = "solr")]
            "solr" => {
                info!("Initializing Solr search index");
                Arc::new(crate::solr::SolrSearchIndex::new(&config.solr)?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory search index");
                Arc::new(crate::memory::MemorySearchIndex::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown search provider: '{other}'. Supported: memory, solr"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a search manager around an existing backend (for testing).
    pub fn from_index(index: Arc<dyn SearchIndex>) -> Self {
        Self { inner: index }
    }

    /// The wrapped backend.
    pub fn index(&self) -> Arc<dyn SearchIndex> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl SearchIndex for SearchManager {
    fn backend(&self) -> &str {
        self.inner.backend()
    }

    async fn upsert(&self, document: IndexDocument) -> AppResult<()> {
        self.inner.upsert(document).await
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        self.inner.remove(id).await
    }

    async fn commit(&self) -> AppResult<()> {
        self.inner.commit().await
    }

    async fn query(&self, query: &str, limit: usize) -> AppResult<Vec<String>> {
        self.inner.query(query, limit).await
    }

    async fn list_ids(&self) -> AppResult<Vec<String>> {
        self.inner.list_ids().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
