//! Search index trait for pluggable full-text backends.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::document::IndexDocument;

/// Trait for full-text index backends (in-process or Solr).
///
/// Writes are staged by the backend and become visible to [`query`]
/// after [`commit`]. Upserts are keyed by [`IndexDocument::id`] and
/// replace any previous document under the same key, so submitting the
/// same document twice is harmless.
///
/// [`query`]: SearchIndex::query
/// [`commit`]: SearchIndex::commit
#[async_trait]
pub trait SearchIndex: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "memory", "solr").
    fn backend(&self) -> &str;

    /// Add or replace a document.
    async fn upsert(&self, document: IndexDocument) -> AppResult<()>;

    /// Remove the document stored under `id`. Removing an absent id is not an error.
    async fn remove(&self, id: &str) -> AppResult<()>;

    /// Make all staged writes visible to queries.
    async fn commit(&self) -> AppResult<()>;

    /// Return the ids of committed documents matching a free-text query.
    async fn query(&self, query: &str, limit: usize) -> AppResult<Vec<String>>;

    /// Return the ids of every committed document.
    async fn list_ids(&self) -> AppResult<Vec<String>>;

    /// Check that the index backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
