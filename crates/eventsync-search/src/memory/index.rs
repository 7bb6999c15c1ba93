//! Inverted index with staged writes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use eventsync_core::result::AppResult;
use eventsync_core::traits::SearchIndex;
use eventsync_core::types::IndexDocument;

use super::tokenize::tokenize;

/// A write waiting for the next commit. Only the latest per id is kept.
#[derive(Debug, Clone)]
enum Staged {
    Upsert(IndexDocument),
    Remove,
}

#[derive(Debug, Default)]
struct IndexState {
    /// id → committed document.
    documents: HashMap<String, IndexDocument>,
    /// token → ids of committed documents containing it.
    inverted: HashMap<String, BTreeSet<String>>,
    /// Writes not yet visible to queries.
    staged: BTreeMap<String, Staged>,
}

impl IndexState {
    fn index(&mut self, doc: IndexDocument) {
        self.unindex(&doc.id);
        for token in doc_tokens(&doc) {
            self.inverted.entry(token).or_default().insert(doc.id.clone());
        }
        self.documents.insert(doc.id.clone(), doc);
    }

    fn unindex(&mut self, id: &str) {
        let Some(old) = self.documents.remove(id) else {
            return;
        };
        for token in doc_tokens(&old) {
            if let Some(ids) = self.inverted.get_mut(&token) {
                ids.remove(id);
                if ids.is_empty() {
                    self.inverted.remove(&token);
                }
            }
        }
    }
}

fn doc_tokens(doc: &IndexDocument) -> BTreeSet<String> {
    doc.text_values()
        .flat_map(tokenize)
        .chain(tokenize(&doc.doc_type))
        .collect()
}

/// In-process full-text index.
///
/// Upserts and removals are staged and applied on [`SearchIndex::commit`],
/// mirroring how an external index only exposes committed segments.
#[derive(Debug, Clone, Default)]
pub struct MemorySearchIndex {
    state: Arc<RwLock<IndexState>>,
}

impl MemorySearchIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged writes awaiting commit.
    pub async fn staged_count(&self) -> usize {
        self.state.read().await.staged.len()
    }

    /// The committed document stored under `id`.
    pub async fn document(&self, id: &str) -> Option<IndexDocument> {
        self.state.read().await.documents.get(id).cloned()
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn upsert(&self, document: IndexDocument) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .staged
            .insert(document.id.clone(), Staged::Upsert(document));
        Ok(())
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.staged.insert(id.to_string(), Staged::Remove);
        Ok(())
    }

    async fn commit(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        let staged = std::mem::take(&mut state.staged);
        let applied = staged.len();

        for (id, write) in staged {
            match write {
                Staged::Upsert(doc) => state.index(doc),
                Staged::Remove => state.unindex(&id),
            }
        }

        debug!(applied, documents = state.documents.len(), "Memory index committed");
        Ok(())
    }

    async fn query(&self, query: &str, limit: usize) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let tokens = tokenize(query);

        if tokens.is_empty() {
            let mut ids: Vec<String> = state.documents.keys().cloned().collect();
            ids.sort();
            ids.truncate(limit);
            return Ok(ids);
        }

        // Every token must match.
        let mut matches: Option<BTreeSet<String>> = None;
        for token in &tokens {
            let ids = state.inverted.get(token).cloned().unwrap_or_default();
            matches = Some(match matches {
                None => ids,
                Some(acc) => acc.intersection(&ids).cloned().collect(),
            });
        }

        Ok(matches
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn list_ids(&self) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let mut ids: Vec<String> = state.documents.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> IndexDocument {
        IndexDocument::new(id, "Message").with_text("text", text)
    }

    #[tokio::test]
    async fn test_writes_visible_after_commit() {
        let index = MemorySearchIndex::new();
        index.upsert(doc("1", "hello world")).await.unwrap();

        assert!(index.query("hello", 10).await.unwrap().is_empty());
        assert_eq!(index.staged_count().await, 1);

        index.commit().await.unwrap();
        assert_eq!(index.query("hello", 10).await.unwrap(), vec!["1"]);
        assert_eq!(index.staged_count().await, 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_tokens() {
        let index = MemorySearchIndex::new();
        index.upsert(doc("1", "old words")).await.unwrap();
        index.commit().await.unwrap();
        index.upsert(doc("1", "new words")).await.unwrap();
        index.commit().await.unwrap();

        assert!(index.query("old", 10).await.unwrap().is_empty());
        assert_eq!(index.query("new", 10).await.unwrap(), vec!["1"]);
        assert_eq!(index.list_ids().await.unwrap(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_remove_and_latest_staged_write_wins() {
        let index = MemorySearchIndex::new();
        index.upsert(doc("1", "alpha")).await.unwrap();
        index.remove("1").await.unwrap();
        index.commit().await.unwrap();
        assert!(index.list_ids().await.unwrap().is_empty());

        index.remove("1").await.unwrap();
        index.upsert(doc("1", "beta")).await.unwrap();
        index.commit().await.unwrap();
        assert_eq!(index.query("beta", 10).await.unwrap(), vec!["1"]);

        index.remove("missing").await.unwrap();
        index.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_query_requires_all_tokens() {
        let index = MemorySearchIndex::new();
        index.upsert(doc("1", "red apple")).await.unwrap();
        index.upsert(doc("2", "green apple")).await.unwrap();
        index.commit().await.unwrap();

        assert_eq!(index.query("apple", 10).await.unwrap(), vec!["1", "2"]);
        assert_eq!(index.query("Red APPLE", 10).await.unwrap(), vec!["1"]);
        assert_eq!(index.query("apple", 1).await.unwrap(), vec!["1"]);
        assert_eq!(index.query("message", 10).await.unwrap().len(), 2);
        assert!(index.query("pear", 10).await.unwrap().is_empty());
    }
}
