//! In-memory attachment store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use eventsync_core::error::AppError;
use eventsync_core::result::AppResult;
use eventsync_core::traits::AttachmentStore;

use crate::digest::sha256_hex;

/// Attachment store holding payloads in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttachmentStore {
    blobs: Arc<DashMap<String, Bytes>>,
}

impl MemoryAttachmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, data: Bytes) -> AppResult<String> {
        let reference = sha256_hex(&data);
        debug!(reference = %reference, bytes = data.len(), "Stored attachment");
        self.blobs.insert(reference.clone(), data);
        Ok(reference)
    }

    async fn get(&self, reference: &str) -> AppResult<Bytes> {
        self.blobs
            .get(reference)
            .map(|b| b.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Attachment not found: {reference}")))
    }

    async fn content_digest(&self, reference: &str) -> AppResult<Option<String>> {
        Ok(self.blobs.get(reference).map(|b| sha256_hex(b.value())))
    }

    async fn exists(&self, reference: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(reference))
    }

    async fn delete(&self, reference: &str) -> AppResult<()> {
        self.blobs.remove(reference);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_is_content_addressed() {
        let store = MemoryAttachmentStore::new();
        let a = store.put(Bytes::from_static(b"payload")).await.unwrap();
        let b = store.put(Bytes::from_static(b"payload")).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.content_digest(&a).await.unwrap(), Some(a.clone()));
        assert_eq!(store.get(&a).await.unwrap(), Bytes::from_static(b"payload"));
    }

    #[tokio::test]
    async fn test_unknown_reference() {
        let store = MemoryAttachmentStore::new();
        assert_eq!(store.content_digest("nope").await.unwrap(), None);
        assert!(!store.exists("nope").await.unwrap());
        assert!(store.get("nope").await.is_err());
        store.delete("nope").await.unwrap();
    }
}
