//! Attachment store trait for media payloads.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for binary attachment backends.
///
/// Events never hold attachment bytes; they hold the reference returned
/// by [`put`](AttachmentStore::put). The fingerprint of a media event is
/// derived from [`content_digest`](AttachmentStore::content_digest).
#[async_trait]
pub trait AttachmentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "memory", "local").
    fn provider_type(&self) -> &str;

    /// Store a payload and return its reference.
    async fn put(&self, data: Bytes) -> AppResult<String>;

    /// Read a payload back.
    async fn get(&self, reference: &str) -> AppResult<Bytes>;

    /// Return the SHA-256 hex digest of the referenced payload, or `None`
    /// if the reference does not resolve.
    async fn content_digest(&self, reference: &str) -> AppResult<Option<String>>;

    /// Check whether a reference resolves.
    async fn exists(&self, reference: &str) -> AppResult<bool>;

    /// Delete a payload.
    async fn delete(&self, reference: &str) -> AppResult<()>;
}
