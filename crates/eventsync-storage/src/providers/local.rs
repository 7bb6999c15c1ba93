//! Local filesystem attachment store.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use eventsync_core::error::{AppError, ErrorKind};
use eventsync_core::result::AppResult;
use eventsync_core::traits::AttachmentStore;

use crate::digest::{is_content_address, sha256_hex};

/// Attachment store writing payloads under a root directory.
///
/// A payload with digest `abcdef…` lives at `{root}/ab/cd/abcdef…`.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    root: PathBuf,
}

impl LocalAttachmentStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create attachment root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Path for a reference, or `None` if it is not a content address.
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        if !is_content_address(reference) {
            return None;
        }
        Some(
            self.root
                .join(&reference[0..2])
                .join(&reference[2..4])
                .join(reference),
        )
    }

    fn not_found(reference: &str) -> AppError {
        AppError::not_found(format!("Attachment not found: {reference}"))
    }
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn put(&self, data: Bytes) -> AppResult<String> {
        let reference = sha256_hex(&data);
        let path = self
            .resolve(&reference)
            .ok_or_else(|| AppError::internal("Computed digest is not a content address"))?;

        if fs::try_exists(&path).await? {
            debug!(reference = %reference, "Attachment already stored");
            return Ok(reference);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file so readers never see a partial payload.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write attachment {reference}"), e)
        })?;
        fs::rename(&tmp, &path).await?;

        debug!(reference = %reference, bytes = data.len(), "Stored attachment");
        Ok(reference)
    }

    async fn get(&self, reference: &str) -> AppResult<Bytes> {
        let path = self.resolve(reference).ok_or_else(|| Self::not_found(reference))?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Self::not_found(reference)),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read attachment {reference}"),
                e,
            )),
        }
    }

    async fn content_digest(&self, reference: &str) -> AppResult<Option<String>> {
        let Some(path) = self.resolve(reference) else {
            return Ok(None);
        };
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut hasher = Sha256::new();
        let mut chunks = ReaderStream::new(file);
        while let Some(chunk) = chunks.next().await {
            hasher.update(&chunk?);
        }
        Ok(Some(hex::encode(hasher.finalize())))
    }

    async fn exists(&self, reference: &str) -> AppResult<bool> {
        match self.resolve(reference) {
            Some(path) => Ok(fs::try_exists(&path).await?),
            None => Ok(false),
        }
    }

    async fn delete(&self, reference: &str) -> AppResult<()> {
        let Some(path) = self.resolve(reference) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete attachment {reference}"),
                e,
            )),
        }
    }
}
