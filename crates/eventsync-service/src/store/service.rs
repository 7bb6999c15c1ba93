//! Create, update, delete and lookup of events.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use eventsync_core::config::SyncConfig;
use eventsync_core::error::{AppError, ErrorKind};
use eventsync_core::result::AppResult;
use eventsync_core::traits::AttachmentStore;
use eventsync_core::types::EventId;
use eventsync_database::EventRepository;
use eventsync_entity::fingerprint::fingerprint as compute_fingerprint;
use eventsync_entity::{Event, EventContent, EventPatch, VariantRegistry};

use crate::error::{EventStoreError, EventStoreResult};
use crate::sync::{IndexSynchronizer, SyncOperation};

/// What to propagate after a successful store mutation.
enum Propagation {
    Upsert(Event),
    Remove(EventId),
}

/// The single entry point for event writes.
///
/// Each write follows the same order: fingerprint, uniqueness check,
/// validation, store mutation, then index propagation. Store-layer
/// failures abort before the index is touched. Index failures leave the
/// store as written and surface as [`EventStoreError::IndexSyncFailed`].
#[derive(Debug, Clone)]
pub struct EventStore {
    repo: Arc<dyn EventRepository>,
    sync: Arc<IndexSynchronizer>,
    attachments: Arc<dyn AttachmentStore>,
    store_timeout: Duration,
}

impl EventStore {
    /// Creates a new event store.
    pub fn new(
        repo: Arc<dyn EventRepository>,
        sync: Arc<IndexSynchronizer>,
        attachments: Arc<dyn AttachmentStore>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            repo,
            sync,
            attachments,
            store_timeout: config.store_timeout(),
        }
    }

    /// The primary store.
    pub fn repository(&self) -> &Arc<dyn EventRepository> {
        &self.repo
    }

    /// The index synchronizer.
    pub fn synchronizer(&self) -> &Arc<IndexSynchronizer> {
        &self.sync
    }

    /// Persist a new event and propagate it to the index.
    pub async fn create(&self, mut content: EventContent) -> EventStoreResult<Event> {
        self.resolve_attachment(&mut content).await?;

        let fingerprint = compute_fingerprint(&content).ok_or_else(|| {
            EventStoreError::Validation(format!(
                "{} events have no fingerprint formula and cannot be stored",
                content.kind()
            ))
        })?;

        if let Some(existing) = self
            .bounded("find_by_fingerprint", self.repo.find_by_fingerprint(&fingerprint))
            .await?
        {
            debug!(fingerprint = %fingerprint, existing = %existing.id, "Duplicate content rejected");
            return Err(EventStoreError::DuplicateContent {
                fingerprint,
                existing: Some(existing.id),
            });
        }

        VariantRegistry::global()
            .spec(content.kind())
            .validate(&content)?;

        let event = match self
            .bounded("insert", self.repo.insert(fingerprint.clone(), content))
            .await
        {
            Ok(event) => event,
            Err(e) if e.is(ErrorKind::DuplicateContent) => {
                return Err(self.duplicate(fingerprint).await);
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            event_id = %event.id,
            fingerprint = %event.fingerprint,
            kind = %event.kind(),
            "Event created"
        );

        self.propagate(Propagation::Upsert(event.clone())).await?;
        Ok(event)
    }

    /// Apply `patch` to an existing event and propagate the new state.
    ///
    /// The fingerprint is recomputed only when a fingerprint field changed.
    /// A patch that changes nothing returns the stored event untouched.
    pub async fn update(&self, id: EventId, patch: &EventPatch) -> EventStoreResult<Event> {
        let current = self.find_by_id(id).await?;

        let mut content = current.content.clone();
        let changed = patch.apply(&mut content)?;
        if changed.is_empty() {
            debug!(event_id = %id, "Update changed nothing");
            return Ok(current);
        }
        if changed.contains(&"attachment") {
            self.resolve_attachment(&mut content).await?;
        }

        let spec = VariantRegistry::global().spec(content.kind());
        let content_changed = changed.iter().any(|f| spec.is_content_field(f));

        let fingerprint = if content_changed {
            let fingerprint = compute_fingerprint(&content).ok_or_else(|| {
                EventStoreError::Validation(format!(
                    "{} events have no fingerprint formula",
                    content.kind()
                ))
            })?;

            if fingerprint != current.fingerprint {
                if let Some(other) = self
                    .bounded("find_by_fingerprint", self.repo.find_by_fingerprint(&fingerprint))
                    .await?
                    .filter(|other| other.id != id)
                {
                    return Err(EventStoreError::DuplicateContent {
                        fingerprint,
                        existing: Some(other.id),
                    });
                }
            }
            fingerprint
        } else {
            current.fingerprint.clone()
        };

        spec.validate(&content)?;

        let event = match self
            .bounded("update", self.repo.update(id, fingerprint.clone(), content))
            .await
        {
            Ok(event) => event,
            Err(e) if e.is(ErrorKind::DuplicateContent) => {
                return Err(self.duplicate(fingerprint).await);
            }
            Err(e) if e.is(ErrorKind::NotFound) => return Err(EventStoreError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        info!(
            event_id = %id,
            fingerprint = %event.fingerprint,
            changed = ?changed,
            refingerprinted = content_changed,
            "Event updated"
        );

        self.propagate(Propagation::Upsert(event.clone())).await?;
        Ok(event)
    }

    /// Remove an event and propagate the removal.
    pub async fn delete(&self, id: EventId) -> EventStoreResult<()> {
        match self.bounded("delete", self.repo.delete(id)).await {
            Ok(()) => {}
            Err(e) if e.is(ErrorKind::NotFound) => return Err(EventStoreError::NotFound(id)),
            Err(e) => return Err(e.into()),
        }

        info!(event_id = %id, "Event deleted");
        self.propagate(Propagation::Remove(id)).await
    }

    /// Look up an event by id.
    pub async fn find_by_id(&self, id: EventId) -> EventStoreResult<Event> {
        self.bounded("find_by_id", self.repo.find_by_id(id))
            .await?
            .ok_or(EventStoreError::NotFound(id))
    }

    /// Look up the event holding a fingerprint.
    pub async fn find_by_fingerprint(&self, fingerprint: &str) -> EventStoreResult<Option<Event>> {
        Ok(self
            .bounded("find_by_fingerprint", self.repo.find_by_fingerprint(fingerprint))
            .await?)
    }

    /// Set the content digest of a media attachment from the attachment store.
    ///
    /// Any digest already on the reference is discarded; only the store
    /// decides what a reference points at. An unresolvable reference is
    /// left without a digest and validation rejects it afterwards.
    async fn resolve_attachment(&self, content: &mut EventContent) -> EventStoreResult<()> {
        let Some(attachment) = content.attachment_mut() else {
            return Ok(());
        };
        if let Some(supplied) = attachment.content_digest.take() {
            debug!(
                reference = %attachment.reference,
                supplied = %supplied,
                "Discarding caller-supplied digest"
            );
        }

        let digest = self
            .bounded(
                "content_digest",
                self.attachments.content_digest(&attachment.reference),
            )
            .await?;
        if digest.is_none() {
            debug!(reference = %attachment.reference, "Attachment reference does not resolve");
        }
        attachment.content_digest = digest;
        Ok(())
    }

    /// Build a `DuplicateContent` error after losing an insert race.
    async fn duplicate(&self, fingerprint: String) -> EventStoreError {
        let existing = self
            .bounded("find_by_fingerprint", self.repo.find_by_fingerprint(&fingerprint))
            .await
            .ok()
            .flatten()
            .map(|e| e.id);
        EventStoreError::DuplicateContent {
            fingerprint,
            existing,
        }
    }

    /// Bound a store call by the configured timeout.
    pub(crate) async fn bounded<T, F>(&self, what: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| {
                AppError::timeout(format!(
                    "store {what} exceeded {}ms",
                    self.store_timeout.as_millis()
                ))
            })?
    }

    /// Run index propagation on its own task.
    ///
    /// The caller only awaits the handle, so dropping the caller's future
    /// after the store commit does not cancel propagation.
    async fn propagate(&self, propagation: Propagation) -> EventStoreResult<()> {
        let (event_id, operation) = match &propagation {
            Propagation::Upsert(event) => (event.id, SyncOperation::Upsert),
            Propagation::Remove(id) => (*id, SyncOperation::Remove),
        };

        let sync = Arc::clone(&self.sync);
        let handle = tokio::spawn(async move {
            match propagation {
                Propagation::Upsert(event) => sync.on_create_or_update(&event).await,
                Propagation::Remove(id) => sync.on_delete(id).await,
            }
        });

        let source = match handle.await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e,
            Err(join) => {
                self.sync
                    .mark_pending(event_id, operation, &join.to_string());
                AppError::internal(format!("propagation task failed: {join}"))
            }
        };

        warn!(
            event_id = %event_id,
            %operation,
            error = %source,
            "Event stored but index is behind; queued for retry"
        );
        Err(EventStoreError::IndexSyncFailed {
            event_id,
            operation,
            source,
        })
    }
}
