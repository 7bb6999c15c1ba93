//! Caller-facing error taxonomy for event store operations.

use thiserror::Error;

use eventsync_core::error::{AppError, ErrorKind};
use eventsync_core::types::EventId;

use crate::sync::SyncOperation;

/// Errors returned by [`EventStore`](crate::EventStore).
///
/// Everything except [`IndexSyncFailed`](Self::IndexSyncFailed) means the
/// store was left unchanged. `IndexSyncFailed` means the store mutation
/// succeeded and only the index lags behind; the synchronizer retries it.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// A required field is missing or malformed. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Another stored event already has this fingerprint.
    #[error("duplicate content: fingerprint {fingerprint} is already stored")]
    DuplicateContent {
        /// The colliding fingerprint.
        fingerprint: String,
        /// Id of the event holding it, when known.
        existing: Option<EventId>,
    },

    /// No event with this id.
    #[error("event {0} not found")]
    NotFound(EventId),

    /// The store mutation succeeded but index propagation did not.
    #[error("event {event_id} was stored but index {operation} failed: {source}")]
    IndexSyncFailed {
        /// The stored event.
        event_id: EventId,
        /// Which propagation failed.
        operation: SyncOperation,
        /// Underlying index error.
        #[source]
        source: AppError,
    },

    /// The primary store or attachment store failed.
    #[error(transparent)]
    Store(AppError),
}

impl EventStoreError {
    /// Whether this is a warning-level outcome rather than a failed write.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::IndexSyncFailed { .. })
    }

    /// Whether the same call may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.kind.is_transient(),
            Self::IndexSyncFailed { .. } => true,
            _ => false,
        }
    }

    /// The matching [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateContent { .. } => ErrorKind::DuplicateContent,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::IndexSyncFailed { .. } => ErrorKind::IndexSync,
            Self::Store(e) => e.kind,
        }
    }

    /// The id of the event the store kept, for `IndexSyncFailed`.
    pub fn stored_event_id(&self) -> Option<EventId> {
        match self {
            Self::IndexSyncFailed { event_id, .. } => Some(*event_id),
            _ => None,
        }
    }
}

impl From<AppError> for EventStoreError {
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Validation => Self::Validation(err.message),
            _ => Self::Store(err),
        }
    }
}

/// Result alias for event store operations.
pub type EventStoreResult<T> = Result<T, EventStoreError>;
