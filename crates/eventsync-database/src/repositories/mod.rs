//! Event repository boundary and its implementations.

pub mod event;
pub mod memory;

use std::fmt::Debug;

use async_trait::async_trait;

use eventsync_core::result::AppResult;
use eventsync_core::types::EventId;
use eventsync_entity::{Event, EventContent};

pub use event::PgEventRepository;
pub use memory::MemoryEventRepository;

/// Durable storage for events.
///
/// Implementations own the uniqueness constraint on `fingerprint`: the
/// check and the write happen as one atomic step, so two concurrent
/// inserts of the same fingerprint yield exactly one success and one
/// `DuplicateContent` error.
#[async_trait]
pub trait EventRepository: Send + Sync + Debug + 'static {
    /// Backend name, for logging.
    fn backend(&self) -> &str;

    /// Look up an event by id.
    async fn find_by_id(&self, id: EventId) -> AppResult<Option<Event>>;

    /// Look up the event holding a fingerprint.
    async fn find_by_fingerprint(&self, fingerprint: &str) -> AppResult<Option<Event>>;

    /// Persist new content, assigning id and timestamps.
    ///
    /// Fails with `DuplicateContent` if the fingerprint is already held.
    async fn insert(&self, fingerprint: String, content: EventContent) -> AppResult<Event>;

    /// Replace the content and fingerprint of an existing event.
    ///
    /// Fails with `NotFound` if the id is unknown and with
    /// `DuplicateContent` if another event holds the fingerprint.
    async fn update(
        &self,
        id: EventId,
        fingerprint: String,
        content: EventContent,
    ) -> AppResult<Event>;

    /// Remove an event. Fails with `NotFound` if the id is unknown.
    async fn delete(&self, id: EventId) -> AppResult<()>;

    /// Every stored id.
    async fn list_ids(&self) -> AppResult<Vec<EventId>>;

    /// Number of stored events.
    async fn count(&self) -> AppResult<u64>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
