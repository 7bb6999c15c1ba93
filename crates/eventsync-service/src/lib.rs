//! # eventsync-service
//!
//! Orchestration layer for EventSync. [`EventStore`] runs every write
//! against the primary store first and then hands the result to the
//! [`IndexSynchronizer`], which propagates it into the search index.
//!
//! Services follow constructor injection: the repository, the index and
//! the attachment store are all passed in as `Arc<dyn Trait>`.

pub mod document;
pub mod error;
pub mod store;
pub mod sync;

pub use document::build_document;
pub use error::{EventStoreError, EventStoreResult};
pub use store::{EventStore, ResyncReport};
pub use sync::{IndexSynchronizer, SyncOperation, SyncStats};
