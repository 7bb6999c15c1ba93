//! Collaborator traits defined in `eventsync-core` and implemented by
//! the backend crates.

pub mod attachment;
pub mod search;

pub use attachment::AttachmentStore;
pub use search::SearchIndex;
