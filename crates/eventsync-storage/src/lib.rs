//! # eventsync-storage
//!
//! Attachment stores for media events. Payloads are content-addressed:
//! the reference returned by `put` is the SHA-256 hex digest of the bytes,
//! so storing the same payload twice yields the same reference.

pub mod digest;
pub mod manager;
pub mod providers;

pub use manager::AttachmentManager;
