//! Core type definitions used across the EventSync workspace.

pub mod document;
pub mod id;

pub use document::{FieldValue, IndexDocument};
pub use id::EventId;
