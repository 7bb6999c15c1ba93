//! Event domain entities.

pub mod format;
pub mod model;
pub mod patch;

pub use format::TextFormat;
pub use model::{AttachmentRef, Event, EventBody, EventContent, FieldRef, MediaBody, MessageBody};
pub use patch::EventPatch;
