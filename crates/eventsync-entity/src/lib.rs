//! # eventsync-entity
//!
//! Domain model for EventSync. An event is exactly one of a closed set of
//! variants ([`EventKind`]); everything that differs per variant (which
//! fields feed the fingerprint, which are indexed, which are required)
//! lives in the [`VariantRegistry`] rather than in per-variant code.

pub mod event;
pub mod fingerprint;
pub mod tag;
pub mod variant;

pub use event::{
    AttachmentRef, Event, EventBody, EventContent, EventPatch, FieldRef, MediaBody, MessageBody,
    TextFormat,
};
pub use fingerprint::{content_digest, fingerprint};
pub use tag::{Tag, TagKind, kind_of};
pub use variant::{EventKind, FieldKind, IndexedField, VariantRegistry, VariantSpec};
