//! Closed set of event variants and their per-variant rules.

pub mod kind;
pub mod registry;

pub use kind::EventKind;
pub use registry::{FieldKind, IndexedField, VariantRegistry, VariantSpec};
