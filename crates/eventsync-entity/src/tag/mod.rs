//! Tag annotations embedded in events.

pub mod kind;
pub mod model;

pub use kind::{TagKind, kind_of};
pub use model::Tag;
