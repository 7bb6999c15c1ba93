//! Variant discriminant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which shape an event has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Abstract base record.
    Generic,
    /// A message between parties.
    Message,
    /// A media attachment.
    Media,
}

impl EventKind {
    /// All variants, in registry order.
    pub const ALL: [EventKind; 3] = [Self::Generic, Self::Message, Self::Media];

    /// Variant name as used in index documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::Message => "Message",
            Self::Media => "Media",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
