//! Tag kind classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tag::model::Tag;

/// Classification of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Any tag that is not a source marker.
    Other,
    /// Marks where the event came from.
    Source,
}

impl TagKind {
    /// Stored integer code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Other => 1,
            Self::Source => 2,
        }
    }

    /// Classify a stored code. Anything other than the source code is `Other`.
    pub fn from_code(code: i32) -> Self {
        if code == Self::Source.code() {
            Self::Source
        } else {
            Self::Other
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a tag by its stored kind code.
pub fn kind_of(tag: &Tag) -> TagKind {
    TagKind::from_code(tag.kind_code)
}
