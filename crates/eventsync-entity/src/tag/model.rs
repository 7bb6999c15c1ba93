//! Tag entity model.

use serde::{Deserialize, Serialize};

use crate::event::EventContent;
use crate::tag::kind::{TagKind, kind_of};

/// A location/name annotation embedded in an event.
///
/// Tags have no identity of their own; they are stored, updated and
/// removed together with the event that carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Ordered location path the tag applies to.
    #[serde(default)]
    pub location: Vec<String>,
    /// Tag name.
    pub name: String,
    /// Raw kind code as stored. See [`Tag::kind`].
    #[serde(rename = "kind")]
    pub kind_code: i32,
}

impl Tag {
    /// Create a tag with no location.
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self::with_code(name, kind.code())
    }

    /// Create a tag carrying an arbitrary stored kind code.
    pub fn with_code(name: impl Into<String>, kind_code: i32) -> Self {
        Self {
            location: Vec::new(),
            name: name.into(),
            kind_code,
        }
    }

    /// Set the location path.
    pub fn at<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Classification derived from the stored code.
    pub fn kind(&self) -> TagKind {
        kind_of(self)
    }
}

impl EventContent {
    /// Append tags in order, keeping any already present.
    pub fn annotate<I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = Tag>,
    {
        self.tags.extend(tags);
    }

    /// Tags classified as sources.
    pub fn source_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| t.kind() == TagKind::Source)
    }
}
