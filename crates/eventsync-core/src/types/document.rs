//! Search index document shape.
//!
//! An [`IndexDocument`] always carries the complete current state of one
//! event. Backends treat every submission as a full replacement keyed by
//! [`IndexDocument::id`], never as a patch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single indexed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    /// Tokenized full-text value.
    Text(String),
    /// Point-in-time value, stored for range filtering.
    Time(DateTime<Utc>),
}

impl FieldValue {
    /// The text content of this value, if it is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Time(_) => None,
        }
    }
}

/// A document submitted to the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Stringified store id of the event.
    pub id: String,
    /// Variant name of the event (e.g. `"Message"`).
    pub doc_type: String,
    /// Indexed fields by name. Absent source values are simply omitted.
    pub fields: BTreeMap<String, FieldValue>,
}

impl IndexDocument {
    /// Create an empty document for the given id and variant.
    pub fn new(id: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a text field.
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FieldValue::Text(value.into()));
        self
    }

    /// Add a time field.
    pub fn with_time(mut self, name: impl Into<String>, value: DateTime<Utc>) -> Self {
        self.fields.insert(name.into(), FieldValue::Time(value));
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Iterate over all text values in field-name order.
    pub fn text_values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().filter_map(FieldValue::as_text)
    }
}
