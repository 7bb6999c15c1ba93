//! Static per-variant rules.
//!
//! The registry is the single place that knows, for each [`EventKind`],
//! which fields feed the fingerprint, which fields are indexed and which
//! fields are required. Supporting a new variant means adding one
//! [`VariantSpec`] entry here plus its body type.

use eventsync_core::{AppError, AppResult};

use crate::event::{EventContent, FieldRef};
use crate::variant::kind::EventKind;

/// Index type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Tokenized full text.
    Text,
    /// Point in time.
    Time,
}

/// One field mapped into the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedField {
    /// Field name, as understood by [`EventContent::field`].
    pub name: &'static str,
    /// How the field is indexed.
    pub kind: FieldKind,
}

impl IndexedField {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }

    const fn time(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Time,
        }
    }
}

/// Rules for one variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantSpec {
    /// The variant these rules apply to.
    pub kind: EventKind,
    /// Ordered fields concatenated into the fingerprint. `None` means the
    /// variant cannot be fingerprinted and so cannot be stored.
    pub fingerprint_fields: Option<&'static [&'static str]>,
    /// Fields copied into the index document.
    pub indexed_fields: &'static [IndexedField],
    /// Fields that must be present (and non-blank) before persisting.
    pub required_fields: &'static [&'static str],
}

impl VariantSpec {
    /// Whether changing `field` changes the fingerprint.
    pub fn is_content_field(&self, field: &str) -> bool {
        self.fingerprint_fields
            .is_some_and(|fields| fields.contains(&field))
    }

    /// Required fields that are absent or blank in `content`.
    pub fn missing_fields(&self, content: &EventContent) -> Vec<&'static str> {
        self.required_fields
            .iter()
            .copied()
            .filter(|name| !is_present(content.field(name)))
            .collect()
    }

    /// Reject content with missing required fields.
    pub fn validate(&self, content: &EventContent) -> AppResult<()> {
        if content.kind() != self.kind {
            return Err(AppError::internal(format!(
                "{} rules applied to {} content",
                self.kind,
                content.kind()
            )));
        }

        let missing = self.missing_fields(content);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "{} is missing required fields: {}",
                self.kind,
                missing.join(", ")
            )))
        }
    }
}

fn is_present(field: Option<FieldRef<'_>>) -> bool {
    match field {
        None => false,
        Some(FieldRef::Text(s)) => !s.trim().is_empty(),
        Some(FieldRef::Attachment(a)) => a.is_resolved(),
        Some(FieldRef::Time(_)) | Some(FieldRef::Format(_)) => true,
    }
}

const BASE_INDEXED: [IndexedField; 2] = [
    IndexedField::time("authored_on"),
    IndexedField::text("original_uri"),
];

static SPECS: [VariantSpec; 3] = [
    VariantSpec {
        kind: EventKind::Generic,
        fingerprint_fields: None,
        indexed_fields: &BASE_INDEXED,
        required_fields: &["authored_on"],
    },
    VariantSpec {
        kind: EventKind::Message,
        fingerprint_fields: Some(&["from", "to", "text"]),
        indexed_fields: &[
            BASE_INDEXED[0],
            BASE_INDEXED[1],
            IndexedField::text("from"),
            IndexedField::text("to"),
            IndexedField::text("title"),
            IndexedField::text("text"),
        ],
        required_fields: &["authored_on", "text", "format"],
    },
    VariantSpec {
        kind: EventKind::Media,
        fingerprint_fields: Some(&["attachment_digest", "text"]),
        indexed_fields: &[BASE_INDEXED[0], BASE_INDEXED[1], IndexedField::text("text")],
        required_fields: &["authored_on", "attachment"],
    },
];

static REGISTRY: VariantRegistry = VariantRegistry { specs: &SPECS };

/// Read-only table of [`VariantSpec`]s.
#[derive(Debug)]
pub struct VariantRegistry {
    specs: &'static [VariantSpec],
}

impl VariantRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static VariantRegistry {
        &REGISTRY
    }

    /// Rules for a variant.
    pub fn spec(&self, kind: EventKind) -> &VariantSpec {
        // Every EventKind has exactly one entry, in declaration order.
        &self.specs[kind as usize]
    }

    /// All registered variants.
    pub fn specs(&self) -> &[VariantSpec] {
        self.specs
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::event::{MediaBody, MessageBody, TextFormat};

    #[test]
    fn test_every_kind_registered_in_order() {
        let registry = VariantRegistry::global();
        assert_eq!(registry.specs().len(), EventKind::ALL.len());
        for kind in EventKind::ALL {
            assert_eq!(registry.spec(kind).kind, kind);
        }
    }

    #[test]
    fn test_content_fields() {
        let message = VariantRegistry::global().spec(EventKind::Message);
        assert!(message.is_content_field("text"));
        assert!(message.is_content_field("from"));
        assert!(!message.is_content_field("title"));
        assert!(!message.is_content_field("format"));

        let generic = VariantRegistry::global().spec(EventKind::Generic);
        assert!(!generic.is_content_field("text"));
    }

    #[test]
    fn test_blank_text_is_missing() {
        let content =
            EventContent::message(MessageBody::new("   ", TextFormat::PlainText)).authored_on(Utc::now());
        let spec = VariantRegistry::global().spec(EventKind::Message);
        assert_eq!(spec.missing_fields(&content), vec!["text"]);
        assert!(spec.validate(&content).is_err());
    }

    #[test]
    fn test_media_requires_resolved_attachment() {
        let spec = VariantRegistry::global().spec(EventKind::Media);
        let mut content = EventContent::media(MediaBody::new("ref")).authored_on(Utc::now());
        assert_eq!(spec.missing_fields(&content), vec!["attachment"]);

        if let Some(attachment) = content.attachment_mut() {
            attachment.content_digest = Some("d".into());
        }
        assert!(spec.validate(&content).is_ok());
    }

    #[test]
    fn test_missing_authored_on() {
        let content = EventContent::message(MessageBody::new("hi", TextFormat::Html));
        let err = VariantRegistry::global()
            .spec(EventKind::Message)
            .validate(&content)
            .unwrap_err();
        assert!(err.message.contains("authored_on"));
    }
}
