//! Event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsync_core::types::EventId;

use crate::event::format::TextFormat;
use crate::tag::Tag;
use crate::variant::EventKind;

/// Reference to an externally stored attachment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Reference key understood by the attachment store.
    pub reference: String,
    /// SHA-256 digest of the payload, filled in once the reference is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
}

impl AttachmentRef {
    /// Create an unresolved attachment reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            content_digest: None,
        }
    }

    /// Whether the reference has been resolved to a content digest.
    pub fn is_resolved(&self) -> bool {
        self.content_digest.is_some()
    }
}

/// Fields of a message event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Sender.
    #[serde(default)]
    pub from: Option<String>,
    /// Recipient.
    #[serde(default)]
    pub to: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub title: Option<String>,
    /// Message text. Required.
    #[serde(default)]
    pub text: Option<String>,
    /// Markup format of `text`. Required.
    #[serde(default)]
    pub format: Option<TextFormat>,
}

impl MessageBody {
    /// Create a message body with its required fields.
    pub fn new(text: impl Into<String>, format: TextFormat) -> Self {
        Self {
            text: Some(text.into()),
            format: Some(format),
            ..Self::default()
        }
    }

    /// Set the sender.
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the recipient.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Set the subject line.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Fields of a media event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBody {
    /// Optional caption.
    #[serde(default)]
    pub text: Option<String>,
    /// Markup format of `text`.
    #[serde(default)]
    pub format: Option<TextFormat>,
    /// The attachment payload reference. Required.
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
}

impl MediaBody {
    /// Create a media body pointing at an attachment reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            attachment: Some(AttachmentRef::new(reference)),
            ..Self::default()
        }
    }

    /// Set the caption and its format.
    pub fn caption(mut self, text: impl Into<String>, format: TextFormat) -> Self {
        self.text = Some(text.into());
        self.format = Some(format);
        self
    }
}

/// Variant-specific part of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventBody {
    /// Base record with no variant fields. Has no fingerprint formula.
    Generic,
    /// A message between two parties.
    Message(MessageBody),
    /// A media attachment with an optional caption.
    Media(MediaBody),
}

impl EventBody {
    /// The variant discriminant.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Generic => EventKind::Generic,
            Self::Message(_) => EventKind::Message,
            Self::Media(_) => EventKind::Media,
        }
    }
}

/// A borrowed view of one named event field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    /// A string field.
    Text(&'a str),
    /// A timestamp field.
    Time(DateTime<Utc>),
    /// A text format field.
    Format(TextFormat),
    /// An attachment reference field.
    Attachment(&'a AttachmentRef),
}

impl<'a> FieldRef<'a> {
    /// The string content of a text field.
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Everything about an event that the caller supplies.
///
/// This is the unit that gets fingerprinted and validated. The store adds
/// identity and bookkeeping timestamps to produce an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContent {
    /// When the event was authored. Required.
    #[serde(default)]
    pub authored_on: Option<DateTime<Utc>>,
    /// Ordered location path or coordinates.
    #[serde(default)]
    pub location: Vec<String>,
    /// Where the event was originally obtained.
    #[serde(default)]
    pub original_uri: Option<String>,
    /// Embedded annotations, in insertion order.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Variant-specific fields.
    pub body: EventBody,
}

impl EventContent {
    /// Create content with the given body and no common fields set.
    pub fn new(body: EventBody) -> Self {
        Self {
            authored_on: None,
            location: Vec::new(),
            original_uri: None,
            tags: Vec::new(),
            body,
        }
    }

    /// Create message content.
    pub fn message(body: MessageBody) -> Self {
        Self::new(EventBody::Message(body))
    }

    /// Create media content.
    pub fn media(body: MediaBody) -> Self {
        Self::new(EventBody::Media(body))
    }

    /// Create generic content.
    pub fn generic() -> Self {
        Self::new(EventBody::Generic)
    }

    /// Set the authoring timestamp.
    pub fn authored_on(mut self, at: DateTime<Utc>) -> Self {
        self.authored_on = Some(at);
        self
    }

    /// Set the location path.
    pub fn at_location<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Set the original URI.
    pub fn with_original_uri(mut self, uri: impl Into<String>) -> Self {
        self.original_uri = Some(uri.into());
        self
    }

    /// Append a tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// The variant discriminant.
    pub fn kind(&self) -> EventKind {
        self.body.kind()
    }

    /// The attachment reference, for media content.
    pub fn attachment(&self) -> Option<&AttachmentRef> {
        match &self.body {
            EventBody::Media(media) => media.attachment.as_ref(),
            _ => None,
        }
    }

    /// Mutable access to the attachment reference, for media content.
    pub fn attachment_mut(&mut self) -> Option<&mut AttachmentRef> {
        match &mut self.body {
            EventBody::Media(media) => media.attachment.as_mut(),
            _ => None,
        }
    }

    /// Look up a field by its registry name.
    ///
    /// Returns `None` both for absent values and for names that do not
    /// apply to this variant.
    pub fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "authored_on" => return self.authored_on.map(FieldRef::Time),
            "original_uri" => return self.original_uri.as_deref().map(FieldRef::Text),
            _ => {}
        }

        match (&self.body, name) {
            (EventBody::Message(m), "from") => m.from.as_deref().map(FieldRef::Text),
            (EventBody::Message(m), "to") => m.to.as_deref().map(FieldRef::Text),
            (EventBody::Message(m), "title") => m.title.as_deref().map(FieldRef::Text),
            (EventBody::Message(m), "text") => m.text.as_deref().map(FieldRef::Text),
            (EventBody::Message(m), "format") => m.format.map(FieldRef::Format),
            (EventBody::Media(m), "text") => m.text.as_deref().map(FieldRef::Text),
            (EventBody::Media(m), "format") => m.format.map(FieldRef::Format),
            (EventBody::Media(m), "attachment") => m.attachment.as_ref().map(FieldRef::Attachment),
            (EventBody::Media(m), "attachment_digest") => m
                .attachment
                .as_ref()
                .and_then(|a| a.content_digest.as_deref())
                .map(FieldRef::Text),
            _ => None,
        }
    }
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// Content fingerprint; unique across all stored events.
    pub fingerprint: String,
    /// Caller-supplied content.
    #[serde(flatten)]
    pub content: EventContent,
    /// When the record was first persisted.
    pub created_at: DateTime<Utc>,
    /// When the record was last persisted.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Build a freshly persisted event.
    pub fn new(id: EventId, fingerprint: String, content: EventContent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            fingerprint,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// The variant discriminant.
    pub fn kind(&self) -> EventKind {
        self.content.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagKind;

    #[test]
    fn test_message_fields() {
        let content = EventContent::message(MessageBody::new("hi", TextFormat::Markdown).from("a"));
        assert_eq!(content.kind(), EventKind::Message);
        assert_eq!(content.field("from"), Some(FieldRef::Text("a")));
        assert_eq!(content.field("to"), None);
        assert_eq!(content.field("format"), Some(FieldRef::Format(TextFormat::Markdown)));
        assert_eq!(content.field("attachment"), None);
    }

    #[test]
    fn test_media_digest_field_requires_resolution() {
        let mut content = EventContent::media(MediaBody::new("ref-1"));
        assert_eq!(content.field("attachment_digest"), None);

        if let Some(attachment) = content.attachment_mut() {
            attachment.content_digest = Some("abc".to_string());
        }
        assert_eq!(content.field("attachment_digest"), Some(FieldRef::Text("abc")));
        assert_eq!(content.field("from"), None);
    }

    #[test]
    fn test_event_json_shape() {
        let content = EventContent::message(MessageBody::new("hi", TextFormat::PlainText))
            .with_tag(Tag::new("inbox", TagKind::Source));
        let event = Event::new(EventId::new(), "fp".to_string(), content, Utc::now());
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["body"]["kind"], "Message");
        assert_eq!(json["body"]["format"], 1);
        assert_eq!(json["tags"][0]["kind"], 2);

        let back: Event = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn test_invalid_format_code_rejected_on_decode() {
        let json = serde_json::json!({ "kind": "Message", "text": "hi", "format": 9 });
        assert!(serde_json::from_value::<EventBody>(json).is_err());
    }
}
