//! Partial updates to event content.

use chrono::{DateTime, Utc};

use eventsync_core::{AppError, AppResult};

use crate::event::format::TextFormat;
use crate::event::model::{AttachmentRef, EventBody, EventContent};
use crate::tag::Tag;

/// A set of field changes to apply to an existing event.
///
/// Outer `None` leaves a field untouched. For optional fields the inner
/// value sets (`Some`) or clears (`None`) it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub authored_on: Option<DateTime<Utc>>,
    pub location: Option<Vec<String>>,
    pub original_uri: Option<Option<String>>,
    /// Replaces the whole tag list.
    pub tags: Option<Vec<Tag>>,
    /// Appended after any replacement.
    pub add_tags: Vec<Tag>,
    pub from: Option<Option<String>>,
    pub to: Option<Option<String>>,
    pub title: Option<Option<String>>,
    pub text: Option<Option<String>>,
    pub format: Option<TextFormat>,
    /// New attachment reference. Its digest is resolved by the store.
    pub attachment: Option<String>,
}

impl EventPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authoring timestamp.
    pub fn authored_on(mut self, at: DateTime<Utc>) -> Self {
        self.authored_on = Some(at);
        self
    }

    /// Replace the location path.
    pub fn location<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location = Some(segments.into_iter().map(Into::into).collect());
        self
    }

    /// Set or clear (`None`) the original URI.
    pub fn original_uri(mut self, uri: Option<&str>) -> Self {
        self.original_uri = Some(uri.map(str::to_string));
        self
    }

    /// Replace the whole tag list.
    pub fn replace_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Append a tag after any replacement.
    pub fn add_tag(mut self, tag: Tag) -> Self {
        self.add_tags.push(tag);
        self
    }

    /// Set or clear the sender.
    pub fn from(mut self, from: Option<&str>) -> Self {
        self.from = Some(from.map(str::to_string));
        self
    }

    /// Set or clear the recipient.
    pub fn to(mut self, to: Option<&str>) -> Self {
        self.to = Some(to.map(str::to_string));
        self
    }

    /// Set or clear the subject line.
    pub fn title(mut self, title: Option<&str>) -> Self {
        self.title = Some(title.map(str::to_string));
        self
    }

    /// Set or clear the text. Clearing it fails validation for messages.
    pub fn text(mut self, text: Option<&str>) -> Self {
        self.text = Some(text.map(str::to_string));
        self
    }

    /// Set the text format.
    pub fn format(mut self, format: TextFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Point a media event at a new attachment reference.
    pub fn attachment(mut self, reference: impl Into<String>) -> Self {
        self.attachment = Some(reference.into());
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch and return the names of fields whose value changed.
    ///
    /// Fails without touching `content` when the patch names a field the
    /// content's variant does not have. A replaced attachment reports both
    /// `attachment` and `attachment_digest`, since the digest is cleared
    /// until the store resolves the new reference.
    pub fn apply(&self, content: &mut EventContent) -> AppResult<Vec<&'static str>> {
        let mut next = content.clone();
        let mut changed = Vec::new();

        set(&mut next.authored_on, self.authored_on.map(Some), "authored_on", &mut changed);
        set(&mut next.location, self.location.clone(), "location", &mut changed);
        set(&mut next.original_uri, self.original_uri.clone(), "original_uri", &mut changed);
        if let Some(tags) = &self.tags {
            set(&mut next.tags, Some(tags.clone()), "tags", &mut changed);
        }
        if !self.add_tags.is_empty() {
            next.annotate(self.add_tags.iter().cloned());
            if !changed.contains(&"tags") {
                changed.push("tags");
            }
        }

        let kind = next.kind();
        match &mut next.body {
            EventBody::Message(m) => {
                set(&mut m.from, self.from.clone(), "from", &mut changed);
                set(&mut m.to, self.to.clone(), "to", &mut changed);
                set(&mut m.title, self.title.clone(), "title", &mut changed);
                set(&mut m.text, self.text.clone(), "text", &mut changed);
                set(&mut m.format, self.format.map(Some), "format", &mut changed);
                reject(kind, "attachment", self.attachment.is_some())?;
            }
            EventBody::Media(m) => {
                reject(kind, "from", self.from.is_some())?;
                reject(kind, "to", self.to.is_some())?;
                reject(kind, "title", self.title.is_some())?;
                set(&mut m.text, self.text.clone(), "text", &mut changed);
                set(&mut m.format, self.format.map(Some), "format", &mut changed);
                if let Some(reference) = &self.attachment {
                    let same = m.attachment.as_ref().is_some_and(|a| &a.reference == reference);
                    if !same {
                        m.attachment = Some(AttachmentRef::new(reference.clone()));
                        changed.push("attachment");
                        changed.push("attachment_digest");
                    }
                }
            }
            EventBody::Generic => {
                reject(kind, "from", self.from.is_some())?;
                reject(kind, "to", self.to.is_some())?;
                reject(kind, "title", self.title.is_some())?;
                reject(kind, "text", self.text.is_some())?;
                reject(kind, "format", self.format.is_some())?;
                reject(kind, "attachment", self.attachment.is_some())?;
            }
        }

        *content = next;
        Ok(changed)
    }
}

fn set<T: PartialEq>(
    slot: &mut T,
    value: Option<T>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            changed.push(name);
        }
    }
}

fn reject(kind: crate::variant::EventKind, field: &str, present: bool) -> AppResult<()> {
    if present {
        Err(AppError::validation(format!(
            "field `{field}` does not apply to {kind} events"
        )))
    } else {
        Ok(())
    }
}
