//! Index document construction.

use eventsync_core::types::IndexDocument;
use eventsync_entity::{Event, FieldKind, FieldRef, VariantRegistry};

/// Build the full index document for an event from the registry's field mapping.
///
/// Absent values are omitted. The document id is the stringified store id.
pub fn build_document(event: &Event) -> IndexDocument {
    let kind = event.kind();
    let spec = VariantRegistry::global().spec(kind);
    let mut document = IndexDocument::new(event.id.index_key(), kind.as_str());

    for field in spec.indexed_fields {
        match (field.kind, event.content.field(field.name)) {
            (FieldKind::Text, Some(FieldRef::Text(text))) => {
                document = document.with_text(field.name, text);
            }
            (FieldKind::Time, Some(FieldRef::Time(at))) => {
                document = document.with_time(field.name, at);
            }
            _ => {}
        }
    }

    document
}
