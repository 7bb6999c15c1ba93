//! Mapping between index documents and Solr's JSON document shape.
//!
//! Fields use Solr's dynamic field suffixes so no managed schema is
//! required: text fields become `{name}_t`, time fields `{name}_dt`, and
//! the variant name is stored in `type_s`.

use serde_json::{Map, Value};

use eventsync_core::types::{FieldValue, IndexDocument};

/// Render a document as a Solr JSON object.
pub fn to_solr(document: &IndexDocument) -> Value {
    let mut fields = Map::new();
    fields.insert("id".into(), Value::String(document.id.clone()));
    fields.insert("type_s".into(), Value::String(document.doc_type.clone()));

    for (name, value) in &document.fields {
        match value {
            FieldValue::Text(text) => {
                fields.insert(format!("{name}_t"), Value::String(text.clone()));
            }
            FieldValue::Time(at) => {
                fields.insert(
                    format!("{name}_dt"),
                    Value::String(at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
                );
            }
        }
    }

    Value::Object(fields)
}

/// Pull document ids out of a select response.
pub fn ids_from_response(body: &Value) -> Vec<String> {
    body.pointer("/response/docs")
        .and_then(Value::as_array)
        .map(|docs| {
            docs.iter()
                .filter_map(|d| d.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_suffixes() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let doc = IndexDocument::new("abc", "Message")
            .with_text("text", "hello")
            .with_time("authored_on", at);

        assert_eq!(
            to_solr(&doc),
            json!({
                "id": "abc",
                "type_s": "Message",
                "text_t": "hello",
                "authored_on_dt": "2024-05-01T12:00:00.000Z",
            })
        );
    }

    #[test]
    fn test_ids_from_response() {
        let body = json!({ "response": { "numFound": 2, "docs": [{ "id": "a" }, { "id": "b" }] } });
        assert_eq!(ids_from_response(&body), vec!["a", "b"]);
        assert!(ids_from_response(&json!({ "error": {} })).is_empty());
    }
}
