use bson::Bson;

use crate::mongo::error::MongoRenderError;
use crate::mongo::raw_document::RawDocument;

pub fn render_document(document: &RawDocument) -> Result<String, MongoRenderError> {
    let parsed = document.to_document().map_err(MongoRenderError::Document)?;
    Ok(serde_json::to_string(&parsed)?)
}

pub fn render_documents(documents: &[RawDocument]) -> Result<String, MongoRenderError> {
    let mut parsed = Vec::with_capacity(documents.len());
    for document in documents {
        let inner = document.to_document().map_err(MongoRenderError::Document)?;
        parsed.push(Bson::Document(inner));
    }
    Ok(serde_json::to_string(&parsed)?)
}

/// Cuts `data` to at most `max_chars` characters, marking the cut with "...".
pub fn abbreviate(data: &str, max_chars: usize) -> String {
    match data.char_indices().nth(max_chars) {
        None => data.to_string(),
        Some((cut, _)) => format!("{}...", &data[..cut]),
    }
}

#[cfg(test)]
mod render_tests {
    use bson::{bson, doc, Bson};
    use chrono::{TimeZone, Utc};

    use crate::mongo::raw_document::RawDocument;
    use crate::mongo::render::{abbreviate, render_document, render_documents};

    fn raw(document: bson::Document) -> RawDocument {
        RawDocument::from_document(&document).unwrap()
    }

    #[test]
    fn test_render_document() {
        let rendered = render_document(&raw(doc! { "ok": 1, "cursor": { "id": 42 } })).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["ok"], 1);
        assert_eq!(value["cursor"]["id"], 42);
    }

    #[test]
    fn test_render_documents() {
        let rendered = render_documents(&[raw(doc! { "x": 1 }), raw(doc! {})]).unwrap();
        assert_eq!(rendered, r#"[{"x":1},{}]"#);
        assert_eq!(render_documents(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_render_date_value() {
        let mut document = doc! { "op": "insert" };
        document.insert("at", Bson::UtcDatetime(Utc.timestamp(1_500_000_000, 0)));
        let rendered = render_document(&raw(document)).unwrap();
        assert!(rendered.starts_with(r#"{"op":"insert","at":"#));
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("hello", 10), "hello");
        assert_eq!(abbreviate("hello", 5), "hello");
        assert_eq!(abbreviate("hello world", 5), "hello...");
        assert_eq!(abbreviate("héllo", 2), "hé...");
        assert_eq!(abbreviate("abc", 0), "...");
    }
}
