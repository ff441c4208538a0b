use std::fmt;

use bson::{Bson, Document};

/// Where in a reply document an error was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyErrorKind {
    // "$err", set alongside the QueryFailure response flag
    QueryFailure,
    // top-level "errmsg"
    ErrMsg,
    // one element of the "writeErrors" array
    WriteError,
    // "writeConcernError"
    WriteConcernError,
}

impl ReplyErrorKind {
    pub fn field_name(self) -> &'static str {
        match self {
            ReplyErrorKind::QueryFailure => "$err",
            ReplyErrorKind::ErrMsg => "errmsg",
            ReplyErrorKind::WriteError => "writeErrors",
            ReplyErrorKind::WriteConcernError => "writeConcernError",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplyError {
    pub kind: ReplyErrorKind,
    pub message: String,
    pub code: Option<i32>,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind.field_name(), self.message)?;
        if let Some(code) = self.code {
            write!(f, " (code {})", code)?;
        }
        Ok(())
    }
}

/// Collects every error a server reply document reports, in field order of
/// the convention: `$err`, `errmsg`, `writeErrors`, `writeConcernError`.
pub fn extract_errors_from_document(document: &Document) -> Vec<ReplyError> {
    let mut errors = Vec::new();
    let top_level_code = document.get("code").and_then(bson_to_code);

    if let Some(value) = document.get("$err") {
        errors.push(ReplyError {
            kind: ReplyErrorKind::QueryFailure,
            message: bson_to_message(value),
            code: top_level_code,
        });
    }
    if let Some(value) = document.get("errmsg") {
        errors.push(ReplyError {
            kind: ReplyErrorKind::ErrMsg,
            message: bson_to_message(value),
            code: top_level_code,
        });
    }
    if let Some(Bson::Array(write_errors)) = document.get("writeErrors") {
        for write_error in write_errors {
            errors.push(nested_error(ReplyErrorKind::WriteError, write_error));
        }
    }
    if let Some(value) = document.get("writeConcernError") {
        errors.push(nested_error(ReplyErrorKind::WriteConcernError, value));
    }
    errors
}

fn nested_error(kind: ReplyErrorKind, value: &Bson) -> ReplyError {
    match value {
        Bson::Document(inner) => ReplyError {
            kind,
            message: inner
                .get("errmsg")
                .map(bson_to_message)
                .unwrap_or_else(|| inner.to_string()),
            code: inner.get("code").and_then(bson_to_code),
        },
        other => ReplyError {
            kind,
            message: bson_to_message(other),
            code: None,
        },
    }
}

fn bson_to_message(value: &Bson) -> String {
    match value {
        Bson::String(message) => message.clone(),
        other => other.to_string(),
    }
}

fn bson_to_code(value: &Bson) -> Option<i32> {
    match *value {
        Bson::I32(code) => Some(code),
        Bson::I64(code) if code >= i32::min_value() as i64 && code <= i32::max_value() as i64 => {
            Some(code as i32)
        }
        Bson::FloatingPoint(code)
            if code.fract() == 0.0 && code.abs() <= i32::max_value() as f64 =>
        {
            Some(code as i32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod reply_errors_tests {
    use bson::{bson, doc, Bson};

    use crate::mongo::reply_errors::{extract_errors_from_document, ReplyError, ReplyErrorKind};

    #[test]
    fn test_no_errors() {
        assert!(extract_errors_from_document(&doc! { "x": 1 }).is_empty());
        assert!(extract_errors_from_document(&doc! { "ok": 1.0, "n": 3 }).is_empty());
    }

    #[test]
    fn test_query_failure() {
        let errors = extract_errors_from_document(&doc! { "$err": "boom", "code": 17 });
        assert_eq!(
            errors,
            vec![ReplyError {
                kind: ReplyErrorKind::QueryFailure,
                message: "boom".to_string(),
                code: Some(17),
            }]
        );
        assert_eq!(errors[0].to_string(), "$err: boom (code 17)");
    }

    #[test]
    fn test_errmsg_with_double_code() {
        let errors = extract_errors_from_document(&doc! {
            "ok": 0.0,
            "errmsg": "ns not found",
            "code": 26.0
        });
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ReplyErrorKind::ErrMsg);
        assert_eq!(errors[0].code, Some(26));
    }

    #[test]
    fn test_write_errors_and_concern() {
        let errors = extract_errors_from_document(&doc! {
            "ok": 1,
            "writeErrors": [
                { "index": 0, "code": 11000, "errmsg": "duplicate key" },
                { "index": 3, "code": 121 }
            ],
            "writeConcernError": { "code": 64, "errmsg": "waiting for replication timed out" }
        });
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].kind, ReplyErrorKind::WriteError);
        assert_eq!(errors[0].message, "duplicate key");
        assert_eq!(errors[0].code, Some(11000));
        // no errmsg: the element itself is the message
        assert_eq!(errors[1].code, Some(121));
        assert!(errors[1].message.contains("index"));
        assert_eq!(errors[2].kind, ReplyErrorKind::WriteConcernError);
        assert_eq!(errors[2].code, Some(64));
    }

    #[test]
    fn test_non_string_message() {
        let mut document = doc! { "$err": 42 };
        document.insert("code", Bson::I64(9));
        let errors = extract_errors_from_document(&document);
        assert_eq!(errors[0].message, "42");
        assert_eq!(errors[0].code, Some(9));
        assert_eq!(errors[0].to_string(), "$err: 42 (code 9)");
    }
}
