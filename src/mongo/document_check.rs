use std::io;

use bson::spec::{
    ELEMENT_TYPE_32BIT_INTEGER, ELEMENT_TYPE_64BIT_INTEGER, ELEMENT_TYPE_ARRAY,
    ELEMENT_TYPE_BINARY, ELEMENT_TYPE_BOOLEAN, ELEMENT_TYPE_EMBEDDED_DOCUMENT,
    ELEMENT_TYPE_FLOATING_POINT, ELEMENT_TYPE_JAVASCRIPT_CODE,
    ELEMENT_TYPE_JAVASCRIPT_CODE_WITH_SCOPE, ELEMENT_TYPE_NULL_VALUE, ELEMENT_TYPE_OBJECT_ID,
    ELEMENT_TYPE_REGULAR_EXPRESSION, ELEMENT_TYPE_SYMBOL, ELEMENT_TYPE_TIMESTAMP,
    ELEMENT_TYPE_UTC_DATETIME, ELEMENT_TYPE_UTF8_STRING,
};
use bson::{DecoderError, DecoderResult};

use crate::mongo::document_reader::MIN_BSON_DOCUMENT_SIZE;

/// Deepest chain of embedded documents or arrays accepted in one document.
pub const MAX_NESTING_DEPTH: usize = 200;

// int32 total + smallest string (4 + 1) + smallest scope document
const MIN_CODE_WITH_SCOPE_SIZE: usize = 4 + 5 + MIN_BSON_DOCUMENT_SIZE;

/// Walks every element of a framed document and checks that each length
/// prefix stays inside its enclosing document, without building any values.
///
/// `bson::decode_document` trusts the lengths it reads, so bytes off the
/// wire go through here first.
pub fn check_document(bytes: &[u8]) -> DecoderResult<()> {
    let end = check_embedded(bytes, 0, bytes.len(), 0)?;
    if end != bytes.len() {
        return Err(malformed(format!("{} bytes trail the document terminator", bytes.len() - end)));
    }
    Ok(())
}

/// Returns the offset just past the document starting at `start`.
fn check_embedded(bytes: &[u8], start: usize, limit: usize, depth: usize) -> DecoderResult<usize> {
    if depth > MAX_NESTING_DEPTH {
        return Err(malformed(format!("documents nested deeper than {} levels", MAX_NESTING_DEPTH)));
    }
    let length = read_length(bytes, start, limit, "document")?;
    if length < MIN_BSON_DOCUMENT_SIZE {
        return Err(malformed(format!("document length {} is too small", length)));
    }
    let end = span(start, length, limit, "document")?;
    // elements must leave room for the terminator
    let body_limit = end - 1;
    if bytes[body_limit] != 0 {
        return Err(malformed(format!("document at offset {} is not terminated", start)));
    }

    let mut offset = start + 4;
    loop {
        let tag = bytes[offset];
        offset += 1;
        if tag == 0 {
            break;
        }
        offset = skip_cstring(bytes, offset, body_limit)?;
        offset = check_value(bytes, tag, offset, body_limit, depth)?;
    }
    if offset != end {
        return Err(malformed(format!(
            "document at offset {} ends at {}, declared end is {}",
            start, offset, end
        )));
    }
    Ok(end)
}

fn check_value(
    bytes: &[u8],
    tag: u8,
    offset: usize,
    limit: usize,
    depth: usize,
) -> DecoderResult<usize> {
    match tag {
        ELEMENT_TYPE_FLOATING_POINT
        | ELEMENT_TYPE_UTC_DATETIME
        | ELEMENT_TYPE_TIMESTAMP
        | ELEMENT_TYPE_64BIT_INTEGER => span(offset, 8, limit, "int64 value"),
        ELEMENT_TYPE_32BIT_INTEGER => span(offset, 4, limit, "int32 value"),
        ELEMENT_TYPE_OBJECT_ID => span(offset, 12, limit, "object id"),
        ELEMENT_TYPE_BOOLEAN => span(offset, 1, limit, "boolean"),
        ELEMENT_TYPE_NULL_VALUE => Ok(offset),
        ELEMENT_TYPE_UTF8_STRING | ELEMENT_TYPE_JAVASCRIPT_CODE | ELEMENT_TYPE_SYMBOL => {
            check_string(bytes, offset, limit)
        }
        ELEMENT_TYPE_EMBEDDED_DOCUMENT | ELEMENT_TYPE_ARRAY => {
            check_embedded(bytes, offset, limit, depth + 1)
        }
        ELEMENT_TYPE_BINARY => {
            let length = read_length(bytes, offset, limit, "binary")?;
            // length prefix and subtype byte
            let data = span(offset, 5, limit, "binary subtype")?;
            span(data, length, limit, "binary")
        }
        ELEMENT_TYPE_REGULAR_EXPRESSION => {
            let options = skip_cstring(bytes, offset, limit)?;
            skip_cstring(bytes, options, limit)
        }
        ELEMENT_TYPE_JAVASCRIPT_CODE_WITH_SCOPE => {
            let length = read_length(bytes, offset, limit, "code with scope")?;
            if length < MIN_CODE_WITH_SCOPE_SIZE {
                return Err(malformed(format!("code with scope length {} is too small", length)));
            }
            let end = span(offset, length, limit, "code with scope")?;
            let scope = check_string(bytes, offset + 4, end)?;
            let scope_end = check_embedded(bytes, scope, end, depth + 1)?;
            if scope_end != end {
                return Err(malformed(format!(
                    "code with scope at offset {} ends at {}, declared end is {}",
                    offset, scope_end, end
                )));
            }
            Ok(end)
        }
        _ => Err(DecoderError::UnrecognizedElementType(tag)),
    }
}

fn check_string(bytes: &[u8], offset: usize, limit: usize) -> DecoderResult<usize> {
    let length = read_length(bytes, offset, limit, "string")?;
    if length < 1 {
        return Err(malformed("string length 0 leaves no terminator".to_string()));
    }
    let end = span(offset + 4, length, limit, "string")?;
    if bytes[end - 1] != 0 {
        return Err(malformed(format!("string at offset {} is not terminated", offset)));
    }
    Ok(end)
}

fn skip_cstring(bytes: &[u8], offset: usize, limit: usize) -> DecoderResult<usize> {
    match bytes[offset..limit].iter().position(|&byte| byte == 0) {
        Some(nul) => Ok(offset + nul + 1),
        None => Err(malformed(format!("cstring at offset {} runs past its document", offset))),
    }
}

// Reads an int32 length prefix and rejects negative values.
fn read_length(bytes: &[u8], offset: usize, limit: usize, what: &str) -> DecoderResult<usize> {
    span(offset, 4, limit, what)?;
    let length = i32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]);
    if length < 0 {
        return Err(malformed(format!(
            "{} at offset {} declares negative length {}",
            what, offset, length
        )));
    }
    Ok(length as usize)
}

// End offset of `length` bytes starting at `offset`, if they fit before `limit`.
fn span(offset: usize, length: usize, limit: usize, what: &str) -> DecoderResult<usize> {
    match offset.checked_add(length) {
        Some(end) if end <= limit => Ok(end),
        _ => Err(malformed(format!(
            "{} of {} bytes at offset {} runs past its document",
            what, length, offset
        ))),
    }
}

fn malformed(message: String) -> DecoderError {
    DecoderError::from(io::Error::new(io::ErrorKind::InvalidData, message))
}
