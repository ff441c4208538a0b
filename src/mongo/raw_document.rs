use std::fmt;
use std::io;

use bson::Document;

use crate::mongo::document_check::check_document;
use crate::mongo::error::{MongoParserError, MongoParserResult, MongoSerializeError};
use crate::utils::hex_dump;

/// The framed bytes of one bson document, length prefix included.
///
/// Bytes are checked once on construction; fields are only decoded again
/// when an accessor asks for them.
#[derive(Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Vec<u8>,
}

impl RawDocument {
    pub fn from_bytes(bytes: Vec<u8>) -> MongoParserResult<RawDocument> {
        if let Err(error) = decode_exact(&bytes) {
            log::trace!("malformed document:\n{}", hex_dump(&bytes));
            return Err(MongoParserError::MalformedDocument(error));
        }
        Ok(RawDocument { bytes })
    }

    pub fn from_document(document: &Document) -> Result<RawDocument, MongoSerializeError> {
        let mut bytes = Vec::new();
        bson::encode_document(&mut bytes, document)
            .map_err(MongoSerializeError::SerializeBsonError)?;
        Ok(RawDocument { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_document(&self) -> Result<Document, bson::DecoderError> {
        decode_exact(&self.bytes)
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_document() {
            Ok(document) => write!(f, "RawDocument({})", document),
            Err(_) => write!(f, "RawDocument(<{} unreadable bytes>)", self.bytes.len()),
        }
    }
}

// Rejects bytes past the document's terminator as well as short ones.
fn decode_exact(bytes: &[u8]) -> Result<Document, bson::DecoderError> {
    check_document(bytes)?;
    let mut remaining = bytes;
    let document = bson::decode_document(&mut remaining)?;
    if !remaining.is_empty() {
        return Err(bson::DecoderError::from(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} bytes trail the document terminator", remaining.len()),
        )));
    }
    Ok(document)
}
