use std::io::Read;
use std::mem::size_of;

use crate::mongo::error::{MongoParserError, MongoParserResult};
use crate::mongo::utils::{read_exactly, read_exactly_into};
use crate::utils::u8_array_to_u32;

/// Smallest well-formed bson document: the length prefix plus a terminator.
pub const MIN_BSON_DOCUMENT_SIZE: usize = 5;

const LENGTH_PREFIX_SIZE: usize = size_of::<u32>();

/// Splits length-prefixed documents off a byte stream without looking
/// inside them. Each call advances the stream by exactly one document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentReader {
    max_document_size: usize,
}

impl DocumentReader {
    pub fn new(max_document_size: usize) -> DocumentReader {
        DocumentReader { max_document_size }
    }

    /// Reads one whole document, prefix included.
    pub fn read_document<R: Read>(&self, reader: &mut R) -> MongoParserResult<Vec<u8>> {
        let prefix = read_exactly(reader, LENGTH_PREFIX_SIZE)?;
        let declared = self.declared_length(&prefix)?;
        self.read_remainder(reader, prefix, declared)
    }

    /// Like `read_document`, but fails with `FrameBoundary` instead of
    /// reading a document that would end past `expected` once added to
    /// `consumed`. The body is left unread in that case.
    pub fn read_document_within<R: Read>(
        &self,
        reader: &mut R,
        consumed: usize,
        expected: usize,
    ) -> MongoParserResult<Vec<u8>> {
        let remaining = expected.saturating_sub(consumed);
        if remaining < LENGTH_PREFIX_SIZE {
            return Err(MongoParserError::FrameBoundary {
                consumed: consumed + LENGTH_PREFIX_SIZE,
                expected,
            });
        }
        let prefix = read_exactly(reader, LENGTH_PREFIX_SIZE)?;
        let declared = self.declared_length(&prefix)?;
        if declared > remaining {
            log::warn!(
                "document of {} bytes overruns message boundary ({} of {} bytes consumed)",
                declared,
                consumed,
                expected
            );
            return Err(MongoParserError::FrameBoundary {
                consumed: consumed + declared,
                expected,
            });
        }
        self.read_remainder(reader, prefix, declared)
    }

    fn declared_length(&self, prefix: &[u8]) -> MongoParserResult<usize> {
        let raw = u8_array_to_u32(&[prefix[0], prefix[1], prefix[2], prefix[3]]) as i32;
        if raw < MIN_BSON_DOCUMENT_SIZE as i32 || raw as usize > self.max_document_size {
            return Err(MongoParserError::MalformedLength(raw as i64));
        }
        Ok(raw as usize)
    }

    fn read_remainder<R: Read>(
        &self,
        reader: &mut R,
        mut document: Vec<u8>,
        declared: usize,
    ) -> MongoParserResult<Vec<u8>> {
        document.reserve_exact(declared - LENGTH_PREFIX_SIZE);
        match read_exactly_into(reader, &mut document, declared - LENGTH_PREFIX_SIZE) {
            Err(MongoParserError::TruncatedInput { read, .. }) => {
                Err(MongoParserError::TruncatedInput {
                    expected: declared,
                    read: read + LENGTH_PREFIX_SIZE,
                })
            }
            Err(error) => Err(error),
            Ok(()) => {
                log::trace!("read document of {} bytes", declared);
                Ok(document)
            }
        }
    }
}
