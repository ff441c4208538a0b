use std::io;

use thiserror::Error;

use crate::mongo::ops::opcodes::MongoOpCode;

#[derive(Debug, Error)]
pub enum MongoParserError {
    #[error("stream ended after {read} of {expected} declared bytes")]
    TruncatedInput { expected: usize, read: usize },

    #[error("declared length {0} is out of bounds")]
    MalformedLength(i64),

    #[error("document crosses the message boundary: {consumed} of {expected} bytes consumed")]
    FrameBoundary { consumed: usize, expected: usize },

    #[error("document bytes do not parse as bson: {0}")]
    MalformedDocument(bson::DecoderError),

    #[error("failed to unmarshal bson document: {0}")]
    Unmarshal(bson::DecoderError),

    #[error("{0} bytes left over after the declared message length")]
    TrailingBytes(usize),

    #[error("buffer is too short for the requested field")]
    NotEnoughBufferSize,

    #[error("unknown op code {0}")]
    UnknownOpCode(u32),

    #[error("unexpected op code {0:?}")]
    UnexpectedOpCode(MongoOpCode),

    #[error("underlying I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type MongoParserResult<T> = Result<T, MongoParserError>;

#[derive(Debug, Error)]
pub enum MongoSerializeError {
    #[error("failed to encode bson document: {0}")]
    SerializeBsonError(bson::EncoderError),

    #[error("serialized message of {0} bytes does not fit the length field")]
    MessageTooLarge(usize),
}

#[derive(Debug, Error)]
pub enum MongoRenderError {
    #[error("document cannot be rendered: {0}")]
    Document(bson::DecoderError),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
