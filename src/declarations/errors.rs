use thiserror::Error;

use crate::config::ConfigError;
use crate::mongo::error::{MongoParserError, MongoRenderError, MongoSerializeError};

#[derive(Debug, Error)]
pub enum WiretapeError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    MongoParser(MongoParserError),

    #[error(transparent)]
    MongoSerializer(MongoSerializeError),

    #[error(transparent)]
    MongoRender(MongoRenderError),
}

impl std::convert::From<ConfigError> for WiretapeError {
    fn from(error: ConfigError) -> WiretapeError {
        WiretapeError::Config(error)
    }
}

impl std::convert::From<MongoParserError> for WiretapeError {
    fn from(error: MongoParserError) -> WiretapeError {
        WiretapeError::MongoParser(error)
    }
}

impl std::convert::From<MongoSerializeError> for WiretapeError {
    fn from(error: MongoSerializeError) -> WiretapeError {
        WiretapeError::MongoSerializer(error)
    }
}

impl std::convert::From<MongoRenderError> for WiretapeError {
    fn from(error: MongoRenderError) -> WiretapeError {
        WiretapeError::MongoRender(error)
    }
}

/// Short description of an error's class, for callers deciding whether to
/// drop the connection or skip the message.
pub fn explain_error(error: &WiretapeError) -> &'static str {
    match error {
        WiretapeError::Config(_) => "invalid decoder configuration",
        WiretapeError::MongoParser(parser_error) => match parser_error {
            MongoParserError::TruncatedInput { .. } => "stream truncated",
            MongoParserError::MalformedLength(_) | MongoParserError::FrameBoundary { .. } => {
                "framing corrupted"
            }
            MongoParserError::MalformedDocument(_) | MongoParserError::Unmarshal(_) => {
                "document unreadable"
            }
            MongoParserError::Io(_) => "read error",
            _ => "message rejected",
        },
        WiretapeError::MongoSerializer(_) => "serialization failed",
        WiretapeError::MongoRender(_) => "rendering failed",
    }
}

pub type WiretapeResult<T> = Result<T, WiretapeError>;
