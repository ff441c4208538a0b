use thiserror::Error;

/// Largest single BSON document a server will emit (`maxBsonObjectSize`).
pub const MAX_BSON_OBJECT_SIZE: usize = 16 * 1024 * 1024;

/// Largest wire message a server will emit (`maxMessageSizeBytes`).
pub const MAX_MESSAGE_SIZE_IN_BYTES: usize = 48_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("limit `{0}` must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("max_bson_object_size ({document}) exceeds max_message_size_in_bytes ({message})")]
    DocumentLargerThanMessage { document: usize, message: usize },
}

#[derive(Debug, Default, Clone)]
pub struct DecoderOptions {
    pub max_bson_object_size: Option<usize>,
    pub max_message_size_in_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiretapeConfiguration {
    pub max_bson_object_size: usize,
    pub max_message_size_in_bytes: usize,
}

impl Default for WiretapeConfiguration {
    fn default() -> Self {
        WiretapeConfiguration {
            max_bson_object_size: MAX_BSON_OBJECT_SIZE,
            max_message_size_in_bytes: MAX_MESSAGE_SIZE_IN_BYTES,
        }
    }
}

pub fn compile_config(options: DecoderOptions) -> Result<WiretapeConfiguration, ConfigError> {
    let max_bson_object_size = options
        .max_bson_object_size
        .unwrap_or(MAX_BSON_OBJECT_SIZE);
    let max_message_size_in_bytes = options
        .max_message_size_in_bytes
        .unwrap_or(MAX_MESSAGE_SIZE_IN_BYTES);

    if max_bson_object_size == 0 {
        return Err(ConfigError::ZeroLimit("max_bson_object_size"));
    }
    if max_message_size_in_bytes == 0 {
        return Err(ConfigError::ZeroLimit("max_message_size_in_bytes"));
    }
    if max_bson_object_size > max_message_size_in_bytes {
        return Err(ConfigError::DocumentLargerThanMessage {
            document: max_bson_object_size,
            message: max_message_size_in_bytes,
        });
    }

    Ok(WiretapeConfiguration {
        max_bson_object_size,
        max_message_size_in_bytes,
    })
}
