//! Decoding of captured MongoDB OP_COMMANDREPLY traffic for replay and
//! analysis.

pub mod config;
pub mod declarations;
pub mod mongo;
pub mod utils;

pub use crate::config::{compile_config, DecoderOptions, WiretapeConfiguration};
pub use crate::declarations::errors::{explain_error, WiretapeError, WiretapeResult};
pub use crate::mongo::ops::op::{Op, OpMetadata, Replyable};
pub use crate::mongo::ops::op_command_reply::OpCommandReply;
pub use crate::mongo::parser::{parse_command_reply_message, read_command_reply_message};
