use std::fmt;

use bson::Document;
use serde::Serialize;

use crate::mongo::error::MongoParserResult;
use crate::mongo::ops::opcodes::MongoOpCode;
use crate::mongo::reply_errors::ReplyError;

/// Summary of an operation for traffic analysis tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpMetadata {
    // short op name, e.g. "op_commandreply"
    pub op: &'static str,

    // "dbname.collectionname", empty when the op has none
    pub ns: String,

    // command name, empty when the op has none
    pub command: String,

    // op specific payload
    pub data: Document,
}

/// A decoded wire operation.
pub trait Op: fmt::Display {
    fn op_code(&self) -> MongoOpCode;

    fn meta(&self) -> MongoParserResult<OpMetadata>;

    /// Like `Display`, with each part cut to `chars` characters.
    fn abbreviated(&self, chars: usize) -> String;
}

/// A server reply that replay and analysis can compare against the reply
/// to a re-issued request.
pub trait Replyable {
    fn cursor_id(&self) -> MongoParserResult<i64>;

    fn num_returned(&self) -> usize;

    fn latency_micros(&self) -> i64;

    fn errors(&self) -> MongoParserResult<Vec<ReplyError>>;
}
