use std::fmt;
use std::io::Read;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use bson::{Bson, Document};
use serde::Deserialize;

use crate::config::WiretapeConfiguration;
use crate::mongo::document_reader::DocumentReader;
use crate::mongo::error::{
    MongoParserError, MongoParserResult, MongoRenderError, MongoSerializeError,
};
use crate::mongo::ops::msg_header::{serialize_msg_header, MsgHeader};
use crate::mongo::ops::op::{Op, OpMetadata, Replyable};
use crate::mongo::ops::opcodes::MongoOpCode;
use crate::mongo::raw_document::RawDocument;
use crate::mongo::render::{abbreviate, render_document, render_documents};
use crate::mongo::reply_errors::{extract_errors_from_document, ReplyError};
use crate::utils::u32_to_u8_array;

/// @see https://docs.mongodb.com/manual/reference/mongodb-wire-protocol/#wire-op-commandreply
///
/// Immutable once decoded; the cursor id is resolved on first request and
/// kept for the life of the value.
#[derive(Debug)]
pub struct OpCommandReply {
    // A standard wire protocol header
    header: MsgHeader,

    // A BSON document containing the command reply
    command_reply: RawDocument,

    // A BSON document containing any required metadata
    metadata: RawDocument,

    // A variable number of BSON documents
    output_docs: Vec<RawDocument>,

    // Time between the originating request and this reply
    latency: Duration,

    cursor_id: OnceLock<i64>,

    #[cfg(test)]
    cursor_id_parses: AtomicUsize,
}

#[derive(Debug, Default, Deserialize)]
struct CursorReply {
    #[serde(default)]
    cursor: CursorInfo,
}

#[derive(Debug, Default, Deserialize)]
struct CursorInfo {
    #[serde(default)]
    id: i64,
}

impl OpCommandReply {
    pub fn new(
        header: MsgHeader,
        command_reply: RawDocument,
        metadata: RawDocument,
        output_docs: Vec<RawDocument>,
    ) -> OpCommandReply {
        OpCommandReply {
            header,
            command_reply,
            metadata,
            output_docs,
            latency: Duration::default(),
            cursor_id: OnceLock::new(),
            #[cfg(test)]
            cursor_id_parses: AtomicUsize::new(0),
        }
    }

    pub fn header(&self) -> &MsgHeader {
        &self.header
    }

    pub fn command_reply(&self) -> &RawDocument {
        &self.command_reply
    }

    pub fn metadata(&self) -> &RawDocument {
        &self.metadata
    }

    pub fn output_docs(&self) -> &[RawDocument] {
        &self.output_docs
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Records the request/reply latency measured by the capture pipeline.
    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    #[cfg(test)]
    pub(crate) fn cursor_id_parses(&self) -> usize {
        self.cursor_id_parses.load(Ordering::SeqCst)
    }

    /// Renders the command reply, metadata and output documents as JSON.
    ///
    /// The output part is an empty string, not `[]`, when the reply carries
    /// no output documents. `Display` and `abbreviated` then print only two
    /// segments, `CommandReply {reply} {metadata}`, with no trailing space.
    pub fn render_body(&self) -> Result<(String, String, String), MongoRenderError> {
        let command_reply = render_document(&self.command_reply)?;
        let metadata = render_document(&self.metadata)?;
        let output_docs = if self.output_docs.is_empty() {
            String::new()
        } else {
            render_documents(&self.output_docs)?
        };
        Ok((command_reply, metadata, output_docs))
    }

    fn write_summary(
        &self,
        f: &mut fmt::Formatter,
        shorten: &dyn Fn(&str) -> String,
    ) -> fmt::Result {
        match self.render_body() {
            Err(error) => {
                log::warn!("cannot render reply {}: {}", self.header.request_id, error);
                write!(f, "{}", error)
            }
            Ok((command_reply, metadata, output_docs)) => {
                write!(
                    f,
                    "CommandReply {} {}",
                    shorten(&command_reply),
                    shorten(&metadata)
                )?;
                if !output_docs.is_empty() {
                    write!(f, " {}", shorten(&output_docs))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for OpCommandReply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_summary(f, &|part: &str| part.to_string())
    }
}

struct Abbreviated<'a> {
    op: &'a OpCommandReply,
    chars: usize,
}

impl<'a> fmt::Display for Abbreviated<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chars = self.chars;
        self.op.write_summary(f, &|part: &str| abbreviate(part, chars))
    }
}

impl Op for OpCommandReply {
    fn op_code(&self) -> MongoOpCode {
        MongoOpCode::OpCommandReply
    }

    fn meta(&self) -> MongoParserResult<OpMetadata> {
        let mut output_docs = Vec::with_capacity(self.output_docs.len());
        for document in &self.output_docs {
            output_docs.push(Bson::Document(
                document.to_document().map_err(MongoParserError::Unmarshal)?,
            ));
        }

        let mut data = Document::new();
        data.insert(
            "metadata",
            Bson::Document(
                self.metadata
                    .to_document()
                    .map_err(MongoParserError::Unmarshal)?,
            ),
        );
        data.insert(
            "command_reply",
            Bson::Document(
                self.command_reply
                    .to_document()
                    .map_err(MongoParserError::Unmarshal)?,
            ),
        );
        data.insert("output_docs", Bson::Array(output_docs));

        Ok(OpMetadata {
            op: self.op_code().name(),
            ns: String::new(),
            command: String::new(),
            data,
        })
    }

    fn abbreviated(&self, chars: usize) -> String {
        Abbreviated { op: self, chars }.to_string()
    }
}

impl Replyable for OpCommandReply {
    fn cursor_id(&self) -> MongoParserResult<i64> {
        if let Some(cursor_id) = self.cursor_id.get() {
            return Ok(*cursor_id);
        }
        #[cfg(test)]
        self.cursor_id_parses.fetch_add(1, Ordering::SeqCst);

        let document = self
            .command_reply
            .to_document()
            .map_err(MongoParserError::Unmarshal)?;
        let reply: CursorReply =
            bson::from_bson(Bson::Document(document)).map_err(MongoParserError::Unmarshal)?;
        // A concurrent caller may have won; everyone returns the stored value.
        Ok(*self.cursor_id.get_or_init(|| reply.cursor.id))
    }

    fn num_returned(&self) -> usize {
        self.output_docs.len()
    }

    fn latency_micros(&self) -> i64 {
        let micros = self.latency.as_micros();
        if micros > i64::max_value() as u128 {
            i64::max_value()
        } else {
            micros as i64
        }
    }

    fn errors(&self) -> MongoParserResult<Vec<ReplyError>> {
        let first_doc = match self.output_docs.first() {
            None => return Ok(Vec::new()),
            Some(document) => document,
        };
        let document = first_doc
            .to_document()
            .map_err(MongoParserError::Unmarshal)?;
        Ok(extract_errors_from_document(&document))
    }
}

/// Decodes the body of an OP_COMMANDREPLY whose header has already been
/// read, consuming exactly `message_length - 16` bytes from `reader`.
///
/// Output documents are read until the byte count reaches the declared
/// length; a document that would cross it is a `FrameBoundary` error.
pub fn read_op_command_reply<R: Read>(
    header: MsgHeader,
    reader: &mut R,
    config: &WiretapeConfiguration,
) -> MongoParserResult<OpCommandReply> {
    if header.op_code != MongoOpCode::OpCommandReply {
        return Err(MongoParserError::UnexpectedOpCode(header.op_code));
    }
    let expected = header.body_length(config)?;
    let document_reader = DocumentReader::new(config.max_bson_object_size);

    let command_reply =
        RawDocument::from_bytes(document_reader.read_document_within(reader, 0, expected)?)?;
    let mut consumed = command_reply.len();

    let metadata = RawDocument::from_bytes(document_reader.read_document_within(
        reader, consumed, expected,
    )?)?;
    consumed += metadata.len();

    let mut output_docs = Vec::new();
    while consumed < expected {
        let document_bytes = document_reader.read_document_within(reader, consumed, expected)?;
        consumed += document_bytes.len();
        output_docs.push(RawDocument::from_bytes(document_bytes)?);
    }

    log::debug!(
        "decoded OP_COMMANDREPLY {} (response to {}): {} bytes, {} output docs",
        header.request_id,
        header.response_to,
        header.message_length,
        output_docs.len()
    );
    Ok(OpCommandReply::new(header, command_reply, metadata, output_docs))
}

/// Decodes a body held in memory; bytes beyond the declared length are an
/// error.
pub fn parse_op_command_reply(
    header: MsgHeader,
    buffer: &[u8],
    config: &WiretapeConfiguration,
) -> MongoParserResult<OpCommandReply> {
    let mut remaining = buffer;
    let op = read_op_command_reply(header, &mut remaining, config)?;
    if !remaining.is_empty() {
        return Err(MongoParserError::TrailingBytes(remaining.len()));
    }
    Ok(op)
}

/// Writes the full message, header first. `message_length` is taken from
/// the bytes written rather than from the stored header.
pub fn serialize_op_command_reply(op: &OpCommandReply) -> Result<Vec<u8>, MongoSerializeError> {
    let mut res_buffer = serialize_msg_header(&op.header);
    res_buffer.extend_from_slice(op.command_reply.as_bytes());
    res_buffer.extend_from_slice(op.metadata.as_bytes());
    for document in &op.output_docs {
        res_buffer.extend_from_slice(document.as_bytes());
    }

    let message_length = res_buffer.len();
    if message_length > i32::max_value() as usize {
        return Err(MongoSerializeError::MessageTooLarge(message_length));
    }
    res_buffer[..4].copy_from_slice(&u32_to_u8_array(message_length as u32));
    Ok(res_buffer)
}
