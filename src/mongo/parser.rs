use std::io::{self, Read};

use crate::config::WiretapeConfiguration;
use crate::declarations::errors::WiretapeResult;
use crate::mongo::error::MongoParserError;
use crate::mongo::ops::msg_header::{parse_msg_header, read_msg_header};
use crate::mongo::ops::op_command_reply::{
    parse_op_command_reply, read_op_command_reply, OpCommandReply,
};
use crate::mongo::ops::opcodes::MongoOpCode;

/// Parses one complete OP_COMMANDREPLY message, header included. The buffer
/// must end exactly where the header says the message ends.
pub fn parse_command_reply_message(
    buffer: &[u8],
    config: &WiretapeConfiguration,
) -> WiretapeResult<OpCommandReply> {
    let (header, body) = parse_msg_header(buffer)?;
    if header.op_code != MongoOpCode::OpCommandReply {
        return Err(MongoParserError::UnexpectedOpCode(header.op_code).into());
    }
    Ok(parse_op_command_reply(header, body, config)?)
}

/// Reads one OP_COMMANDREPLY message off a stream, leaving the stream
/// positioned at the start of the next message.
///
/// When the framing is intact but the message itself is unusable (an
/// unreadable document, another op code) the rest of its body is skipped so
/// the caller can log the error and carry on with the next message.
pub fn read_command_reply_message<R: Read>(
    reader: &mut R,
    config: &WiretapeConfiguration,
) -> WiretapeResult<OpCommandReply> {
    let header = read_msg_header(reader)?;
    let body_length = header.body_length(config)?;
    let mut body = reader.by_ref().take(body_length as u64);
    match read_op_command_reply(header, &mut body, config) {
        Ok(op) => Ok(op),
        Err(error @ MongoParserError::MalformedDocument(_))
        | Err(error @ MongoParserError::UnexpectedOpCode(_)) => {
            let skipped = io::copy(&mut body, &mut io::sink()).map_err(MongoParserError::Io)?;
            log::debug!("skipped {} bytes of unusable message: {}", skipped, error);
            Err(error.into())
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod parser_tests {
    use bson::{bson, doc};

    use crate::config::WiretapeConfiguration;
    use crate::declarations::errors::WiretapeError;
    use crate::mongo::error::MongoParserError;
    use crate::mongo::ops::msg_header::{serialize_msg_header, MsgHeader};
    use crate::mongo::ops::op::Replyable;
    use crate::mongo::ops::opcodes::MongoOpCode;
    use crate::mongo::parser::parse_command_reply_message;
    use crate::mongo::raw_document::RawDocument;

    #[test]
    fn test_parse_command_reply_message() {
        let ok = RawDocument::from_document(&doc! { "ok": 1 }).unwrap();
        let empty = RawDocument::from_document(&doc! {}).unwrap();
        let message_length = 16 + ok.len() + empty.len();
        let mut buffer = serialize_msg_header(&MsgHeader {
            message_length: message_length as u32,
            request_id: 2,
            response_to: 1,
            op_code: MongoOpCode::OpCommandReply,
        });
        buffer.extend_from_slice(ok.as_bytes());
        buffer.extend_from_slice(empty.as_bytes());

        let op = parse_command_reply_message(&buffer, &WiretapeConfiguration::default()).unwrap();
        assert_eq!(op.header().response_to, 1);
        assert_eq!(op.num_returned(), 0);
    }

    #[test]
    fn test_rejects_other_op_codes() {
        let buffer = serialize_msg_header(&MsgHeader {
            message_length: 16,
            request_id: 2,
            response_to: 1,
            op_code: MongoOpCode::OpMsg,
        });
        match parse_command_reply_message(&buffer, &WiretapeConfiguration::default()) {
            Err(WiretapeError::MongoParser(MongoParserError::UnexpectedOpCode(op_code))) => {
                assert_eq!(op_code, MongoOpCode::OpMsg)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_op_code() {
        let mut buffer = vec![16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        buffer.extend_from_slice(&[0xd3, 0x07, 0x00, 0x00]);
        assert!(matches!(
            parse_command_reply_message(&buffer, &WiretapeConfiguration::default()),
            Err(WiretapeError::MongoParser(MongoParserError::UnknownOpCode(2003)))
        ));
    }
}
