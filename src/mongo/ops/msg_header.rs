// @see https://docs.mongodb.com/manual/reference/mongodb-wire-protocol/#standard-message-header

use std::io::Read;

use crate::config::WiretapeConfiguration;
use crate::mongo::error::{MongoParserError, MongoParserResult};
use crate::mongo::ops::opcodes::MongoOpCode;
use crate::mongo::utils::{parse_u32, pick_op_code, read_exactly};
use crate::utils::u32_to_u8_array;

/// Bytes occupied by the header itself; `message_length` counts them.
pub const MSG_HEADER_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgHeader {
    // total message size, including this
    pub message_length: u32,

    // identifier for this message
    pub request_id: u32,

    // requestID from the original request (used in responses from db)
    pub response_to: u32,

    // request type
    pub op_code: MongoOpCode,
}

impl MsgHeader {
    /// Number of body bytes following the header, after checking the
    /// declared length against the header size and the configured ceiling.
    pub fn body_length(&self, config: &WiretapeConfiguration) -> MongoParserResult<usize> {
        let message_length = self.message_length as usize;
        if message_length < MSG_HEADER_LENGTH
            || message_length > config.max_message_size_in_bytes
            || self.message_length as i32 <= 0
        {
            return Err(MongoParserError::MalformedLength(
                self.message_length as i32 as i64,
            ));
        }
        Ok(message_length - MSG_HEADER_LENGTH)
    }
}

pub fn parse_msg_header(buffer: &[u8]) -> MongoParserResult<(MsgHeader, &[u8])> {
    let (message_length, next_buffer) = parse_u32(buffer)?;
    let (request_id, next_buffer) = parse_u32(next_buffer)?;
    let (response_to, next_buffer) = parse_u32(next_buffer)?;
    let (op_code_u32, next_buffer) = parse_u32(next_buffer)?;
    let op_code = pick_op_code(op_code_u32)?;
    Ok((
        MsgHeader {
            message_length,
            request_id,
            response_to,
            op_code,
        },
        next_buffer,
    ))
}

pub fn read_msg_header<R: Read>(reader: &mut R) -> MongoParserResult<MsgHeader> {
    let buffer = read_exactly(reader, MSG_HEADER_LENGTH)?;
    let (header, _) = parse_msg_header(&buffer)?;
    Ok(header)
}

pub fn serialize_msg_header(message_header: &MsgHeader) -> Vec<u8> {
    let mut res: Vec<u8> = Vec::with_capacity(MSG_HEADER_LENGTH);
    res.extend_from_slice(&u32_to_u8_array(message_header.message_length));
    res.extend_from_slice(&u32_to_u8_array(message_header.request_id));
    res.extend_from_slice(&u32_to_u8_array(message_header.response_to));
    res.extend_from_slice(&u32_to_u8_array(message_header.op_code as u32));
    res
}

#[cfg(test)]
mod msg_header_tests {
    use std::io::Cursor;

    use crate::config::WiretapeConfiguration;
    use crate::mongo::error::MongoParserError;
    use crate::mongo::ops::msg_header::{
        parse_msg_header, read_msg_header, serialize_msg_header, MsgHeader, MSG_HEADER_LENGTH,
    };
    use crate::mongo::ops::opcodes::MongoOpCode;

    #[test]
    fn test_parse_msg_header() {
        let buffer = [
            0x2a, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0xdb, 0x07,
            0x00, 0x00, 0xee,
        ];
        let (header, rest) = parse_msg_header(&buffer).unwrap();
        assert_eq!(
            header,
            MsgHeader {
                message_length: 42,
                request_id: 7,
                response_to: 3,
                op_code: MongoOpCode::OpCommandReply,
            }
        );
        assert_eq!(rest, &[0xee]);
        assert_eq!(serialize_msg_header(&header), buffer[..MSG_HEADER_LENGTH].to_vec());
    }

    #[test]
    fn test_read_msg_header_truncated() {
        let mut cursor = Cursor::new(vec![0x2a, 0x00, 0x00, 0x00, 0x07]);
        assert!(matches!(
            read_msg_header(&mut cursor),
            Err(MongoParserError::TruncatedInput {
                expected: 16,
                read: 5
            })
        ));
    }

    #[test]
    fn test_body_length() {
        let config = WiretapeConfiguration::default();
        let mut header = MsgHeader {
            message_length: 26,
            request_id: 0,
            response_to: 0,
            op_code: MongoOpCode::OpCommandReply,
        };
        assert_eq!(header.body_length(&config).unwrap(), 10);

        header.message_length = 15;
        assert!(matches!(
            header.body_length(&config),
            Err(MongoParserError::MalformedLength(15))
        ));

        header.message_length = std::u32::MAX;
        assert!(matches!(
            header.body_length(&config),
            Err(MongoParserError::MalformedLength(-1))
        ));

        header.message_length = (config.max_message_size_in_bytes + 1) as u32;
        assert!(matches!(
            header.body_length(&config),
            Err(MongoParserError::MalformedLength(_))
        ));
    }
}
