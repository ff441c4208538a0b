use std::io::Read;
use std::mem::size_of;

use crate::mongo::error::{MongoParserError, MongoParserResult};
use crate::mongo::ops::opcodes::{
    MongoOpCode, MONGO_OP_COMMAND_CODE, MONGO_OP_COMMAND_REPLY_CODE, MONGO_OP_DELETE_CODE,
    MONGO_OP_GET_MORE_CODE, MONGO_OP_INSERT_CODE, MONGO_OP_KILL_CURSORS_CODE, MONGO_OP_MSG_CODE,
    MONGO_OP_QUERY_CODE, MONGO_OP_REPLY_CODE, MONGO_OP_UPDATE_CODE,
};
use crate::utils::u8_array_to_u32;

pub fn pick_op_code(op: u32) -> MongoParserResult<MongoOpCode> {
    match op {
        MONGO_OP_REPLY_CODE => Ok(MongoOpCode::OpReply),
        MONGO_OP_UPDATE_CODE => Ok(MongoOpCode::OpUpdate),
        MONGO_OP_INSERT_CODE => Ok(MongoOpCode::OpInsert),
        MONGO_OP_QUERY_CODE => Ok(MongoOpCode::OpQuery),
        MONGO_OP_GET_MORE_CODE => Ok(MongoOpCode::OpGetMore),
        MONGO_OP_DELETE_CODE => Ok(MongoOpCode::OpDelete),
        MONGO_OP_KILL_CURSORS_CODE => Ok(MongoOpCode::OpKillCursors),
        MONGO_OP_COMMAND_CODE => Ok(MongoOpCode::OpCommand),
        MONGO_OP_COMMAND_REPLY_CODE => Ok(MongoOpCode::OpCommandReply),
        MONGO_OP_MSG_CODE => Ok(MongoOpCode::OpMsg),
        _ => Err(MongoParserError::UnknownOpCode(op)),
    }
}

pub fn parse_u32(buffer: &[u8]) -> MongoParserResult<(u32, &[u8])> {
    if buffer.len() < size_of::<u32>() {
        return Err(MongoParserError::NotEnoughBufferSize);
    }
    let value = u8_array_to_u32(&[buffer[0], buffer[1], buffer[2], buffer[3]]);
    Ok((value, &buffer[size_of::<u32>()..]))
}

/// Reads exactly `length` bytes, reporting how far a short stream got.
pub fn read_exactly<R: Read>(reader: &mut R, length: usize) -> MongoParserResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(length);
    let read = reader.by_ref().take(length as u64).read_to_end(&mut buffer)?;
    if read < length {
        return Err(MongoParserError::TruncatedInput {
            expected: length,
            read,
        });
    }
    Ok(buffer)
}

/// Appends exactly `length` bytes to `buffer`.
pub fn read_exactly_into<R: Read>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    length: usize,
) -> MongoParserResult<()> {
    let read = reader.by_ref().take(length as u64).read_to_end(buffer)?;
    if read < length {
        return Err(MongoParserError::TruncatedInput {
            expected: length,
            read,
        });
    }
    Ok(())
}

#[cfg(test)]
mod utils_tests {
    use std::io::Cursor;

    use crate::mongo::error::MongoParserError;
    use crate::mongo::ops::opcodes::MongoOpCode;
    use crate::mongo::utils::{parse_u32, pick_op_code, read_exactly};

    #[test]
    fn test_pick_op_code() {
        assert_eq!(pick_op_code(2011).unwrap(), MongoOpCode::OpCommandReply);
        assert_eq!(pick_op_code(1).unwrap(), MongoOpCode::OpReply);
        match pick_op_code(2003) {
            Err(MongoParserError::UnknownOpCode(2003)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_u32() {
        let buffer = [0x10, 0x00, 0x00, 0x00, 0xff];
        let (value, rest) = parse_u32(&buffer).unwrap();
        assert_eq!(value, 16);
        assert_eq!(rest, &[0xff]);
        assert!(matches!(
            parse_u32(&buffer[..3]),
            Err(MongoParserError::NotEnoughBufferSize)
        ));
    }

    #[test]
    fn test_read_exactly_advances_stream() {
        let mut cursor = Cursor::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(read_exactly(&mut cursor, 2).unwrap(), vec![1, 2]);
        assert_eq!(cursor.position(), 2);
        assert_eq!(read_exactly(&mut cursor, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_read_exactly_truncated() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);
        match read_exactly(&mut cursor, 8) {
            Err(MongoParserError::TruncatedInput { expected, read }) => {
                assert_eq!(expected, 8);
                assert_eq!(read, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
