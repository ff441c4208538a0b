pub mod msg_header;
pub mod op;
pub mod op_command_reply;
pub mod opcodes;
