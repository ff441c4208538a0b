pub mod document_check;
pub mod document_reader;
pub mod error;
pub mod ops;
pub mod parser;
pub mod raw_document;
pub mod render;
pub mod reply_errors;
pub mod utils;
