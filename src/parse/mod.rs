pub mod doc_parser;
pub mod doc_serializer;
pub mod message;

pub use doc_parser::parse_document;
pub use doc_serializer::serialize_document;
pub use message::{Message, parse_message, tag_name};
