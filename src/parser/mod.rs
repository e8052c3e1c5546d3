//! Low-level parsing infrastructure shared by all readers.
//!
//! This module provides the byte source abstraction, the byte parser, the
//! bracketed-text [Lexer](lexer::Lexer), error handling, and the
//! [ParseSummary] used to report parsed vs. skipped units.

pub mod buffered_byte_source;
pub mod byte_parser;
pub mod byte_source;
pub mod in_memory_byte_source;
pub mod lexer;
pub mod parsing_error;
pub mod summary;

pub use byte_parser::{ByteParser, ReadStrategy};
pub use buffered_byte_source::BufferedByteSource;
pub use byte_source::ByteSource;
pub use in_memory_byte_source::InMemoryByteSource;
pub use parsing_error::{ErrorLocation, ParsingError, ParsingErrorKind};
pub use summary::ParseSummary;
