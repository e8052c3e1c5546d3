//! Low-level byte-by-byte parser for ASCII/UTF-8 text.
//!
//! This module provides [ByteParser] for reading text-based formats with
//! support for peeking, consuming and delimiter-bounded atoms. It is the
//! foundation of the bracketed-tree [Lexer](crate::parser::lexer::Lexer).

use crate::parser::buffered_byte_source::BufferedByteSource;
use crate::parser::byte_source::ByteSource;
use crate::parser::in_memory_byte_source::InMemoryByteSource;
use std::fs::File;
use std::path::Path;

/// File size above which [ReadStrategy::Automatic] streams instead of loading.
const AUTOMATIC_BUFFERED_THRESHOLD: u64 = 64 * 1024 * 1024;

// =#========================================================================#=
// READ STRATEGY
// =#========================================================================#=
/// Controls how a file is read during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Read the file in chunks through a buffered I/O reader.
    Buffered,

    /// Load the entire file into a contiguous byte buffer before parsing.
    InMemory,

    /// Choose between [ReadStrategy::Buffered] and [ReadStrategy::InMemory]
    /// based on file size. This is the default.
    #[default]
    Automatic,
}

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser with support for peeking, consuming, and
/// delimiter-bounded atoms.
///
/// Works with any [ByteSource] (in-memory or buffered). Multi-byte UTF-8
/// sequences inside atoms are preserved, since atoms are collected as raw
/// bytes and only decoded once complete.
///
/// # Example
/// ```
/// use treebank::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  (NN dog)");
/// parser.skip_whitespace();
/// assert!(parser.consume_if(b'('));
/// assert_eq!(parser.parse_atom(b"() \t\n\r"), "NN");
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a new `ByteParser` from a byte slice by copying it into a Vec.
    pub fn from_bytes(input: &[u8]) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.to_vec()))
    }

    /// Creates a new `ByteParser` from a string by copying it into a Vec.
    pub fn for_str(input: &str) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.as_bytes().to_vec()))
    }

    /// Creates a new `ByteParser` that loads the whole file into memory.
    pub fn from_file_in_memory<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(InMemoryByteSource::from_file(path)?))
    }
}

impl ByteParser<BufferedByteSource<File>> {
    /// Creates a new `ByteParser` streaming the file through a buffer.
    pub fn from_file_buffered<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(BufferedByteSource::from_file(path)?))
    }
}

impl ByteParser<Box<dyn ByteSource + Send>> {
    /// Creates a new `ByteParser` for a file using the given [ReadStrategy].
    pub fn from_file<P: AsRef<Path>>(path: P, strategy: ReadStrategy) -> std::io::Result<Self> {
        let buffered = match strategy {
            ReadStrategy::Buffered => true,
            ReadStrategy::InMemory => false,
            ReadStrategy::Automatic => {
                std::fs::metadata(path.as_ref())?.len() > AUTOMATIC_BUFFERED_THRESHOLD
            }
        };

        let source: Box<dyn ByteSource + Send> = if buffered {
            Box::new(BufferedByteSource::from_file(path)?)
        } else {
            Box::new(InMemoryByteSource::from_file(path)?)
        };
        Ok(Self::new(source))
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn peek(&mut self) -> Option<u8> {
        (**self).peek()
    }

    fn next_byte(&mut self) -> Option<u8> {
        (**self).next_byte()
    }

    fn upcoming(&mut self, k: usize) -> Vec<u8> {
        (**self).upcoming(k)
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn is_eof(&mut self) -> bool {
        (**self).is_eof()
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new `ByteParser` from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it.
    #[inline(always)]
    pub fn peek(&mut self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Skips (consumes) all consecutive ASCII whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.next_byte();
            } else {
                break;
            }
        }
    }

    /// Consumes the current byte if it matches `ch` exactly.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&mut self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Returns a string from up to `k` bytes from the current position for
    /// error context. Invalid UTF-8 is replaced with the replacement character.
    pub fn get_context_as_string(&mut self, k: usize) -> String {
        let context_bytes = self.source.upcoming(k);
        String::from_utf8_lossy(&context_bytes).into_owned()
    }

    /// Parses an atom until any of the given delimiters (or EOF) is found.
    ///
    /// The delimiter itself is not consumed. Returns an empty string if the
    /// parser is positioned on a delimiter.
    pub fn parse_atom(&mut self, delimiters: &[u8]) -> String {
        let mut bytes = Vec::new();
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            bytes.push(b);
            self.next_byte();
        }

        match String::from_utf8(bytes) {
            Ok(atom) => atom,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}
