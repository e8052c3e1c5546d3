//! Error types for treebank, head-rule and annotation parsing.
//!
//! This module provides [ParsingError] and [ParsingErrorKind] for
//! representing and reporting errors that occur while reading trees,
//! head-rule tables and PropBank annotation lines. Each tree and each
//! annotation line is an isolated unit of failure: an error is fatal for
//! that unit only.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use std::fmt;
use thiserror::Error;

/// Default length of context provided by error from parser
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR KIND
// =#========================================================================#=
/// Error kinds that can occur during parsing.
#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum ParsingErrorKind {
    /// Malformed character stream, e.g. reading past the end of input.
    #[error("Malformed input - {0}")]
    Lex(String),

    /// Unbalanced brackets or otherwise invalid tree shape.
    #[error("Invalid tree structure - {0}")]
    Structure(String),

    /// A coindexed reference without a matching declaration.
    #[error("Missing antecedent - {0}")]
    Link(String),

    /// Unparsable or inconsistent annotation line.
    #[error("Invalid annotation - {0}")]
    Annotation(String),

    /// Malformed head-rule description.
    #[error("Invalid head rule - {0}")]
    HeadRule(String),

    /// Underlying I/O failure.
    #[error("IO error - {0}")]
    Io(String),
}

/// Where in the input an error occurred.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorLocation {
    /// No position available (e.g. I/O errors).
    Unknown,
    /// Byte offset into bracketed tree text.
    Byte(usize),
    /// 1-based line number of a line-oriented input.
    Line(usize),
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================$=
/// Parsing error with contextual information (location and surrounding text).
#[derive(Debug, Clone)]
pub struct ParsingError {
    kind: ParsingErrorKind,
    location: ErrorLocation,
    context: String,
}

impl ParsingError {
    /// Create a ParsingError from an error kind and byte parser state.
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorKind, parser: &mut ByteParser<S>) -> Self {
        Self {
            kind,
            location: ErrorLocation::Byte(parser.position()),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Create a ParsingError for a line of line-oriented input.
    pub fn at_line(kind: ParsingErrorKind, line_number: usize, line: &str) -> Self {
        Self {
            kind,
            location: ErrorLocation::Line(line_number),
            context: line.trim_end().chars().take(2 * DEFAULT_CONTEXT_LENGTH).collect(),
        }
    }

    /// Create a ParsingError without context (for errors found after reading).
    pub fn without_context(kind: ParsingErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::Unknown,
            context: String::new(),
        }
    }

    /// Convenience constructor for a structure error at the parser position.
    pub fn structure<S: ByteSource>(parser: &mut ByteParser<S>, msg: impl Into<String>) -> Self {
        Self::from_parser(ParsingErrorKind::Structure(msg.into()), parser)
    }

    /// Convenience constructor for a lex error at the parser position.
    pub fn lex<S: ByteSource>(parser: &mut ByteParser<S>, msg: impl Into<String>) -> Self {
        Self::from_parser(ParsingErrorKind::Lex(msg.into()), parser)
    }

    /// Convenience constructor for a link error (tree already read).
    pub fn missing_antecedent(msg: impl Into<String>) -> Self {
        Self::without_context(ParsingErrorKind::Link(msg.into()))
    }

    /// Convenience constructor for an annotation error without line info.
    pub fn annotation(msg: impl Into<String>) -> Self {
        Self::without_context(ParsingErrorKind::Annotation(msg.into()))
    }

    /// Attaches line information, keeping an already known location.
    pub fn with_line(mut self, line_number: usize, line: &str) -> Self {
        if self.location == ErrorLocation::Unknown {
            self.location = ErrorLocation::Line(line_number);
            self.context = line.trim_end().chars().take(2 * DEFAULT_CONTEXT_LENGTH).collect();
        }
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorKind {
        &self.kind
    }

    /// Get the location where the error occurred
    pub fn location(&self) -> ErrorLocation {
        self.location
    }

    /// Whether the error was caused by I/O rather than by content.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ParsingErrorKind::Io(_))
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        match self.location {
            ErrorLocation::Unknown => {}
            ErrorLocation::Byte(pos) => write!(f, " at position {pos}")?,
            ErrorLocation::Line(line) => write!(f, " on line {line}")?,
        }

        if !self.context.is_empty() {
            write!(f, "\n  Context: {}", self.context)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        ParsingError::without_context(ParsingErrorKind::Io(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line() {
        let err = ParsingError::annotation("overlapping arguments ARG0 and ARG1")
            .with_line(3, "f.parse 0 1 gold is.01 ----- 0:0-ARG0 0:0-ARG1\n");
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid annotation - overlapping arguments"));
        assert!(msg.contains("on line 3"));
        assert!(msg.contains("is.01"));
        assert_eq!(err.location(), ErrorLocation::Line(3));
    }

    #[test]
    fn test_display_with_position() {
        let mut parser = ByteParser::for_str("(S (NP x)");
        let err = ParsingError::structure(&mut parser, "unexpected end of input");
        assert_eq!(err.location(), ErrorLocation::Byte(0));
        assert!(err.to_string().contains("at position 0"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: ParsingError = io.into();
        assert!(err.is_io());
    }
}
