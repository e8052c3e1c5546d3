//! Tokenizer for bracketed constituency-tree text.
//!
//! The [Lexer] splits text on parentheses and whitespace into a lazy stream
//! of [Token]s. End of input is reported once as `Ok(None)`; asking for
//! another token afterwards is a [Lex](crate::parser::ParsingErrorKind::Lex)
//! error.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use std::fmt;

/// Atom delimiters: parentheses and whitespace
const ATOM_DELIMITERS: &[u8] = b"() \t\n\r\x0b\x0c";

/// A single lexical token of bracketed tree text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `(`
    Open,
    /// `)`
    Close,
    /// Category label or word.
    Atom(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Atom(atom) => write!(f, "{atom}"),
        }
    }
}

// =#========================================================================#=
// LEXER
// =#========================================================================#=
/// Pull-based tokenizer over a [ByteParser].
///
/// # Example
/// ```
/// use treebank::parser::ByteParser;
/// use treebank::parser::lexer::{Lexer, Token};
///
/// let mut lexer = Lexer::new(ByteParser::for_str("(NN dog)"));
/// assert_eq!(lexer.next_token().unwrap(), Some(Token::Open));
/// assert_eq!(lexer.next_token().unwrap(), Some(Token::Atom("NN".into())));
/// assert_eq!(lexer.next_token().unwrap(), Some(Token::Atom("dog".into())));
/// assert_eq!(lexer.next_token().unwrap(), Some(Token::Close));
/// assert_eq!(lexer.next_token().unwrap(), None);
/// assert!(lexer.next_token().is_err());
/// ```
pub struct Lexer<S: ByteSource> {
    byte_parser: ByteParser<S>,
    exhausted: bool,
}

impl<S: ByteSource> Lexer<S> {
    /// Creates a lexer reading from the given byte parser.
    pub fn new(byte_parser: ByteParser<S>) -> Self {
        Self {
            byte_parser,
            exhausted: false,
        }
    }

    /// Returns the next token, `Ok(None)` at end of input.
    ///
    /// # Errors
    /// A [Lex](crate::parser::ParsingErrorKind::Lex) error if called again
    /// after end of input was already reported.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParsingError> {
        if self.exhausted {
            return Err(ParsingError::lex(&mut self.byte_parser, "read past end of input"));
        }

        self.byte_parser.skip_whitespace();
        let token = match self.byte_parser.peek() {
            None => {
                self.exhausted = true;
                return Ok(None);
            }
            Some(b'(') => {
                self.byte_parser.next_byte();
                Token::Open
            }
            Some(b')') => {
                self.byte_parser.next_byte();
                Token::Close
            }
            Some(_) => Token::Atom(self.byte_parser.parse_atom(ATOM_DELIMITERS)),
        };

        Ok(Some(token))
    }

    /// Whether end of input has already been reported.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Current byte offset in the input.
    pub fn position(&self) -> usize {
        self.byte_parser.position()
    }

    /// Access to the underlying byte parser, e.g. for error context.
    pub fn byte_parser_mut(&mut self) -> &mut ByteParser<S> {
        &mut self.byte_parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsingErrorKind;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(ByteParser::for_str(input));
        let mut out = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    #[test]
    fn test_tokenize_tree() {
        let toks = tokens("( (S (NP-SBJ (NNP Pierre))\n\t(. .)) )");
        let rendered: Vec<String> = toks.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["(", "(", "S", "(", "NP-SBJ", "(", "NNP", "Pierre", ")", ")", "(", ".", ".", ")", ")", ")"]
        );
    }

    #[test]
    fn test_empty_input_is_end() {
        assert!(tokens("   \n ").is_empty());
    }

    #[test]
    fn test_read_past_end_is_lex_error() {
        let mut lexer = Lexer::new(ByteParser::for_str("x"));
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Atom("x".to_string())));
        assert_eq!(lexer.next_token().unwrap(), None);
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorKind::Lex(_)));
    }

    #[test]
    fn test_atoms_touching_brackets() {
        let toks = tokens("(NN(x)y)");
        assert_eq!(toks.len(), 7);
        assert_eq!(toks[4], Token::Close);
        assert_eq!(toks[5], Token::Atom("y".to_string()));
    }
}
