//! Penn Treebank bracketed tree parsing.
//!
//! This module provides [`TreebankParser`] to parse bracketed constituency
//! trees into [`Tree`]s, linking coindexed traces ([`IndexLinker`]) and
//! assigning heads along the way. Parsed trees can be collected into a
//! [`TreeCorpus`] or consumed from a background [`TreeStream`].
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_file`] - parses a file, skipping broken trees
//! * [`parse_str`] - parses a single tree from a string
//!
//! # Full API
//! For more control, configure a [`TreebankParser`] and provide a [`ByteParser`]:
//! * [`TreebankParser::parse_tree`] - parse the next tree
//! * [`TreebankParser::parse_all`] - parse all trees until EOF
//! * [`TreebankParser::into_iter`] - obtain an iterator over trees
//!
//! # Format
//! * `tree ::= '(' [category] constituent* ')'`
//! * `constituent ::= '(' category (word | constituent+) ')'`
//! * Atoms (categories and words) are delimited by whitespace and parentheses
//! * Categories: `BASE(-TAG)*(-N)?(=N)?`, e.g. `NP-SBJ-1`; `-NONE-` marks
//!   empty categories such as traces (`*T*-1`)
//!
//! The outermost bracket is usually unlabeled, e.g. `( (S ...) )`. Several
//! trees may share a line or span many lines.
//!
//! Some malformed input is repaired (see [RepairPolicy]):
//! * `(NNP New York)` becomes `(NNP New) (NNP York)`
//! * `(NN (x))` is read as the terminal `NN` with the word `(x)`

mod corpus;
mod index_linker;
mod parser;
mod stream;

pub use self::corpus::{TreeCorpus, TreeLookup};
pub use self::index_linker::IndexLinker;
pub use self::parser::{TreebankIterator, TreebankParser};
pub use self::stream::{DEFAULT_CAPACITY, TreeStream};
pub use crate::model::RepairPolicy;

use crate::model::Tree;
use crate::parser::byte_parser::{ByteParser, ReadStrategy};
use crate::parser::{ParseSummary, ParsingError};
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a treebank file and returns all trees that parse, with a summary.
///
/// This is a convenience function using default settings. Trees that fail
/// to parse are skipped and reported in the [ParseSummary]; the source is
/// named by the file name.
///
/// # Arguments
/// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
///
/// # Returns
/// * `(Vec<Tree>, ParseSummary)` - Parsed trees and counts of parsed/skipped trees
/// * [`ParsingError`] - If the file cannot be read
///
/// # Example
/// ```no_run
/// use treebank::treebank::parse_file;
///
/// let (trees, summary) = parse_file("wsj_0001.mrg")?;
/// println!("{} trees ({summary})", trees.len());
/// # Ok::<(), treebank::parser::ParsingError>(())
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<(Vec<Tree>, ParseSummary), ParsingError> {
    let path = path.as_ref();
    let byte_parser = ByteParser::from_file(path, ReadStrategy::default())?;
    let mut parser = TreebankParser::new(corpus::source_id_for(path));
    Ok(parser.parse_all_lenient(byte_parser))
}

/// Parses a single tree from a string.
///
/// # Example
/// ```
/// use treebank::treebank::parse_str;
///
/// let tree = parse_str("( (S (NP-SBJ (PRP It)) (VP (VBZ works))) )").unwrap();
/// assert_eq!(tree.words(), vec!["It", "works"]);
/// ```
pub fn parse_str<S: AsRef<str>>(text: S) -> Result<Tree, ParsingError> {
    TreebankParser::new("<string>").parse_str(text.as_ref())
}
