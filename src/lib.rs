//! Treebank is a library to parse Penn Treebank constituency trees and
//! PropBank/NomBank predicate-argument annotation on top of them.
//!
//! Core functionality provided:
//! - Treebank: Parse bracketed trees (`.mrg`/`.parse` files) into arena
//!   [Tree]s, repairing common breakage and skipping broken trees.
//! - Coindexation: Traces such as `(-NONE- *T*-1)` and gapping indices
//!   `NP=2` are linked to the constituent declaring the index
//!   (see [IndexLinker](treebank::IndexLinker)).
//! - Heads: Every constituent gets a head terminal from a head-rule table,
//!   with Collins-style English rules built in (see [crate::heads]).
//! - PropBank: Parse annotation lines into [Instance]s whose arguments
//!   point at tree nodes (see [crate::propbank]).
//! - Streaming: Parse trees on a background thread and consume them
//!   through a bounded channel (see [TreeStream](treebank::TreeStream)).
//! - Tree model: Arena of [Node](model::Node)s addressed by
//!   [NodeId](model::NodeId); see [crate::model] for details.
//!
//! Limitations:
//! - Trees are read-only once built
//! - Only the English head rules are built in; others are read from files
//!
//! # Usage patterns
//! 1. Quick functions with default settings, see below and
//!    [crate::treebank] / [crate::propbank].
//! 2. Configure a [TreebankParser](treebank::TreebankParser) or
//!    [PropbankParser](propbank::PropbankParser) for full control over
//!    repairs, head rules and line format.
//!
//! ## Example Default Configuration
//!
//! Parse a single tree:
//! ```
//! use treebank::parse_tree_str;
//!
//! let tree = parse_tree_str("( (S (NP (NNP Pierre)) (VP (VBZ is)) (. .)) )").unwrap();
//! assert_eq!(tree.num_tokens(), 3);
//! assert_eq!(tree.root().label(), "S");
//! ```
//!
//! Parse a treebank and its annotation:
//! ```no_run
//! use treebank::parse_propbank_file;
//! use treebank::treebank::TreeCorpus;
//!
//! let mut corpus = TreeCorpus::new();
//! corpus.load_file("wsj_0001.mrg")?;
//! let (instances, summary) = parse_propbank_file("prop.txt", &corpus)?;
//! println!("{} instances ({summary})", instances.len());
//! # Ok::<(), treebank::parser::ParsingError>(())
//! ```

pub mod heads;
pub mod model;
pub mod parser;
pub mod propbank;
pub mod treebank;

use crate::model::Tree;
use crate::parser::{ParseSummary, ParsingError};
use crate::propbank::Instance;
use crate::treebank::TreeLookup;
use std::path::Path;

// ============================================================================
// Quick Treebank API
// ============================================================================
/// Parses a single bracketed tree using default settings.
///
/// See [`treebank::parse_str`] for full documentation.
pub fn parse_tree_str<S: AsRef<str>>(text: S) -> Result<Tree, ParsingError> {
    treebank::parse_str(text)
}

/// Parses all trees of a treebank file using default settings, skipping
/// broken trees.
///
/// See [`treebank::parse_file`] for full documentation.
pub fn parse_treebank_file<P: AsRef<Path>>(path: P) -> Result<(Vec<Tree>, ParseSummary), ParsingError> {
    treebank::parse_file(path)
}

// ============================================================================
// Quick PropBank API
// ============================================================================
/// Parses all instances of a PropBank file against already loaded trees.
///
/// See [`propbank::parse_file`] for full documentation.
pub fn parse_propbank_file<P: AsRef<Path>, L: TreeLookup>(
    path: P,
    lookup: L,
) -> Result<(Vec<Instance>, ParseSummary), ParsingError> {
    propbank::parse_file(path, lookup)
}
