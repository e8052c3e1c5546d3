//! PropBank and NomBank predicate-argument annotation.
//!
//! Annotation lines point into treebank trees: each line names a source
//! file, a tree index and a predicate terminal, followed by the roleset and
//! argument tokens addressing tree nodes as `terminal:height`. Trees are
//! found through a [TreeLookup], usually a
//! [TreeCorpus](crate::treebank::TreeCorpus).
//!
//! # Quick API
//! * [`parse_file`] - reads all instances of a file, skipping bad lines
//! * [`parse_str`] - same for in-memory text
//!
//! # Full API
//! * [`PropbankParser::parse_line`] - parse a single line
//! * [`PropbankReader`] - iterate over the instances of a file
//!
//! # Example
//! ```
//! use treebank::propbank;
//! use treebank::treebank::TreeCorpus;
//!
//! let mut corpus = TreeCorpus::new();
//! corpus.load_str("f.parse", "( (S (NP (NNP Pierre)) (VP (VBZ is))) )");
//!
//! let (instances, summary) =
//!     propbank::parse_str("f.parse 0 1 gold is.01 ----- 0:0-ARG0 1:0-rel", &corpus);
//! assert_eq!(instances.len(), 1);
//! assert_eq!(summary.skipped, 0);
//!
//! let arg0 = instances[0].argument("ARG0").unwrap();
//! assert_eq!(arg0.words(instances[0].tree()), vec!["Pierre"]);
//! ```

pub mod argument;
pub mod instance;
pub mod location;
mod parser;
mod reader;

pub use self::argument::Argument;
pub use self::instance::Instance;
pub use self::location::{ArgumentToken, NodeLocation};
pub use self::parser::{AnnotationFormat, PropbankParser};
pub use self::reader::PropbankReader;

use crate::parser::{ParseSummary, ParsingError};
use crate::treebank::TreeLookup;
use std::io::BufRead;
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Reads all instances of a PropBank file, sorted by tree and predicate.
///
/// Bad lines are skipped and reported in the [ParseSummary].
///
/// # Errors
/// A [ParsingError] if the file cannot be opened.
pub fn parse_file<P: AsRef<Path>, L: TreeLookup>(
    path: P,
    lookup: L,
) -> Result<(Vec<Instance>, ParseSummary), ParsingError> {
    let reader = PropbankReader::from_file(path, lookup)?;
    Ok(collect_sorted(reader))
}

/// Reads all instances of PropBank text, sorted by tree and predicate.
pub fn parse_str<L: TreeLookup>(text: &str, lookup: L) -> (Vec<Instance>, ParseSummary) {
    collect_sorted(PropbankReader::new(text.as_bytes(), lookup))
}

fn collect_sorted<R: BufRead, L: TreeLookup>(mut reader: PropbankReader<R, L>) -> (Vec<Instance>, ParseSummary) {
    let mut instances: Vec<Instance> = reader.by_ref().filter_map(Result::ok).collect();
    instances.sort();
    (instances, reader.into_summary())
}
