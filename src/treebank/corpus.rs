//! Collections of parsed trees, addressable by source and tree index.

use crate::model::Tree;
use crate::parser::byte_parser::{ByteParser, ReadStrategy};
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use crate::parser::summary::ParseSummary;
use crate::treebank::parser::TreebankParser;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

// =#========================================================================#=
// TREE LOOKUP (Trait)
// =#========================================================================#=
/// Resolves `(source_id, tree index)` to a parsed tree.
///
/// Used by the PropBank parser to find the tree an annotation refers to.
pub trait TreeLookup {
    /// The tree with the given index in the given source, if known.
    fn lookup(&self, source_id: &str, index: usize) -> Option<Arc<Tree>>;
}

impl<T: TreeLookup + ?Sized> TreeLookup for &T {
    fn lookup(&self, source_id: &str, index: usize) -> Option<Arc<Tree>> {
        (**self).lookup(source_id, index)
    }
}

impl<T: TreeLookup + ?Sized> TreeLookup for Arc<T> {
    fn lookup(&self, source_id: &str, index: usize) -> Option<Arc<Tree>> {
        (**self).lookup(source_id, index)
    }
}

// =#========================================================================#=
// TREE CORPUS
// =#========================================================================#=
/// Trees of one or more sources, shared via `Arc`.
///
/// Trees are stored at their index within their source; indices of trees
/// that failed to parse stay empty.
///
/// # Example
/// ```
/// use treebank::treebank::{TreeCorpus, TreeLookup};
///
/// let mut corpus = TreeCorpus::new();
/// let summary = corpus.load_str("wsj_0001.mrg", "(S (NN a)) (S (NN b) c) (S (NN d))");
/// assert_eq!(summary.parsed, 2);
///
/// assert!(corpus.lookup("wsj_0001.mrg", 1).is_none());
/// assert_eq!(corpus.lookup("wsj_0001.mrg", 2).unwrap().words(), vec!["d"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeCorpus {
    sources: HashMap<String, Vec<Option<Arc<Tree>>>>,
}

impl TreeCorpus {
    /// Creates an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tree at its source and index, replacing any previous tree there.
    pub fn insert(&mut self, tree: Tree) -> Arc<Tree> {
        let tree = Arc::new(tree);
        let slots = self.sources.entry(tree.source_id().to_string()).or_default();
        if slots.len() <= tree.index() {
            slots.resize(tree.index() + 1, None);
        }
        slots[tree.index()] = Some(Arc::clone(&tree));
        tree
    }

    /// Parses all trees from the byte source with the given parser.
    ///
    /// Trees that fail to parse are skipped and reported in the summary.
    pub fn load<B: ByteSource>(&mut self, mut parser: TreebankParser, byte_parser: ByteParser<B>) -> ParseSummary {
        let (trees, summary) = parser.parse_all_lenient(byte_parser);
        for tree in trees {
            self.insert(tree);
        }
        log::info!("Loaded trees of {}: {summary}", parser.source_id());
        summary
    }

    /// Parses all trees of a string, using default parser settings.
    pub fn load_str(&mut self, source_id: &str, text: &str) -> ParseSummary {
        self.load(TreebankParser::new(source_id), ByteParser::for_str(text))
    }

    /// Parses all trees of a file, using default parser settings.
    ///
    /// The source is named by the file name (without directories).
    ///
    /// # Errors
    /// A [ParsingError] if the file cannot be read.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ParseSummary, ParsingError> {
        let path = path.as_ref();
        self.load_file_as(path, &source_id_for(path))
    }

    /// Parses all trees of a file under an explicit source name, e.g. the
    /// `wsj/00/wsj_0001.mrg` form used by annotation files.
    ///
    /// # Errors
    /// A [ParsingError] if the file cannot be read.
    pub fn load_file_as<P: AsRef<Path>>(&mut self, path: P, source_id: &str) -> Result<ParseSummary, ParsingError> {
        let byte_parser = ByteParser::from_file(path.as_ref(), ReadStrategy::default())?;
        Ok(self.load(TreebankParser::new(source_id), byte_parser))
    }

    /// The tree with the given index in the given source.
    pub fn get(&self, source_id: &str, index: usize) -> Option<&Arc<Tree>> {
        self.sources.get(source_id)?.get(index)?.as_ref()
    }

    /// All trees of a source, in order.
    pub fn trees(&self, source_id: &str) -> impl Iterator<Item = &Arc<Tree>> + '_ {
        self.sources
            .get(source_id)
            .into_iter()
            .flat_map(|slots| slots.iter().flatten())
    }

    /// Names of all sources, sorted.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of sources.
    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    /// Number of trees over all sources.
    pub fn num_trees(&self) -> usize {
        self.sources.values().map(|slots| slots.iter().flatten().count()).sum()
    }

    /// Whether the corpus holds no trees.
    pub fn is_empty(&self) -> bool {
        self.num_trees() == 0
    }
}

/// Falls back to the file name of `source_id` when there is no source of
/// that exact name, so `wsj/00/wsj_0001.mrg` finds a file loaded as
/// `wsj_0001.mrg`.
impl TreeLookup for TreeCorpus {
    fn lookup(&self, source_id: &str, index: usize) -> Option<Arc<Tree>> {
        if self.sources.contains_key(source_id) {
            return self.get(source_id, index).cloned();
        }
        let file_name = source_id_for(Path::new(source_id));
        if file_name != source_id {
            log::debug!("No source '{source_id}', trying '{file_name}'");
        }
        self.get(&file_name, index).cloned()
    }
}

impl Extend<Tree> for TreeCorpus {
    fn extend<I: IntoIterator<Item = Tree>>(&mut self, iter: I) {
        for tree in iter {
            self.insert(tree);
        }
    }
}

impl FromIterator<Tree> for TreeCorpus {
    fn from_iter<I: IntoIterator<Item = Tree>>(iter: I) -> Self {
        let mut corpus = TreeCorpus::new();
        corpus.extend(iter);
        corpus
    }
}

/// Source identifier for a file: its file name.
pub(crate) fn source_id_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut parser = TreebankParser::new("a.mrg");
        let trees = parser.parse_all(ByteParser::for_str("(S (NN x)) (S (NN y))")).unwrap();
        let corpus: TreeCorpus = trees.into_iter().collect();

        assert_eq!(corpus.num_sources(), 1);
        assert_eq!(corpus.num_trees(), 2);
        assert_eq!(corpus.lookup("a.mrg", 1).unwrap().words(), vec!["y"]);
        assert!(corpus.lookup("a.mrg", 2).is_none());
        assert!(corpus.lookup("b.mrg", 0).is_none());
    }

    #[test]
    fn test_several_sources() {
        let mut corpus = TreeCorpus::new();
        corpus.load_str("b.mrg", "(S (NN x))");
        corpus.load_str("a.mrg", "(S (NN y)) (S (NN z))");
        assert_eq!(corpus.source_ids(), vec!["a.mrg", "b.mrg"]);
        assert_eq!(corpus.trees("a.mrg").count(), 2);
        assert_eq!(corpus.trees("c.mrg").count(), 0);
    }

    #[test]
    fn test_source_id_for_path() {
        assert_eq!(source_id_for(Path::new("data/wsj/00/wsj_0001.mrg")), "wsj_0001.mrg");
    }

    #[test]
    fn test_lookup_by_relative_path() {
        let mut corpus = TreeCorpus::new();
        corpus.load_str("wsj_0001.mrg", "(S (NN x))");
        corpus.load_str("wsj/00/wsj_0002.mrg", "(S (NN y))");

        assert_eq!(corpus.lookup("wsj/00/wsj_0001.mrg", 0).unwrap().words(), vec!["x"]);
        assert_eq!(corpus.lookup("wsj/00/wsj_0002.mrg", 0).unwrap().words(), vec!["y"]);
        assert!(corpus.lookup("wsj_0002.mrg", 0).is_none());
        assert!(corpus.lookup("wsj/00/wsj_0003.mrg", 0).is_none());
    }
}
