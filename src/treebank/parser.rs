//! Structs and logic to parse bracketed treebank trees.
//!
//! This module provides the [TreebankParser] struct, which offers methods
//! to parse files or single strings, as well as lazy parsing via a
//! [TreebankIterator].

use crate::heads::{HeadFinder, HeadRuleTable};
use crate::model::{BuildError, Category, RepairPolicy, Tree, TreeBuilder};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::lexer::{Lexer, Token};
use crate::parser::parsing_error::ParsingError;
use crate::parser::summary::ParseSummary;
use crate::treebank::index_linker::IndexLinker;
use std::sync::Arc;

/// States of the tree-reading state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a category label right after `(`
    ExpectCategory,
    /// Inside a constituent: expecting a word, a child, or `)`
    InNode,
}

// =#========================================================================#=
// TREEBANK PARSER
// =#========================================================================#=
/// Parser (configuration) for Penn Treebank style bracketed trees.
///
/// Each top-level bracket is one tree. Trees are numbered from 0 in the order
/// they appear, including trees that fail to parse, so indices stay aligned
/// with annotations referring to them. After reading, traces and gaps are
/// linked to their antecedents ([IndexLinker]) and heads are assigned
/// ([HeadFinder]).
///
/// # Configuration
/// * [`with_repairs(policy)`](Self::with_repairs)
///     - Which malformations are repaired (default: all, with a warning)
/// * [`with_head_rules(table)`](Self::with_head_rules)
///     - Head rules to use (default: [HeadRuleTable::english])
///
/// # Parsing
/// * [`parse_str`](Self::parse_str) - Parse a single tree from a string
/// * [`parse_tree`](Self::parse_tree) - Parse the next tree from a [Lexer]
/// * [`parse_all`](Self::parse_all) - Parse all trees eagerly, failing fast
/// * [`parse_all_lenient`](Self::parse_all_lenient) - Parse all trees, skipping bad ones
/// * [`into_iter`](Self::into_iter) - Parse trees lazily
///
/// # Example
/// ```
/// use treebank::parser::ByteParser;
/// use treebank::treebank::TreebankParser;
///
/// let input = "( (S (NP (NN Dogs)) (VP (VBP bark))) )\n( (S (NP (PRP They)) (VP (VBP sleep))) )";
/// let trees = TreebankParser::new("dogs.mrg")
///     .parse_all(ByteParser::for_str(input))
///     .unwrap();
///
/// assert_eq!(trees.len(), 2);
/// assert_eq!(trees[1].index(), 1);
/// assert_eq!(trees[1].words(), vec!["They", "sleep"]);
/// ```
#[derive(Debug, Clone)]
pub struct TreebankParser {
    source_id: String,
    next_index: usize,
    repairs: RepairPolicy,
    head_finder: HeadFinder,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl TreebankParser {
    /// Creates a parser for trees from the given source (e.g. file name).
    pub fn new<S: Into<String>>(source_id: S) -> Self {
        TreebankParser {
            source_id: source_id.into(),
            next_index: 0,
            repairs: RepairPolicy::default(),
            head_finder: HeadFinder::english(),
        }
    }

    /// Sets which malformations get repaired.
    pub fn with_repairs(mut self, repairs: RepairPolicy) -> Self {
        self.repairs = repairs;
        self
    }

    /// Sets the head rules.
    pub fn with_head_rules(mut self, rules: Arc<HeadRuleTable>) -> Self {
        self.head_finder = HeadFinder::new(rules);
        self
    }

    /// Identifier of the source being parsed.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Number of trees started so far (successful or not).
    pub fn num_trees_started(&self) -> usize {
        self.next_index
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl TreebankParser {
    /// Consumes the parser and returns an iterator over trees from the byte source.
    ///
    /// The iterator yields one `Result` per tree and continues after trees
    /// that fail to parse. The parser can be retrieved again via
    /// [TreebankIterator::into_parser].
    pub fn into_iter<B: ByteSource>(self, byte_parser: ByteParser<B>) -> TreebankIterator<B> {
        TreebankIterator {
            lexer: Lexer::new(byte_parser),
            parser: self,
            done: false,
        }
    }

    /// Parses all trees from the byte source until EOF.
    ///
    /// # Returns
    /// * `Ok(Vec<Tree>)` - All parsed trees
    /// * `Err(ParsingError)` - If any tree fails to parse
    pub fn parse_all<B: ByteSource>(&mut self, byte_parser: ByteParser<B>) -> Result<Vec<Tree>, ParsingError> {
        let mut lexer = Lexer::new(byte_parser);
        let mut trees = Vec::new();
        while let Some(tree) = self.parse_tree(&mut lexer)? {
            trees.push(tree);
        }
        Ok(trees)
    }

    /// Parses all trees from the byte source, skipping trees that fail.
    ///
    /// # Returns
    /// All successfully parsed trees and a [ParseSummary] with one diagnostic
    /// per skipped tree.
    pub fn parse_all_lenient<B: ByteSource>(&mut self, byte_parser: ByteParser<B>) -> (Vec<Tree>, ParseSummary) {
        let mut lexer = Lexer::new(byte_parser);
        let mut trees = Vec::new();
        let mut summary = ParseSummary::new();

        loop {
            match self.parse_tree(&mut lexer) {
                Ok(Some(tree)) => {
                    summary.record_parsed();
                    trees.push(tree);
                }
                Ok(None) => break,
                Err(err) => {
                    log::warn!("Skipping tree in {}: {err}", self.source_id);
                    summary.record_skipped(&err);
                    if err.is_io() || lexer.is_exhausted() {
                        break;
                    }
                }
            }
        }

        (trees, summary)
    }

    /// Parses a single tree from a string.
    ///
    /// # Errors
    /// A [ParsingError] if the string holds no tree or the tree is invalid.
    pub fn parse_str(&mut self, text: &str) -> Result<Tree, ParsingError> {
        let mut lexer = Lexer::new(ByteParser::for_str(text));
        match self.parse_tree(&mut lexer)? {
            Some(tree) => Ok(tree),
            None => Err(ParsingError::structure(lexer.byte_parser_mut(), BuildError::EmptyTree.to_string())),
        }
    }

    /// Parses the next tree from the lexer.
    ///
    /// Tokens outside of brackets are skipped with a warning. On a
    /// structural error, the remainder of the broken tree is skipped so the
    /// lexer is positioned at the next tree.
    ///
    /// # Returns
    /// * `Ok(Some(Tree))` - The next tree, linked and with heads assigned
    /// * `Ok(None)` - No further tree before end of input
    /// * `Err(ParsingError)` - If the tree is invalid
    pub fn parse_tree<B: ByteSource>(&mut self, lexer: &mut Lexer<B>) -> Result<Option<Tree>, ParsingError> {
        if !self.await_tree_start(lexer)? {
            return Ok(None);
        }

        let index = self.next_index;
        self.next_index += 1;

        let mut depth = 1;
        let mut builder = TreeBuilder::new().with_repairs(self.repairs);
        let built = self
            .read_constituents(lexer, &mut builder, &mut depth, index)
            .and_then(|()| builder.finish(&self.source_id, index).map_err(|e| structure_error(lexer, e)));

        let mut tree = match built {
            Ok(tree) => tree,
            Err(err) => {
                skip_to_tree_end(lexer, depth);
                return Err(err);
            }
        };

        IndexLinker::link(&mut tree)?;
        self.head_finder.assign_heads(&mut tree);

        Ok(Some(tree))
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl TreebankParser {
    /// Skips to the `(` opening the next tree; `false` at end of input.
    fn await_tree_start<B: ByteSource>(&self, lexer: &mut Lexer<B>) -> Result<bool, ParsingError> {
        loop {
            match lexer.next_token()? {
                None => return Ok(false),
                Some(Token::Open) => return Ok(true),
                Some(token) => log::warn!(
                    "Skipping '{token}' outside of a tree at byte {} of {}",
                    lexer.position(),
                    self.source_id
                ),
            }
        }
    }

    /// Reads tokens after the opening bracket until the tree's closing bracket.
    ///
    /// An outermost bracket followed directly by another bracket is an
    /// unlabeled wrapper and gets no node of its own; the builder then
    /// decides on the root.
    fn read_constituents<B: ByteSource>(
        &self,
        lexer: &mut Lexer<B>,
        builder: &mut TreeBuilder,
        depth: &mut usize,
        index: usize,
    ) -> Result<(), ParsingError> {
        let mut state = State::ExpectCategory;
        let mut labeled_root = false;

        loop {
            let Some(token) = lexer.next_token()? else {
                return Err(structure_error(lexer, BuildError::Unterminated(*depth)));
            };

            match (state, token) {
                (State::ExpectCategory, Token::Atom(label)) => {
                    if !Category::is_well_formed(&label) {
                        log::warn!(
                            "Unexpected category '{label}' in tree {index} of {}, accepting it",
                            self.source_id
                        );
                    }
                    builder.open(Category::parse(&label)).map_err(|e| structure_error(lexer, e))?;
                    labeled_root |= *depth == 1;
                    state = State::InNode;
                }
                (State::ExpectCategory, Token::Open) => {
                    // The bracket before this one has no label
                    if *depth > 1 {
                        log::warn!("Unlabeled constituent in tree {index} of {}", self.source_id);
                        builder.open(Category::unlabeled()).map_err(|e| structure_error(lexer, e))?;
                    }
                    *depth += 1;
                }
                (State::ExpectCategory, Token::Close) => {
                    *depth -= 1;
                    if *depth == 0 {
                        return Err(structure_error(lexer, BuildError::EmptyTree));
                    }
                    // `()`: an unlabeled, empty constituent
                    builder.open(Category::unlabeled()).map_err(|e| structure_error(lexer, e))?;
                    builder.close().map_err(|e| structure_error(lexer, e))?;
                    state = State::InNode;
                }
                (State::InNode, Token::Open) => {
                    *depth += 1;
                    state = State::ExpectCategory;
                }
                (State::InNode, Token::Atom(word)) => {
                    builder.word(word).map_err(|e| structure_error(lexer, e))?;
                }
                (State::InNode, Token::Close) => {
                    *depth -= 1;
                    if *depth > 0 || labeled_root {
                        builder.close().map_err(|e| structure_error(lexer, e))?;
                    }
                    if *depth == 0 {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn structure_error<B: ByteSource>(lexer: &mut Lexer<B>, err: BuildError) -> ParsingError {
    ParsingError::structure(lexer.byte_parser_mut(), err.to_string())
}

/// Skips tokens until the brackets of the current tree are balanced.
fn skip_to_tree_end<B: ByteSource>(lexer: &mut Lexer<B>, mut depth: usize) {
    while depth > 0 {
        match lexer.next_token() {
            Ok(Some(Token::Open)) => depth += 1,
            Ok(Some(Token::Close)) => depth -= 1,
            Ok(Some(Token::Atom(_))) => {}
            Ok(None) | Err(_) => break,
        }
    }
}

// =#========================================================================#=
// TREEBANK ITERATOR (lazy parser)
// =#========================================================================#=
/// Iterator to parse treebank trees.
///
/// Created by [TreebankParser::into_iter()].
/// Yields `Result<Tree, ParsingError>` for each tree; a tree that fails to
/// parse does not end the iteration.
///
/// After iteration, the underlying [TreebankParser] can be retrieved
/// via [into_parser()](Self::into_parser).
pub struct TreebankIterator<B: ByteSource> {
    parser: TreebankParser,
    lexer: Lexer<B>,
    done: bool,
}

impl<B: ByteSource> TreebankIterator<B> {
    /// Consumes the iterator and returns the underlying [TreebankParser].
    pub fn into_parser(self) -> TreebankParser {
        self.parser
    }
}

impl<B: ByteSource> Iterator for TreebankIterator<B> {
    type Item = Result<Tree, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.parser.parse_tree(&mut self.lexer) {
            Ok(Some(tree)) => Some(Ok(tree)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                if err.is_io() || self.lexer.is_exhausted() {
                    self.done = true;
                }
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsingErrorKind;

    fn parse(text: &str) -> Result<Tree, ParsingError> {
        TreebankParser::new("test.mrg").parse_str(text)
    }

    #[test]
    fn test_wrapper_with_single_child() {
        let tree = parse("( (S (NP (NN a)) (VP (VB b))) )").unwrap();
        assert_eq!(tree.root().label(), "S");
        assert_eq!(tree.root().parent(), None);
    }

    #[test]
    fn test_labeled_outer_bracket_is_kept() {
        let tree = parse("(ROOT (S (NN a)))").unwrap();
        assert_eq!(tree.root().label(), "ROOT");
        assert_eq!(tree.root().children().len(), 1);
    }

    #[test]
    fn test_wrapper_with_several_children() {
        let tree = parse("( (NP (NN a)) (. .) )").unwrap();
        assert!(tree.root().category().is_unlabeled());
        assert_eq!(tree.root().children().len(), 2);
        assert!(tree.is_valid());
    }

    #[test]
    fn test_unterminated_tree() {
        let err = parse("( (S (NP (NN a))").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorKind::Structure(msg) if msg.contains("unexpected end of input")));
    }

    #[test]
    fn test_empty_string_has_no_tree() {
        assert!(parse("   ").is_err());
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_stray_tokens_are_skipped() {
        let tree = parse("junk ) (S (NN a))").unwrap();
        assert_eq!(tree.root().label(), "S");
    }

    #[test]
    fn test_unlabeled_inner_constituent() {
        let tree = parse("(S ((NN a)) (VP (VB b)))").unwrap();
        let first = tree.root().children()[0];
        assert!(tree[first].category().is_unlabeled());
        assert_eq!(tree.num_terminals(), 2);
    }

    #[test]
    fn test_iterator_recovers_after_bad_tree() {
        let input = "(S (NN a))\n(S (NN b) c)\n(S (NN d))";
        let results: Vec<_> = TreebankParser::new("t").into_iter(ByteParser::for_str(input)).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        let last = results[2].as_ref().unwrap();
        assert_eq!(last.index(), 2);
        assert_eq!(last.words(), vec!["d"]);
    }

    #[test]
    fn test_parse_all_lenient_counts() {
        let input = "(S (NN a)) (S (NN b) c) (S (NN d)";
        let mut parser = TreebankParser::new("t");
        let (trees, summary) = parser.parse_all_lenient(ByteParser::for_str(input));
        assert_eq!(trees.len(), 1);
        assert_eq!(summary.parsed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(parser.num_trees_started(), 3);
    }

    #[test]
    fn test_strict_policy() {
        let mut parser = TreebankParser::new("t").with_repairs(RepairPolicy::strict());
        assert!(parser.parse_str("(NP (NNP New York))").is_err());
        assert!(parser.parse_str("(NP (NN (x)))").is_err());
    }
}
