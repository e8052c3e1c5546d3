//! Resolution of coindexed traces and gaps to their antecedents.
//!
//! Penn Treebank trees mark antecedents with a numeric category suffix
//! (`NP-SBJ-1`) and refer to them either from an empty category whose word
//! ends in the same number (`(-NONE- *T*-1)`) or from a gapped constituent
//! (`NP=1`). The [IndexLinker] stores the antecedent on each referring node.

use crate::model::{NodeId, Tree};
use crate::parser::ParsingError;

// =#========================================================================#=
// INDEX LINKER
// =#========================================================================#=
/// Links references to their coindexed antecedents within a tree.
///
/// The antecedent of a reference with index `N` is the first node in
/// document order, other than the reference itself, whose category
/// declares `-N`. Declaring nodes themselves get no link.
///
/// # Example
/// ```
/// use treebank::treebank::TreebankParser;
///
/// let tree = TreebankParser::new("t")
///     .parse_str("(S (NP-SBJ-1 (NNP John)) (VP (VBD tried) (S (NP-SBJ (-NONE- *-1)) (VP (TO to) (VP (VB go))))))")
///     .unwrap();
///
/// let trace = tree.terminal(2).unwrap();
/// assert_eq!(trace.word(), Some("*-1"));
/// assert_eq!(tree.antecedent(trace.id()).unwrap().category().text(), "NP-SBJ-1");
/// ```
pub struct IndexLinker;

impl IndexLinker {
    /// Links all references in the tree, returning the number of links made.
    ///
    /// # Errors
    /// A [Link](crate::parser::ParsingErrorKind::Link) error if a reference has
    /// no antecedent in the tree.
    pub fn link(tree: &mut Tree) -> Result<usize, ParsingError> {
        let mut declarations: Vec<(u32, NodeId)> = Vec::new();
        let mut references: Vec<(u32, NodeId)> = Vec::new();

        for node in tree.pre_order_iter() {
            if let Some(index) = node.category().coindex() {
                declarations.push((index, node.id()));
            }
            if let Some(index) = node.referenced_index() {
                references.push((index, node.id()));
            }
        }

        for &(index, reference) in &references {
            let antecedent = declarations
                .iter()
                .find(|&&(declared, id)| declared == index && id != reference)
                .map(|&(_, id)| id);

            match antecedent {
                Some(antecedent) => tree.node_mut(reference).set_coindex(antecedent),
                None => {
                    let node = &tree[reference];
                    let shown = node.word().unwrap_or(node.category().text());
                    return Err(ParsingError::missing_antecedent(format!(
                        "no constituent declares index {index} for '{shown}' in tree {} of {}",
                        tree.index(),
                        tree.source_id()
                    )));
                }
            }
        }

        Ok(references.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, TreeBuilder};
    use crate::parser::ParsingErrorKind;

    fn build(nodes: &[(&str, Option<&str>, usize)]) -> Tree {
        // (category, word, number of closes after this node)
        let mut builder = TreeBuilder::new();
        for &(category, word, closes) in nodes {
            builder.open(Category::parse(category)).unwrap();
            if let Some(word) = word {
                builder.word(word.to_string()).unwrap();
            }
            for _ in 0..closes {
                builder.close().unwrap();
            }
        }
        builder.finish("t", 0).unwrap()
    }

    #[test]
    fn test_trace_links_to_declaration() {
        let mut tree = build(&[
            ("S", None, 0),
            ("WHNP-2", None, 0),
            ("WP", Some("what"), 2),
            ("VP", None, 0),
            ("VB", Some("see"), 1),
            ("NP", None, 0),
            ("-NONE-", Some("*T*-2"), 4),
        ]);
        assert_eq!(IndexLinker::link(&mut tree).unwrap(), 1);

        let trace = tree.terminal(2).unwrap();
        assert_eq!(tree.antecedent(trace.id()).unwrap().label(), "WHNP");
        // Declarations get no link
        assert!(tree.pre_order_iter().filter(|n| n.label() == "WHNP").all(|n| n.coindex().is_none()));
    }

    #[test]
    fn test_gap_links_to_declaration() {
        let mut tree = build(&[
            ("S", None, 0),
            ("NP-1", None, 0),
            ("NN", Some("a"), 2),
            ("NP=1", None, 0),
            ("NN", Some("b"), 3),
        ]);
        IndexLinker::link(&mut tree).unwrap();
        let gapped = tree.pre_order_iter().find(|n| n.category().gap_index().is_some()).unwrap();
        assert_eq!(tree.antecedent(gapped.id()).unwrap().category().text(), "NP-1");
    }

    #[test]
    fn test_missing_antecedent() {
        let mut tree = build(&[("S", None, 0), ("NP", None, 0), ("-NONE-", Some("*-3"), 3)]);
        let err = IndexLinker::link(&mut tree).unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorKind::Link(msg) if msg.contains("index 3")));
    }

    #[test]
    fn test_unindexed_empty_categories_are_ignored() {
        let mut tree = build(&[("S", None, 0), ("NP", None, 0), ("-NONE-", Some("*"), 2), ("VB", Some("go"), 2)]);
        assert_eq!(IndexLinker::link(&mut tree).unwrap(), 0);
    }
}
