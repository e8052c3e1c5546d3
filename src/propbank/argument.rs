//! Semantic-role arguments of a predicate.

use crate::model::{NodeId, Tree};
use std::collections::BTreeSet;

/// Label of the predicate itself.
pub const PREDICATE_LABEL: &str = "rel";

/// Prefix of continuation (discontinuous) arguments.
pub const CONTINUATION_PREFIX: &str = "C-";

/// Prefix of reference arguments (resolved `LINK-SLC`).
pub const REFERENCE_PREFIX: &str = "R-";

/// An argument: a label over one or more tree nodes.
///
/// Discontinuous arguments keep their further pieces as `continuations`,
/// each labelled `C-<label>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    label: String,
    nodes: Vec<NodeId>,
    continuations: Vec<Argument>,
    probability: f64,
}

impl Argument {
    /// Creates an argument over the given nodes (duplicates removed, order kept).
    pub fn new<S: Into<String>>(label: S, nodes: Vec<NodeId>) -> Self {
        let mut argument = Argument {
            label: label.into(),
            nodes: Vec::with_capacity(nodes.len()),
            continuations: Vec::new(),
            probability: 1.0,
        };
        argument.add_nodes(nodes);
        argument
    }

    /// Sets the confidence of this argument.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// The role label, e.g. `ARG0`, `ARGM-LOC`, `R-ARG1`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label without `C-`/`R-` prefix.
    pub fn base_label(&self) -> &str {
        self.label
            .strip_prefix(CONTINUATION_PREFIX)
            .or_else(|| self.label.strip_prefix(REFERENCE_PREFIX))
            .unwrap_or(&self.label)
    }

    /// Nodes of the main span, in annotation order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Discontinuous further pieces.
    pub fn continuations(&self) -> &[Argument] {
        &self.continuations
    }

    /// Confidence, 1.0 for gold annotation.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Whether this is the predicate (`rel`).
    pub fn is_predicate(&self) -> bool {
        self.label == PREDICATE_LABEL
    }

    /// Nodes of the main span and all continuations.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut nodes = self.nodes.clone();
        for continuation in &self.continuations {
            nodes.extend(continuation.all_nodes());
        }
        nodes
    }

    /// Terminal indices covered by this argument, continuations included.
    pub fn terminal_indices(&self, tree: &Tree) -> BTreeSet<usize> {
        self.all_nodes()
            .into_iter()
            .flat_map(|id| tree.terminal_span(id))
            .collect()
    }

    /// Token indices covered by this argument, continuations included.
    pub fn token_indices(&self, tree: &Tree) -> BTreeSet<usize> {
        self.all_nodes()
            .into_iter()
            .flat_map(|id| tree.token_span(id))
            .collect()
    }

    /// Surface words covered by this argument, in sentence order.
    pub fn words<'a>(&self, tree: &'a Tree) -> Vec<&'a str> {
        self.token_indices(tree)
            .into_iter()
            .filter_map(|i| tree.token(i).and_then(|n| n.word()))
            .collect()
    }

    pub(crate) fn add_nodes(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            if !self.nodes.contains(&node) {
                self.nodes.push(node);
            }
        }
    }

    pub(crate) fn add_continuation(&mut self, continuation: Argument) {
        if !self.continuations.iter().any(|c| c.nodes == continuation.nodes) {
            self.continuations.push(continuation);
        }
    }

    /// Merges another argument with the same label into this one.
    pub(crate) fn merge(&mut self, other: Argument) {
        self.add_nodes(other.nodes);
        for continuation in other.continuations {
            self.add_continuation(continuation);
        }
        self.probability = self.probability.min(other.probability);
    }
}
