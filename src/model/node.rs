//! Node module for constituency tree representation.

use crate::model::category::{trace_index, Category};
use crate::model::tree::NodeId;

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// A node (constituent or terminal) of a constituency [Tree](crate::model::Tree).
///
/// # Invariants
/// - `id` is the index of this node in the tree arena
/// - `parent` is `None` exactly for the root
/// - `child_index` is the position among the parent's children (0 for the root)
/// - A node carries a `word` only if it has no children (preterminal)
/// - Terminals (nodes with a word) have a `terminal_index`; those that are not
///   empty categories also have a `token_index`
/// - `head` is a terminal in the subtree of this node; terminals are their own head
/// - `coindex` points to the antecedent of a trace or gapped constituent
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    category: Category,
    word: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    child_index: usize,
    terminal_index: Option<usize>,
    token_index: Option<usize>,
    head: NodeId,
    coindex: Option<NodeId>,
}

impl Node {
    /// Creates a new node without children and word, heading itself.
    pub(crate) fn new(id: NodeId, category: Category, parent: Option<NodeId>) -> Self {
        Node {
            id,
            category,
            word: None,
            parent,
            children: Vec::new(),
            child_index: 0,
            terminal_index: None,
            token_index: None,
            head: id,
            coindex: None,
        }
    }

    /// Index of this node in the tree arena.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The parsed category label.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Shortcut for the base category, e.g. `NP` for `NP-SBJ-1`.
    pub fn label(&self) -> &str {
        self.category.base()
    }

    /// The word of a terminal, `None` for constituents.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in left-to-right order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Position among the parent's children.
    pub fn child_index(&self) -> usize {
        self.child_index
    }

    /// Position among all terminals of the tree (empty categories included).
    pub fn terminal_index(&self) -> Option<usize> {
        self.terminal_index
    }

    /// Position among the tokens of the tree (empty categories excluded).
    pub fn token_index(&self) -> Option<usize> {
        self.token_index
    }

    /// Terminal heading this node.
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// Antecedent of this node, if it is a linked trace or gap.
    pub fn coindex(&self) -> Option<NodeId> {
        self.coindex
    }

    /// Whether this node is a terminal, i.e. carries a word.
    pub fn is_terminal(&self) -> bool {
        self.word.is_some()
    }

    /// Whether this node is a terminal that is an actual token.
    pub fn is_token(&self) -> bool {
        self.token_index.is_some()
    }

    /// Whether this node's category is `-NONE-`.
    pub fn is_empty_category(&self) -> bool {
        self.category.is_empty_category()
    }

    /// Whether this node is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Index this node refers to, if it is a trace (`*T*-1`) or gap (`NP=1`).
    pub fn referenced_index(&self) -> Option<u32> {
        if self.is_empty_category() {
            self.word.as_deref().and_then(trace_index)
        } else if !self.is_terminal() {
            self.category.gap_index()
        } else {
            None
        }
    }

    pub(crate) fn set_word(&mut self, word: String) {
        self.word = Some(word);
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId, child_index: usize) {
        self.parent = Some(parent);
        self.child_index = child_index;
    }

    pub(crate) fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }

    pub(crate) fn set_terminal_index(&mut self, index: usize) {
        self.terminal_index = Some(index);
    }

    pub(crate) fn set_token_index(&mut self, index: usize) {
        self.token_index = Some(index);
    }

    pub(crate) fn set_head(&mut self, head: NodeId) {
        self.head = head;
    }

    pub(crate) fn set_coindex(&mut self, antecedent: NodeId) {
        self.coindex = Some(antecedent);
    }
}
