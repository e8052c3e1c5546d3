//! Tree module for constituency tree representation.
//!
//! This module provides the core data structure for representing parsed treebank trees:
//! - `Tree`: The main tree structure using the arena pattern on [Node].
//! - `NodeId` is used to index nodes.
//!
//! Parent, children, head and antecedent links are all stored as [NodeId]s, so a
//! tree has a single owner and can be shared read-only (e.g. behind an `Arc`).

use crate::model::node::Node;
use std::fmt;

/// Index of a node in a tree (arena).
pub type NodeId = usize;

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A constituency tree represented using the arena pattern on [Node].
///
/// Nodes are stored in a contiguous vector and referenced by [NodeId].
///
/// # Structure
/// - All nodes (root, constituents and terminals) are stored in the arena
/// - Index of root is maintained; the root may be a synthetic unlabeled node
///   if the source wrapped several constituents in one outer bracket
/// - Terminals are additionally listed in order, once including empty
///   categories (`terminal`) and once excluding them (`token`)
/// - A tree knows where it came from: `source_id` and its 0-based `index` there
///
/// Trees are built by the [TreeBuilder](crate::model::TreeBuilder) and are
/// read-only afterwards. Test validity with [Tree::is_valid].
///
/// # Example
/// ```
/// use treebank::treebank::TreebankParser;
///
/// let tree = TreebankParser::new("wsj_0001.mrg")
///     .parse_str("( (S (NP-SBJ (NNP John)) (VP (VBZ sleeps)) (. .)) )")
///     .unwrap();
///
/// assert_eq!(tree.root().label(), "S");
/// assert_eq!(tree.num_terminals(), 3);
/// assert_eq!(tree.words(), vec!["John", "sleeps", "."]);
/// assert!(tree.is_valid());
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Nodes of this tree (arena pattern)
    nodes: Vec<Node>,

    /// Index of the root of this tree
    root_id: NodeId,

    /// Identifier of the source (usually the file name)
    source_id: String,

    /// Position of this tree within its source (0-based)
    index: usize,

    /// Terminal index -> node
    terminals: Vec<NodeId>,

    /// Token index -> node
    tokens: Vec<NodeId>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Tree {
    /// Assembles a tree from a fully linked arena.
    ///
    /// Terminal and token tables are derived from the indices stored on the nodes.
    pub(crate) fn from_parts(nodes: Vec<Node>, root_id: NodeId, source_id: &str, index: usize) -> Self {
        let mut terminals: Vec<(usize, NodeId)> = nodes
            .iter()
            .filter_map(|n| n.terminal_index().map(|t| (t, n.id())))
            .collect();
        terminals.sort_unstable();
        let mut tokens: Vec<(usize, NodeId)> = nodes
            .iter()
            .filter_map(|n| n.token_index().map(|t| (t, n.id())))
            .collect();
        tokens.sort_unstable();

        Tree {
            nodes,
            root_id,
            source_id: source_id.to_string(),
            index,
            terminals: terminals.into_iter().map(|(_, id)| id).collect(),
            tokens: tokens.into_iter().map(|(_, id)| id).collect(),
        }
    }

    /// Identifier of the source this tree was read from.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Position of this tree within its source (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a reference to the root node.
    pub fn root(&self) -> &Node {
        &self[self.root_id]
    }

    /// Returns the index of the root node.
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Returns the node with the given index, `None` if out of bounds.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Returns all nodes in arena order (not document order).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of nodes in this tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of terminals, empty categories included.
    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    /// Returns the number of tokens, empty categories excluded.
    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the node of the terminal with the given terminal index.
    pub fn terminal(&self, terminal_index: usize) -> Option<&Node> {
        self.terminals.get(terminal_index).map(|&id| &self[id])
    }

    /// Returns the node index of the terminal with the given terminal index.
    pub fn terminal_id(&self, terminal_index: usize) -> Option<NodeId> {
        self.terminals.get(terminal_index).copied()
    }

    /// Returns the node of the token with the given token index.
    pub fn token(&self, token_index: usize) -> Option<&Node> {
        self.tokens.get(token_index).map(|&id| &self[id])
    }

    /// Terminals in order, empty categories included.
    pub fn terminals(&self) -> impl Iterator<Item = &Node> + '_ {
        self.terminals.iter().map(move |&id| &self[id])
    }

    /// Tokens in order, empty categories excluded.
    pub fn tokens(&self) -> impl Iterator<Item = &Node> + '_ {
        self.tokens.iter().map(move |&id| &self[id])
    }

    /// Words of all tokens (the sentence without empty categories).
    pub fn words(&self) -> Vec<&str> {
        self.tokens().filter_map(|n| n.word()).collect()
    }

    /// Walks `levels` steps up from the given node.
    ///
    /// Returns `None` if the walk passes the root.
    pub fn ancestor(&self, id: NodeId, levels: usize) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..levels {
            current = self.node(current)?.parent()?;
        }
        self.node(current).map(|n| n.id())
    }

    /// Number of edges between the given node and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self[current].parent() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Nodes from the given node up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self[current].parent() {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Whether `ancestor` dominates (or is) `descendant`.
    pub fn dominates(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.path_to_root(descendant).contains(&ancestor)
    }

    /// Lowest common ancestor of two nodes.
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let path_a = self.path_to_root(a);
        self.path_to_root(b)
            .into_iter()
            .find(|id| path_a.contains(id))
            .unwrap_or(self.root_id)
    }

    /// Terminals dominated by the given node, in order.
    pub fn terminals_under(&self, id: NodeId) -> Vec<&Node> {
        self.pre_order_from(id).filter(|n| n.is_terminal()).collect()
    }

    /// Terminal indices covered by the given node, in order.
    pub fn terminal_span(&self, id: NodeId) -> Vec<usize> {
        self.pre_order_from(id).filter_map(|n| n.terminal_index()).collect()
    }

    /// Token indices covered by the given node, in order.
    pub fn token_span(&self, id: NodeId) -> Vec<usize> {
        self.pre_order_from(id).filter_map(|n| n.token_index()).collect()
    }

    /// Location of a node as `(terminal, height)`: its leftmost terminal and the
    /// number of levels to walk up from there to reach the node.
    pub fn location_of(&self, id: NodeId) -> Option<(usize, usize)> {
        let first = self.pre_order_from(id).find(|n| n.is_terminal())?;
        let terminal = first.terminal_index()?;
        Some((terminal, self.depth(first.id()) - self.depth(id)))
    }

    /// Head terminal of the given node.
    pub fn head_of(&self, id: NodeId) -> &Node {
        &self[self[id].head()]
    }

    /// Antecedent of a linked trace or gapped constituent.
    pub fn antecedent(&self, id: NodeId) -> Option<&Node> {
        self.node(id)?.coindex().map(|target| &self[target])
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and the root has no parent
    /// - All node ids match their position in the arena
    /// - All children point back to their parent at the right position
    /// - Nodes with a word have no children, other nodes have children
    /// - Terminal and token tables are contiguous and consistent
    /// - Heads are the node itself or terminals dominated by it
    /// - Antecedents are valid node indices
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if self.root_id >= self.nodes.len() || !self.nodes[self.root_id].is_root() {
            return false;
        }

        for (id, node) in self.nodes.iter().enumerate() {
            if node.id() != id {
                return false;
            }

            // Only the root lacks a parent
            if node.is_root() && id != self.root_id {
                return false;
            }

            for (position, &child) in node.children().iter().enumerate() {
                match self.nodes.get(child) {
                    Some(c) if c.parent() == Some(id) && c.child_index() == position => {}
                    _ => return false,
                }
            }

            if node.is_terminal() != node.children().is_empty() {
                return false;
            }

            // Heads are unset (self) until head finding ran
            match self.nodes.get(node.head()) {
                Some(head) if head.id() == id => {}
                Some(head) if head.is_terminal() && self.dominates(id, head.id()) => {}
                _ => return false,
            }

            if node.coindex().is_some_and(|target| target >= self.nodes.len()) {
                return false;
            }
        }

        let terminals_ok = self
            .terminals
            .iter()
            .enumerate()
            .all(|(i, &id)| self[id].terminal_index() == Some(i));
        let tokens_ok = self
            .tokens
            .iter()
            .enumerate()
            .all(|(i, &id)| self[id].token_index() == Some(i) && !self[id].is_empty_category());

        // Every reachable node is in the arena exactly once
        terminals_ok && tokens_ok && self.pre_order_iter().count() == self.nodes.len()
    }

    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Post-order traversal visits each node's children before visiting the node itself.
    /// This is useful for aggregating data from terminals upward, e.g. heads.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root_id)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Pre-order traversal visits each node before visiting its children,
    /// i.e. in document order.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root_id)
    }

    /// Pre-order traversal of the subtree rooted at the given node.
    pub fn pre_order_from(&self, id: NodeId) -> PreOrderIter<'_> {
        PreOrderIter::new(self, id)
    }
}

impl std::ops::Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
impl Tree {
    /// Converts the tree to Penn Treebank format, wrapped in an unlabeled
    /// outer bracket unless the root already is one.
    ///
    /// # Example
    /// ```
    /// use treebank::treebank::TreebankParser;
    ///
    /// let tree = TreebankParser::new("t").parse_str("(S (NP (NN dogs)) (VP (VBP bark)))").unwrap();
    /// assert_eq!(tree.to_bracketed(), "( (S (NP (NN dogs)) (VP (VBP bark))) )");
    /// ```
    pub fn to_bracketed(&self) -> String {
        if self.root().category().is_unlabeled() {
            self.to_string()
        } else {
            format!("( {self} )")
        }
    }

    /// Renders the subtree of a node in bracketed form.
    pub fn subtree_to_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    /// Returns a visual, indented representation of the tree.
    ///
    /// # Example Output
    /// ```text
    /// [0] S
    ///   ├─ [1] NP-SBJ
    ///   │   └─ [2] NNP "John"
    ///   └─ [3] VBZ "sleeps"
    /// ```
    pub fn to_indented_string(&self) -> String {
        let mut out = String::new();
        self.write_indented(&mut out, self.root_id, "", true);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        let node = &self[id];
        out.push('(');
        out.push_str(node.category().text());

        if let Some(word) = node.word() {
            out.push(' ');
            out.push_str(word);
        }
        for &child in node.children() {
            out.push(' ');
            self.write_node(out, child);
        }

        out.push(')');
    }

    fn write_indented(&self, out: &mut String, id: NodeId, prefix: &str, is_last: bool) {
        let node = &self[id];
        let connector = if prefix.is_empty() { "" } else if is_last { "└─ " } else { "├─ " };

        out.push_str(&format!("{prefix}{connector}[{id}] {}", node.category()));
        if let Some(word) = node.word() {
            out.push_str(&format!(" \"{word}\""));
        }
        out.push('\n');

        let new_prefix = if prefix.is_empty() {
            "  ".to_string()
        } else {
            format!("{}{}  ", prefix, if is_last { " " } else { "│" })
        };
        let count = node.children().len();
        for (i, &child) in node.children().iter().enumerate() {
            self.write_indented(out, child, &new_prefix, i + 1 == count);
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.subtree_to_string(self.root_id))
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each node is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if start < tree.nodes.len() {
            stack.push((start, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            if children_visited || node.children().is_empty() {
                return Some(node);
            } else {
                self.stack.push((index, true));

                // Push children right to left, so left is processed first
                for &child in node.children().iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each node is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if start < tree.nodes.len() {
            stack.push(start);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];

        // Push children right to left, so left is processed first
        self.stack.extend(node.children().iter().rev());

        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treebank::TreebankParser;

    fn parse(text: &str) -> Tree {
        TreebankParser::new("test.mrg").parse_str(text).unwrap()
    }

    #[test]
    fn test_terminal_and_token_tables() {
        let tree = parse("( (S (NP-SBJ-1 (NNP John)) (VP (VBD tried) (S (NP-SBJ (-NONE- *-1)) (VP (TO to) (VP (VB leave)))))) )");
        assert_eq!(tree.num_terminals(), 5);
        assert_eq!(tree.num_tokens(), 4);
        assert_eq!(tree.terminal(2).unwrap().word(), Some("*-1"));
        assert_eq!(tree.token(2).unwrap().word(), Some("to"));
        assert_eq!(tree.words(), vec!["John", "tried", "to", "leave"]);
        assert!(tree.is_valid());
    }

    #[test]
    fn test_traversal_orders() {
        let tree = parse("(S (NP (DT the) (NN dog)) (VP (VBZ barks)))");
        let pre: Vec<&str> = tree.pre_order_iter().map(|n| n.category().text()).collect();
        assert_eq!(pre, vec!["S", "NP", "DT", "NN", "VP", "VBZ"]);
        let post: Vec<&str> = tree.post_order_iter().map(|n| n.category().text()).collect();
        assert_eq!(post, vec!["DT", "NN", "NP", "VBZ", "VP", "S"]);
    }

    #[test]
    fn test_ancestor_and_location() {
        let tree = parse("(S (NP (DT the) (NN dog)) (VP (VBZ barks)))");
        let the = tree.terminal_id(0).unwrap();
        let np = tree.ancestor(the, 1).unwrap();
        assert_eq!(tree[np].label(), "NP");
        assert_eq!(tree.ancestor(the, 2), Some(tree.root_id()));
        assert_eq!(tree.ancestor(the, 3), None);

        assert_eq!(tree.location_of(np), Some((0, 1)));
        assert_eq!(tree.location_of(tree.root_id()), Some((0, 2)));
        let vp = tree.ancestor(tree.terminal_id(2).unwrap(), 1).unwrap();
        assert_eq!(tree.location_of(vp), Some((2, 1)));
        assert_eq!(tree.terminal_span(np), vec![0, 1]);
        assert_eq!(tree.lowest_common_ancestor(np, vp), tree.root_id());
        assert!(tree.dominates(np, the));
        assert!(!tree.dominates(vp, the));
    }

    #[test]
    fn test_bracketed_output() {
        let text = "( (S (NP-SBJ (NNP John)) (VP (VBZ sleeps))) )";
        let tree = parse(text);
        assert_eq!(tree.to_bracketed(), text);
        assert_eq!(tree.subtree_to_string(tree.terminal_id(1).unwrap()), "(VBZ sleeps)");
    }

    #[test]
    fn test_indented_output() {
        let tree = parse("(S (NP (NNP John)) (VBZ sleeps))");
        let rendered = tree.to_indented_string();
        assert!(rendered.starts_with("[0] S\n"));
        assert!(rendered.contains("└─ [3] VBZ \"sleeps\""));
    }
}
