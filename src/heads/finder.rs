//! Assigns lexical heads to every node of a tree.

use crate::heads::rules::{Direction, HeadRuleTable};
use crate::model::{Node, NodeId, Tree};
use std::sync::Arc;

// =#========================================================================#=
// HEAD FINDER
// =#========================================================================#=
/// Finds the head terminal of each node using a shared [HeadRuleTable].
///
/// Heads are assigned bottom-up: a terminal heads itself, a constituent takes
/// the head of the child selected by its rule. Children that are empty
/// categories or the punctuation `:`/`,` are never selected by a clause. If no
/// clause selects a child, the first (or, for right-scanning rules, the last)
/// child is used. That is logged as a warning, unless no child was eligible
/// in the first place (e.g. a subject made only of a trace).
///
/// # Example
/// ```
/// use treebank::heads::HeadFinder;
/// use treebank::treebank::TreebankParser;
///
/// // Heads are assigned while parsing, using the English rules by default
/// let tree = TreebankParser::new("t")
///     .parse_str("(S (NP (DT The) (NN dog)) (VP (VBZ barks)))")
///     .unwrap();
/// assert_eq!(tree.head_of(tree.root_id()).word(), Some("barks"));
///
/// let np = tree.root().children()[0];
/// assert_eq!(tree.head_of(np).word(), Some("dog"));
/// ```
#[derive(Debug, Clone)]
pub struct HeadFinder {
    rules: Arc<HeadRuleTable>,
}

impl Default for HeadFinder {
    fn default() -> Self {
        Self::english()
    }
}

impl HeadFinder {
    /// Creates a head finder using the given rules.
    pub fn new(rules: Arc<HeadRuleTable>) -> Self {
        HeadFinder { rules }
    }

    /// Creates a head finder using the built-in English rules.
    pub fn english() -> Self {
        HeadFinder::new(HeadRuleTable::english())
    }

    /// The rules in use.
    pub fn rules(&self) -> &Arc<HeadRuleTable> {
        &self.rules
    }

    /// Assigns heads to all nodes of the tree.
    pub fn assign_heads(&self, tree: &mut Tree) {
        let order: Vec<NodeId> = tree.post_order_iter().map(|n| n.id()).collect();

        for id in order {
            let head = if tree[id].is_terminal() || tree[id].children().is_empty() {
                id
            } else {
                let child = self.head_child(tree, id);
                tree[child].head()
            };
            tree.node_mut(id).set_head(head);
        }
    }

    /// The child of a constituent whose head becomes the constituent's head.
    ///
    /// # Panics
    /// Panics if the node has no children.
    pub fn head_child(&self, tree: &Tree, id: NodeId) -> NodeId {
        let node = &tree[id];
        let children = node.children();
        let rule = self.rules.rule_for(node.label());
        if !self.rules.has_rule(node.label()) {
            log::debug!("No head rule for '{}', using default rule", node.label());
        }

        for clause in rule.clauses() {
            let found = scan(children, clause.direction())
                .find(|&child| is_head_candidate(&tree[child]) && clause.matches(tree[child].label()));
            if let Some(child) = found {
                return child;
            }
        }

        if children.iter().any(|&child| is_head_candidate(&tree[child])) {
            log::warn!(
                "No head rule clause matched children of {} in tree {} of {}, using fallback",
                node.category(),
                tree.index(),
                tree.source_id()
            );
        } else {
            log::debug!("Only empty or punctuation children under {}, using fallback", node.category());
        }
        match rule.fallback_direction() {
            Direction::Left => children[0],
            Direction::Right => children[children.len() - 1],
        }
    }
}

/// Children in scan order.
fn scan(children: &[NodeId], direction: Direction) -> impl Iterator<Item = NodeId> + '_ {
    let n = children.len();
    (0..n).map(move |i| match direction {
        Direction::Left => children[i],
        Direction::Right => children[n - 1 - i],
    })
}

fn is_head_candidate(node: &Node) -> bool {
    !node.is_empty_category() && !node.category().is_head_excluded_punctuation()
}
