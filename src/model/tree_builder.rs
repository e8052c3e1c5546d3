//! Incremental construction of [Tree]s from bracket events.
//!
//! The [TreeBuilder] keeps an explicit stack of frames, one per open bracket,
//! each collecting the children of its constituent until the bracket closes.
//! The outermost frame belongs to the (possibly unlabeled) wrapper of the tree
//! and owns no node itself.

use crate::model::category::Category;
use crate::model::node::Node;
use crate::model::tree::{NodeId, Tree};
use thiserror::Error;

// =#========================================================================#=
// REPAIR POLICY
// =#========================================================================#=
/// Which malformations of the input are repaired instead of rejected.
///
/// Repairs are logged as warnings. Use [RepairPolicy::strict] to reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairPolicy {
    /// `(NN (x))`: a childless, wordless constituent becomes the word `(x)`
    /// of its parent.
    pub collapse_dangling: bool,
    /// `(NNP New York)`: each additional word starts a sibling with the same
    /// category.
    pub split_multiword: bool,
}

impl Default for RepairPolicy {
    fn default() -> Self {
        RepairPolicy {
            collapse_dangling: true,
            split_multiword: true,
        }
    }
}

impl RepairPolicy {
    /// No repairs: every malformation is an error.
    pub fn strict() -> Self {
        RepairPolicy {
            collapse_dangling: false,
            split_multiword: false,
        }
    }
}

/// Structural problems detected while building a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("word '{0}' outside of any constituent")]
    WordOutsideConstituent(String),
    #[error("word '{word}' after child constituents of {category}")]
    WordAfterConstituent { word: String, category: String },
    #[error("second word '{word}' for {category}")]
    MultipleWords { word: String, category: String },
    #[error("constituent opened inside terminal {0}")]
    ConstituentUnderTerminal(String),
    #[error("empty constituent {0}")]
    EmptyConstituent(String),
    #[error("unbalanced closing bracket")]
    UnbalancedClose,
    #[error("unexpected end of input with {0} open constituent(s)")]
    Unterminated(usize),
    #[error("empty tree")]
    EmptyTree,
}

/// Pending children of one open bracket.
#[derive(Debug)]
struct Frame {
    node: Option<NodeId>,
    children: Vec<NodeId>,
}

// =#========================================================================#=
// TREE BUILDER
// =#========================================================================#=
/// Builds one [Tree] at a time from `open`/`word`/`close` events.
///
/// Nodes get their arena index when opened; a node is attached to its parent
/// when its bracket closes. Terminal and token indices are assigned in the
/// order words arrive, which is document order.
///
/// # Example
/// ```
/// use treebank::model::{Category, TreeBuilder};
///
/// let mut builder = TreeBuilder::new();
/// builder.open(Category::parse("NP")).unwrap();
/// builder.open(Category::parse("DT")).unwrap();
/// builder.word("the".to_string()).unwrap();
/// builder.close().unwrap();
/// builder.open(Category::parse("NN")).unwrap();
/// builder.word("dog".to_string()).unwrap();
/// builder.close().unwrap();
/// builder.close().unwrap();
///
/// let tree = builder.finish("doc", 0).unwrap();
/// assert_eq!(tree.to_string(), "(NP (DT the) (NN dog))");
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    frames: Vec<Frame>,
    num_terminals: usize,
    num_tokens: usize,
    repairs: RepairPolicy,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Creates a builder with the default repair policy, ready for one tree.
    pub fn new() -> Self {
        TreeBuilder {
            nodes: Vec::new(),
            frames: vec![Frame { node: None, children: Vec::new() }],
            num_terminals: 0,
            num_tokens: 0,
            repairs: RepairPolicy::default(),
        }
    }

    /// Sets the repair policy.
    pub fn with_repairs(mut self, repairs: RepairPolicy) -> Self {
        self.repairs = repairs;
        self
    }

    /// Number of currently open constituents.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// The innermost open constituent.
    fn current(&self) -> Option<NodeId> {
        self.frames.last().and_then(|frame| frame.node)
    }

    /// Opens a new constituent with the given category as child of the current one.
    pub fn open(&mut self, category: Category) -> Result<NodeId, BuildError> {
        let parent = self.current();
        if let Some(parent) = parent {
            if self.nodes[parent].is_terminal() {
                return Err(BuildError::ConstituentUnderTerminal(self.describe(parent)));
            }
        }

        let id = self.nodes.len();
        self.nodes.push(Node::new(id, category, parent));
        self.frames.push(Frame { node: Some(id), children: Vec::new() });
        Ok(id)
    }

    /// Adds a word to the current constituent, making it a terminal.
    ///
    /// If the constituent already has a word, the policy decides whether the
    /// word starts a new sibling of the same category.
    pub fn word(&mut self, word: String) -> Result<(), BuildError> {
        let Some(id) = self.current() else {
            return Err(BuildError::WordOutsideConstituent(word));
        };

        let has_children = self.frames.last().is_some_and(|frame| !frame.children.is_empty());
        if has_children {
            return Err(BuildError::WordAfterConstituent { word, category: self.describe(id) });
        }

        if self.nodes[id].is_terminal() {
            if !self.repairs.split_multiword {
                return Err(BuildError::MultipleWords { word, category: self.describe(id) });
            }
            let category = self.nodes[id].category().clone();
            log::warn!("Splitting multi-word terminal {category}: '{word}' becomes a sibling");
            self.close()?;
            let sibling = self.open(category)?;
            self.make_terminal(sibling, word);
            return Ok(());
        }

        self.make_terminal(id, word);
        Ok(())
    }

    /// Closes the current constituent and attaches it to its parent.
    pub fn close(&mut self) -> Result<(), BuildError> {
        if self.frames.len() < 2 {
            return Err(BuildError::UnbalancedClose);
        }
        let Some(frame) = self.frames.pop() else {
            return Err(BuildError::UnbalancedClose);
        };
        let Some(id) = frame.node else {
            return Err(BuildError::UnbalancedClose);
        };

        if frame.children.is_empty() && !self.nodes[id].is_terminal() {
            return self.collapse_dangling(id);
        }

        self.attach_children(id, frame.children);
        if let Some(parent_frame) = self.frames.last_mut() {
            parent_frame.children.push(id);
        }
        Ok(())
    }

    /// Finishes the tree once all constituents are closed.
    ///
    /// A single top-level constituent becomes the root; several are grouped
    /// under a synthetic unlabeled root.
    pub fn finish(mut self, source_id: &str, index: usize) -> Result<Tree, BuildError> {
        if self.frames.len() != 1 {
            return Err(BuildError::Unterminated(self.depth()));
        }
        let top_level = match self.frames.pop() {
            Some(frame) => frame.children,
            None => return Err(BuildError::EmptyTree),
        };

        let root = match top_level.as_slice() {
            [] => return Err(BuildError::EmptyTree),
            [single] => *single,
            _ => {
                let id = self.nodes.len();
                self.nodes.push(Node::new(id, Category::unlabeled(), None));
                self.attach_children(id, top_level);
                id
            }
        };

        Ok(Tree::from_parts(self.nodes, root, source_id, index))
    }

    fn make_terminal(&mut self, id: NodeId, word: String) {
        let node = &mut self.nodes[id];
        node.set_word(word);
        node.set_terminal_index(self.num_terminals);
        self.num_terminals += 1;
        if !node.is_empty_category() {
            node.set_token_index(self.num_tokens);
            self.num_tokens += 1;
        }
    }

    fn attach_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for (position, &child) in children.iter().enumerate() {
            self.nodes[child].set_parent(parent, position);
        }
        self.nodes[parent].set_children(children);
    }

    /// Repairs `(NN (x))`: the dangling `(x)` becomes the word of `NN`.
    ///
    /// Only applies if the dangling node is the sole child of a parent that
    /// has no word yet; the dangling node is always the last one in the arena.
    fn collapse_dangling(&mut self, id: NodeId) -> Result<(), BuildError> {
        let parent = self.frames.last().and_then(|frame| {
            frame.node.filter(|_| frame.children.is_empty())
        });
        let collapsible = self.repairs.collapse_dangling
            && id + 1 == self.nodes.len()
            && parent.is_some_and(|p| !self.nodes[p].is_terminal());

        match parent {
            Some(parent) if collapsible => {
                let dangling = self.nodes.pop().map(|n| n.category().text().to_string()).unwrap_or_default();
                let word = format!("({dangling})");
                log::warn!("Collapsing dangling constituent into word '{word}' of {}", self.describe(parent));
                self.make_terminal(parent, word);
                Ok(())
            }
            _ => Err(BuildError::EmptyConstituent(self.describe(id))),
        }
    }

    fn describe(&self, id: NodeId) -> String {
        let text = self.nodes[id].category().text();
        if text.is_empty() { "()".to_string() } else { text.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(builder: &mut TreeBuilder, category: &str, word: &str) {
        builder.open(Category::parse(category)).unwrap();
        builder.word(word.to_string()).unwrap();
        builder.close().unwrap();
    }

    #[test]
    fn test_build_simple_tree() {
        let mut builder = TreeBuilder::new();
        builder.open(Category::parse("S")).unwrap();
        terminal(&mut builder, "NNP", "John");
        terminal(&mut builder, "VBZ", "sleeps");
        builder.close().unwrap();
        let tree = builder.finish("t", 4).unwrap();

        assert_eq!(tree.index(), 4);
        assert_eq!(tree.root().label(), "S");
        assert_eq!(tree.root().children().len(), 2);
        assert!(tree.is_valid());
    }

    #[test]
    fn test_synthetic_root_for_multiple_top_level() {
        let mut builder = TreeBuilder::new();
        terminal(&mut builder, "NN", "a");
        terminal(&mut builder, "NN", "b");
        let tree = builder.finish("t", 0).unwrap();

        assert!(tree.root().category().is_unlabeled());
        assert_eq!(tree.root().children().len(), 2);
        assert_eq!(tree.to_bracketed(), "( (NN a) (NN b))");
        assert!(tree.is_valid());
    }

    #[test]
    fn test_empty_category_has_no_token_index() {
        let mut builder = TreeBuilder::new();
        builder.open(Category::parse("S")).unwrap();
        terminal(&mut builder, "-NONE-", "*");
        terminal(&mut builder, "VB", "go");
        builder.close().unwrap();
        let tree = builder.finish("t", 0).unwrap();

        let trace = tree.terminal(0).unwrap();
        assert_eq!(trace.token_index(), None);
        assert_eq!(tree.terminal(1).unwrap().token_index(), Some(0));
    }

    #[test]
    fn test_split_multiword() {
        let mut builder = TreeBuilder::new();
        builder.open(Category::parse("NP")).unwrap();
        builder.open(Category::parse("NNP")).unwrap();
        builder.word("New".to_string()).unwrap();
        builder.word("York".to_string()).unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        let tree = builder.finish("t", 0).unwrap();

        assert_eq!(tree.to_string(), "(NP (NNP New) (NNP York))");
        assert!(tree.is_valid());
    }

    #[test]
    fn test_strict_rejects_multiword() {
        let mut builder = TreeBuilder::new().with_repairs(RepairPolicy::strict());
        builder.open(Category::parse("NNP")).unwrap();
        builder.word("New".to_string()).unwrap();
        let err = builder.word("York".to_string()).unwrap_err();
        assert!(matches!(err, BuildError::MultipleWords { .. }));
    }

    #[test]
    fn test_collapse_dangling() {
        let mut builder = TreeBuilder::new();
        builder.open(Category::parse("S")).unwrap();
        builder.open(Category::parse("NN")).unwrap();
        builder.open(Category::parse("x")).unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        builder.close().unwrap();
        let tree = builder.finish("t", 0).unwrap();

        assert_eq!(tree.to_string(), "(S (NN (x)))");
        assert_eq!(tree.terminal(0).unwrap().word(), Some("(x)"));
        assert_eq!(tree.num_nodes(), 2);
        assert!(tree.is_valid());
    }

    #[test]
    fn test_dangling_with_siblings_is_error() {
        let mut builder = TreeBuilder::new();
        builder.open(Category::parse("NP")).unwrap();
        terminal(&mut builder, "NN", "a");
        builder.open(Category::parse("NN")).unwrap();
        assert_eq!(builder.close(), Err(BuildError::EmptyConstituent("NN".to_string())));
    }

    #[test]
    fn test_word_after_children_is_error() {
        let mut builder = TreeBuilder::new();
        builder.open(Category::parse("NP")).unwrap();
        terminal(&mut builder, "NN", "a");
        let err = builder.word("b".to_string()).unwrap_err();
        assert!(matches!(err, BuildError::WordAfterConstituent { .. }));
    }

    #[test]
    fn test_unterminated_and_unbalanced() {
        let mut builder = TreeBuilder::new();
        assert_eq!(builder.close(), Err(BuildError::UnbalancedClose));
        builder.open(Category::parse("S")).unwrap();
        assert_eq!(builder.finish("t", 0).unwrap_err(), BuildError::Unterminated(1));
        assert_eq!(TreeBuilder::new().finish("t", 0).unwrap_err(), BuildError::EmptyTree);
    }
}
