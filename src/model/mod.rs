//! Data model of constituency trees.
//!
//! Trees use the arena pattern: all [Node]s of a [Tree] live in one vector and
//! refer to each other by [NodeId]. The [TreeBuilder] assembles trees from
//! bracket events and applies the configured [RepairPolicy].

/// Category labels with function tags and indices
pub mod category;
/// Tree nodes (constituents and terminals)
pub mod node;
/// Constituency tree structure, traversal and printing
pub mod tree;
/// Incremental tree construction
pub mod tree_builder;

pub use category::Category;
pub use node::Node;
pub use tree::{NodeId, Tree};
pub use tree_builder::{BuildError, RepairPolicy, TreeBuilder};
