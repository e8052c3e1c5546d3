//! Head finding for constituency trees.
//!
//! A [HeadRuleTable] maps categories to ordered clauses; the [HeadFinder]
//! applies them bottom-up so that every node knows its head terminal.
//! [HeadRuleTable::english] provides Collins-style rules for the Penn Treebank.

pub mod defaults;
pub mod finder;
pub mod rules;

pub use finder::HeadFinder;
pub use rules::{Direction, HeadClause, HeadRule, HeadRuleTable};
