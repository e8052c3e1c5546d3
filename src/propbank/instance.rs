//! A predicate occurrence with its annotated arguments.

use crate::model::{Node, NodeId, Tree};
use crate::parser::ParsingError;
use crate::propbank::argument::Argument;
use crate::propbank::location::NodeLocation;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Annotator field written when none was read.
pub const DEFAULT_ANNOTATOR: &str = "gold";

/// Inflection field written when none was read.
pub const DEFAULT_INFLECTION: &str = "-----";

// =#========================================================================#=
// INSTANCE
// =#========================================================================#=
/// One annotated predicate: its tree, roleset and label-ordered arguments.
///
/// Instances share their tree with all other instances of the same sentence.
/// The terminal sets of all arguments are pairwise disjoint.
///
/// Instances are ordered by source, tree index and predicate terminal.
/// `Display` renders the PropBank line the instance came from (modulo
/// merged duplicates and resolved links).
#[derive(Debug, Clone)]
pub struct Instance {
    tree: Arc<Tree>,
    predicate: NodeId,
    roleset_id: String,
    annotator: String,
    inflection: String,
    arguments: BTreeMap<String, Argument>,
    alt_predicates: Vec<Argument>,
}

impl Instance {
    pub(crate) fn new(tree: Arc<Tree>, predicate: NodeId, roleset_id: String) -> Self {
        Instance {
            tree,
            predicate,
            roleset_id,
            annotator: DEFAULT_ANNOTATOR.to_string(),
            inflection: DEFAULT_INFLECTION.to_string(),
            arguments: BTreeMap::new(),
            alt_predicates: Vec::new(),
        }
    }

    pub(crate) fn with_fields(mut self, annotator: Option<String>, inflection: Option<String>) -> Self {
        if let Some(annotator) = annotator {
            self.annotator = annotator;
        }
        if let Some(inflection) = inflection {
            self.inflection = inflection;
        }
        self
    }

    /// The annotated tree.
    pub fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    /// Predicate terminal node.
    pub fn predicate(&self) -> NodeId {
        self.predicate
    }

    /// Predicate terminal node.
    pub fn predicate_node(&self) -> &Node {
        &self.tree[self.predicate]
    }

    /// Terminal index of the predicate.
    pub fn predicate_terminal(&self) -> usize {
        self.predicate_node().terminal_index().unwrap_or_default()
    }

    /// Roleset id, e.g. `join.01`.
    pub fn roleset_id(&self) -> &str {
        &self.roleset_id
    }

    /// Lemma part of the roleset id.
    pub fn lemma(&self) -> &str {
        self.roleset_id
            .rsplit_once('.')
            .map_or(self.roleset_id.as_str(), |(lemma, _)| lemma)
    }

    /// Sense part of the roleset id, e.g. `01` or `XX`.
    pub fn sense(&self) -> &str {
        self.roleset_id.rsplit_once('.').map_or("", |(_, sense)| sense)
    }

    /// Annotator field of the source line.
    pub fn annotator(&self) -> &str {
        &self.annotator
    }

    /// Inflection field of the source line.
    pub fn inflection(&self) -> &str {
        &self.inflection
    }

    /// Arguments by label, in label order.
    pub fn arguments(&self) -> &BTreeMap<String, Argument> {
        &self.arguments
    }

    /// Argument with the given label.
    pub fn argument(&self, label: &str) -> Option<&Argument> {
        self.arguments.get(label)
    }

    /// Alternate predicates (`...PRR` labels).
    pub fn alt_predicates(&self) -> &[Argument] {
        &self.alt_predicates
    }

    /// Source of the tree.
    pub fn source_id(&self) -> &str {
        self.tree.source_id()
    }

    /// Index of the tree within its source.
    pub fn tree_index(&self) -> usize {
        self.tree.index()
    }

    /// Whether both instances annotate the same predicate with the same roleset.
    pub fn same_predicate(&self, other: &Instance) -> bool {
        self.sort_key() == other.sort_key() && self.roleset_id == other.roleset_id
    }

    /// Adds an argument, merging it with an existing one of the same label.
    pub(crate) fn add_argument(&mut self, argument: Argument) {
        match self.arguments.get_mut(argument.label()) {
            Some(existing) => existing.merge(argument),
            None => {
                self.arguments.insert(argument.label().to_string(), argument);
            }
        }
    }

    pub(crate) fn add_alt_predicate(&mut self, argument: Argument) {
        self.alt_predicates.push(argument);
    }

    /// Merges all arguments of another instance of the same predicate.
    pub(crate) fn merge(&mut self, other: Instance) {
        for (_, argument) in other.arguments {
            self.add_argument(argument);
        }
        for alt in other.alt_predicates {
            if !self.alt_predicates.contains(&alt) {
                self.alt_predicates.push(alt);
            }
        }
    }

    /// Checks that no two arguments share a terminal.
    ///
    /// # Errors
    /// An [Annotation](crate::parser::ParsingErrorKind::Annotation) error
    /// naming the first overlapping pair.
    pub fn validate(&self) -> Result<(), ParsingError> {
        let spans: Vec<(&str, BTreeSet<usize>)> = self
            .arguments
            .values()
            .map(|a| (a.label(), a.terminal_indices(&self.tree)))
            .collect();

        for (i, (label, span)) in spans.iter().enumerate() {
            for (other_label, other_span) in &spans[i + 1..] {
                if let Some(shared) = span.intersection(other_span).next() {
                    return Err(ParsingError::annotation(format!(
                        "overlapping arguments {label} and {other_label} at terminal {shared}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn sort_key(&self) -> (&str, usize, usize) {
        (self.source_id(), self.tree_index(), self.predicate_terminal())
    }

    fn write_argument(&self, f: &mut fmt::Formatter, argument: &Argument) -> fmt::Result {
        let group = |nodes: &[NodeId]| -> String {
            nodes
                .iter()
                .filter_map(|&id| NodeLocation::of(&self.tree, id))
                .map(|loc| loc.to_string())
                .collect::<Vec<_>>()
                .join("*")
        };

        let mut groups = vec![group(argument.nodes())];
        groups.extend(argument.continuations().iter().map(|c| group(c.nodes())));
        write!(f, " {}-{}", groups.join(","), argument.label())?;

        if argument.probability() < 1.0 {
            write!(f, "-{}", argument.probability())?;
        }
        Ok(())
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Instance {}

impl PartialOrd for Instance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.roleset_id.cmp(&other.roleset_id))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.source_id(),
            self.tree_index(),
            self.predicate_terminal(),
            self.annotator,
            self.roleset_id,
            self.inflection
        )?;
        for argument in self.arguments.values() {
            self.write_argument(f, argument)?;
        }
        for alt in &self.alt_predicates {
            self.write_argument(f, alt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treebank::TreebankParser;

    fn tree() -> Arc<Tree> {
        let tree = TreebankParser::new("a.mrg")
            .parse_str("( (S (NP-SBJ (NNP John)) (VP (VBZ likes) (NP (NNS cats)))) )")
            .unwrap();
        Arc::new(tree)
    }

    #[test]
    fn test_roleset_parts() {
        let tree = tree();
        let predicate = tree.terminal_id(1).unwrap();
        let instance = Instance::new(tree, predicate, "like.02".to_string());
        assert_eq!(instance.lemma(), "like");
        assert_eq!(instance.sense(), "02");
        assert_eq!(instance.predicate_terminal(), 1);
    }

    #[test]
    fn test_overlap_detected() {
        let tree = tree();
        let predicate = tree.terminal_id(1).unwrap();
        let vp = tree.ancestor(predicate, 1).unwrap();
        let mut instance = Instance::new(Arc::clone(&tree), predicate, "like.02".to_string());
        instance.add_argument(Argument::new("rel", vec![predicate]));
        instance.add_argument(Argument::new("ARG1", vec![tree.terminal_id(2).unwrap()]));
        assert!(instance.validate().is_ok());

        instance.add_argument(Argument::new("ARGM-MNR", vec![vp]));
        let err = instance.validate().unwrap_err();
        assert!(err.to_string().contains("overlapping arguments"));
    }

    #[test]
    fn test_ordering() {
        let tree = tree();
        let first = Instance::new(Arc::clone(&tree), tree.terminal_id(0).unwrap(), "x.01".to_string());
        let second = Instance::new(Arc::clone(&tree), tree.terminal_id(1).unwrap(), "like.02".to_string());
        assert!(first < second);
        assert!(first.same_predicate(&first.clone()));
        assert!(!first.same_predicate(&second));
    }

    #[test]
    fn test_display() {
        let tree = tree();
        let predicate = tree.terminal_id(1).unwrap();
        let mut instance = Instance::new(Arc::clone(&tree), predicate, "like.02".to_string());
        instance.add_argument(Argument::new("ARG0", vec![tree.root().children()[0]]));
        instance.add_argument(Argument::new("rel", vec![predicate]));
        instance.add_argument(Argument::new("ARG1", vec![tree.ancestor(tree.terminal_id(2).unwrap(), 1).unwrap()]).with_probability(0.5));

        assert_eq!(instance.to_string(), "a.mrg 0 1 gold like.02 ----- 0:1-ARG0 2:1-ARG1-0.5 1:0-rel");
    }
}
