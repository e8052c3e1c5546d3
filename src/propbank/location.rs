//! Lexing of argument tokens such as `3:1*5:0,8:2-ARG1-0.75`.
//!
//! A location `terminal:height` names the node reached by walking `height`
//! levels up from the terminal with index `terminal`. Each location is
//! classified by the separator in front of it: the first location and every
//! location after a `*` belong to the main span, while a location after `,`,
//! `;` or `&` starts a discontinuous piece of the argument.

use crate::model::{NodeId, Tree};
use crate::parser::ParsingError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `locations-LABEL`, split at the first `-` after the locations.
static ARGUMENT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:\d+:\d+[*,;&])*\d+:\d+)-(.+)$").expect("valid argument token pattern")
});

/// One location and the separator following it.
static LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):(\d+)([*,;&]?)").expect("valid location pattern"));

/// Trailing confidence on a label, e.g. `ARG0-0.8`.
static PROBABILITY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)-(\d*\.\d+)$").expect("valid probability pattern"));

/// A `terminal:height` node address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeLocation {
    /// Terminal index (empty categories included)
    pub terminal: usize,
    /// Levels to walk up from the terminal
    pub height: usize,
}

impl NodeLocation {
    /// Creates a location.
    pub fn new(terminal: usize, height: usize) -> Self {
        NodeLocation { terminal, height }
    }

    /// Location of an existing node (its leftmost terminal and height).
    pub fn of(tree: &Tree, id: NodeId) -> Option<Self> {
        tree.location_of(id).map(|(terminal, height)| NodeLocation { terminal, height })
    }

    /// Finds the node this location refers to.
    ///
    /// # Errors
    /// An [Annotation](crate::parser::ParsingErrorKind::Annotation) error if
    /// the terminal does not exist or the walk passes the root.
    pub fn resolve(&self, tree: &Tree) -> Result<NodeId, ParsingError> {
        tree.terminal_id(self.terminal)
            .and_then(|terminal| tree.ancestor(terminal, self.height))
            .ok_or_else(|| {
                ParsingError::annotation(format!(
                    "invalid node {self} in tree {} of {} ({} terminals)",
                    tree.index(),
                    tree.source_id(),
                    tree.num_terminals()
                ))
            })
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.terminal, self.height)
    }
}

// =#========================================================================#=
// ARGUMENT TOKEN
// =#========================================================================#=
/// Lexed, not yet resolved argument token.
///
/// # Example
/// ```
/// use treebank::propbank::location::ArgumentToken;
///
/// let token = ArgumentToken::parse("3:1*5:0,8:2-ARG1-0.75").unwrap();
/// assert_eq!(token.label, "ARG1");
/// assert_eq!(token.groups.len(), 2);
/// assert_eq!(token.groups[0].len(), 2);
/// assert_eq!(token.probability, Some(0.75));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentToken {
    /// Location groups: the first is the main span (all `*`-joined
    /// locations), each further one a piece introduced by `,`, `;` or `&`
    pub groups: Vec<Vec<NodeLocation>>,
    /// Argument label, e.g. `ARG0`, `ARGM-TMP`, `rel`, `LINK-SLC`
    pub label: String,
    /// Optional confidence in `[0, 1]`
    pub probability: Option<f64>,
}

impl ArgumentToken {
    /// Lexes one argument token.
    ///
    /// # Errors
    /// An [Annotation](crate::parser::ParsingErrorKind::Annotation) error if
    /// the token is not `locations-LABEL`.
    pub fn parse(token: &str) -> Result<Self, ParsingError> {
        let caps = ARGUMENT_TOKEN
            .captures(token)
            .ok_or_else(|| ParsingError::annotation(format!("malformed argument token '{token}'")))?;

        let mut groups: Vec<Vec<NodeLocation>> = vec![Vec::new()];
        let mut joined = true;
        for location in LOCATION.captures_iter(&caps[1]) {
            let terminal = location[1]
                .parse()
                .map_err(|_| ParsingError::annotation(format!("terminal index too large in '{token}'")))?;
            let height = location[2]
                .parse()
                .map_err(|_| ParsingError::annotation(format!("height too large in '{token}'")))?;

            let node = NodeLocation { terminal, height };
            if joined {
                groups[0].push(node);
            } else {
                groups.push(vec![node]);
            }
            joined = matches!(&location[3], "*" | "");
        }

        let (label, probability) = match PROBABILITY_SUFFIX.captures(&caps[2]) {
            Some(suffix) => (suffix[1].to_string(), suffix[2].parse().ok()),
            None => (caps[2].to_string(), None),
        };

        Ok(ArgumentToken { groups, label, probability })
    }

    /// Whether the string looks like an argument token.
    pub fn is_argument_token(token: &str) -> bool {
        ARGUMENT_TOKEN.is_match(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treebank::TreebankParser;

    #[test]
    fn test_simple_token() {
        let token = ArgumentToken::parse("0:1-ARG0").unwrap();
        assert_eq!(token.groups, vec![vec![NodeLocation::new(0, 1)]]);
        assert_eq!(token.label, "ARG0");
        assert_eq!(token.probability, None);
    }

    #[test]
    fn test_hyphenated_label() {
        let token = ArgumentToken::parse("12:2-ARGM-TMP").unwrap();
        assert_eq!(token.label, "ARGM-TMP");
        let token = ArgumentToken::parse("2:0-LINK-SLC").unwrap();
        assert_eq!(token.label, "LINK-SLC");
    }

    #[test]
    fn test_groups_and_chains() {
        let token = ArgumentToken::parse("1:0*4:0;6:1&9:0-ARG2").unwrap();
        assert_eq!(token.groups.len(), 3);
        assert_eq!(token.groups[0], vec![NodeLocation::new(1, 0), NodeLocation::new(4, 0)]);
        assert_eq!(token.groups[2], vec![NodeLocation::new(9, 0)]);
    }

    #[test]
    fn test_star_after_piece_joins_main_span() {
        let token = ArgumentToken::parse("1:0,2:0*3:0-ARG1").unwrap();
        assert_eq!(
            token.groups,
            vec![
                vec![NodeLocation::new(1, 0), NodeLocation::new(3, 0)],
                vec![NodeLocation::new(2, 0)],
            ]
        );

        let token = ArgumentToken::parse("4:1;5:0,6:0*7:2-ARG0").unwrap();
        assert_eq!(token.groups.len(), 3);
        assert_eq!(token.groups[0], vec![NodeLocation::new(4, 1), NodeLocation::new(7, 2)]);
        assert_eq!(token.groups[1], vec![NodeLocation::new(5, 0)]);
        assert_eq!(token.groups[2], vec![NodeLocation::new(6, 0)]);
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(ArgumentToken::parse("ARG0").is_err());
        assert!(ArgumentToken::parse("1:-ARG0").is_err());
        assert!(ArgumentToken::parse("1:0").is_err());
        assert!(ArgumentToken::parse("1:0*-ARG0").is_err());
        assert!(!ArgumentToken::is_argument_token("-----"));
        assert!(!ArgumentToken::is_argument_token("join.01"));
    }

    #[test]
    fn test_resolve_location() {
        let tree = TreebankParser::new("t").parse_str("(S (NP (DT the) (NN dog)) (VP (VBZ barks)))").unwrap();
        let np = NodeLocation::new(1, 1).resolve(&tree).unwrap();
        assert_eq!(tree[np].label(), "NP");
        assert_eq!(NodeLocation::of(&tree, np), Some(NodeLocation::new(0, 1)));
        assert!(NodeLocation::new(3, 0).resolve(&tree).is_err());
        assert!(NodeLocation::new(0, 3).resolve(&tree).is_err());
    }
}
