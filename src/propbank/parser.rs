//! Parsing of PropBank and NomBank annotation lines.

use crate::model::{NodeId, Tree};
use crate::parser::ParsingError;
use crate::propbank::argument::{Argument, CONTINUATION_PREFIX, PREDICATE_LABEL, REFERENCE_PREFIX};
use crate::propbank::instance::Instance;
use crate::propbank::location::{ArgumentToken, NodeLocation};
use crate::treebank::TreeLookup;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Roleset ids such as `join.01`, `take_off.02` or `be.XX`.
static ROLESET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s:]+\.(?:\d+|[Xx]{2})$").expect("valid roleset pattern"));

/// Label of reference links to be rewritten into `R-` arguments.
const LINK_SLC: &str = "LINK-SLC";

/// Prefix of all link labels.
const LINK_PREFIX: &str = "LINK-";

/// Suffix of alternate predicate labels.
const ALT_PREDICATE_SUFFIX: &str = "PRR";

/// Layout of annotation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationFormat {
    /// `file tree terminal annotator roleset inflection args...`
    #[default]
    PropBank,
    /// `file tree terminal lemma sense args...`
    NomBank,
}

// =#========================================================================#=
// PROPBANK PARSER
// =#========================================================================#=
/// Parser for single annotation lines, resolving trees via a [TreeLookup].
///
/// # Line format (PropBank)
/// `wsj_0001.mrg 0 8 gold join.01 vf--a 0:2-ARG0 7:0-ARGM-MOD 8:0-rel 9:1-ARG1`
/// * source file, tree index, predicate terminal
/// * annotator (skipped; everything up to the roleset id)
/// * roleset id `lemma.NN` / `lemma.XX`
/// * inflection (skipped)
/// * argument tokens `loc([*,;&]loc)*-LABEL(-PROB)?` with `loc := terminal:height`
///
/// # Example
/// ```
/// use treebank::propbank::PropbankParser;
/// use treebank::treebank::TreeCorpus;
///
/// let mut corpus = TreeCorpus::new();
/// corpus.load_str("f.parse", "( (S (NP (NNP Pierre)) (VP (VBZ is))) )");
///
/// let parser = PropbankParser::new(&corpus);
/// let instance = parser
///     .parse_line("f.parse 0 1 gold is.01 ----- 0:0-ARG0 1:0-rel")
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(instance.roleset_id(), "is.01");
/// assert_eq!(instance.arguments().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PropbankParser<L: TreeLookup> {
    lookup: L,
    format: AnnotationFormat,
}

impl<L: TreeLookup> PropbankParser<L> {
    /// Creates a parser for PropBank lines resolving trees with `lookup`.
    pub fn new(lookup: L) -> Self {
        PropbankParser {
            lookup,
            format: AnnotationFormat::default(),
        }
    }

    /// Sets the line format.
    pub fn with_format(mut self, format: AnnotationFormat) -> Self {
        self.format = format;
        self
    }

    /// The line format.
    pub fn format(&self) -> AnnotationFormat {
        self.format
    }

    /// Parses one annotation line.
    ///
    /// # Returns
    /// * `Ok(Some(Instance))` - The validated instance
    /// * `Ok(None)` - Blank line or `#` comment
    /// * `Err(ParsingError)` - Unknown tree, malformed fields, invalid
    ///   locations, or overlapping arguments
    pub fn parse_line(&self, line: &str) -> Result<Option<Instance>, ParsingError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].starts_with('#') {
            return Ok(None);
        }
        if fields.len() < 4 {
            return Err(ParsingError::annotation(format!(
                "expected at least 4 fields, found {}",
                fields.len()
            )));
        }

        let source_id = fields[0];
        let tree_index: usize = parse_number(fields[1], "tree index")?;
        let terminal: usize = parse_number(fields[2], "predicate terminal")?;

        let tree = self
            .lookup
            .lookup(source_id, tree_index)
            .ok_or_else(|| ParsingError::annotation(format!("no tree {tree_index} in {source_id}")))?;
        let predicate = tree.terminal_id(terminal).ok_or_else(|| {
            ParsingError::annotation(format!(
                "predicate terminal {terminal} out of range ({} terminals)",
                tree.num_terminals()
            ))
        })?;

        let (header, argument_fields) = match self.format {
            AnnotationFormat::PropBank => split_propbank_header(&fields[3..])?,
            AnnotationFormat::NomBank => split_nombank_header(&fields[3..])?,
        };

        let mut instance = Instance::new(Arc::clone(&tree), predicate, header.roleset_id)
            .with_fields(header.annotator, header.inflection);

        let mut links = Vec::new();
        for field in argument_fields {
            let token = ArgumentToken::parse(field)?;
            let argument = resolve_argument(&tree, &token)?;

            if token.label.ends_with(ALT_PREDICATE_SUFFIX) {
                instance.add_alt_predicate(argument);
            } else if token.label.starts_with(LINK_PREFIX) {
                links.push(argument);
            } else {
                instance.add_argument(argument);
            }
        }

        for link in links {
            resolve_link(&mut instance, link);
        }

        instance.validate()?;
        Ok(Some(instance))
    }
}

/// Fields between predicate terminal and arguments.
struct Header {
    roleset_id: String,
    annotator: Option<String>,
    inflection: Option<String>,
}

fn parse_number(field: &str, what: &str) -> Result<usize, ParsingError> {
    field
        .parse()
        .map_err(|_| ParsingError::annotation(format!("invalid {what} '{field}'")))
}

/// `annotator... roleset [inflection] args...`
fn split_propbank_header<'a>(fields: &[&'a str]) -> Result<(Header, Vec<&'a str>), ParsingError> {
    let position = fields
        .iter()
        .position(|f| ROLESET_ID.is_match(f))
        .ok_or_else(|| ParsingError::annotation("no roleset id"))?;

    let annotator = (position > 0).then(|| fields[..position].join(" "));
    let mut rest = &fields[position + 1..];
    let inflection = match rest.first() {
        Some(field) if !ArgumentToken::is_argument_token(field) => {
            rest = &rest[1..];
            Some(field.to_string())
        }
        _ => None,
    };

    let header = Header {
        roleset_id: fields[position].to_string(),
        annotator,
        inflection,
    };
    Ok((header, rest.to_vec()))
}

/// `lemma sense args...`
fn split_nombank_header<'a>(fields: &[&'a str]) -> Result<(Header, Vec<&'a str>), ParsingError> {
    let [lemma, sense, rest @ ..] = fields else {
        return Err(ParsingError::annotation("missing lemma or sense"));
    };

    let header = Header {
        roleset_id: format!("{lemma}.{sense}"),
        annotator: None,
        inflection: None,
    };
    Ok((header, rest.to_vec()))
}

/// Resolves all locations of a token; groups after the first become `C-` pieces.
fn resolve_argument(tree: &Tree, token: &ArgumentToken) -> Result<Argument, ParsingError> {
    let mut groups = token
        .groups
        .iter()
        .map(|group| group.iter().map(|loc| loc.resolve(tree)).collect::<Result<Vec<NodeId>, _>>());

    let main = groups.next().transpose()?.unwrap_or_default();
    let mut argument = Argument::new(token.label.as_str(), main);
    for group in groups {
        argument.add_continuation(Argument::new(format!("{CONTINUATION_PREFIX}{}", token.label), group?));
    }

    Ok(match token.probability {
        Some(probability) => argument.with_probability(probability),
        None => argument,
    })
}

/// Rewrites a `LINK-SLC` into an `R-` argument, drops other links.
///
/// The link must name exactly two nodes, exactly one of which belongs to
/// exactly one other (non-predicate) argument; the other node becomes the
/// reference argument of that argument.
fn resolve_link(instance: &mut Instance, link: Argument) {
    let tree = Arc::clone(instance.tree());
    let describe = |link: &Argument| {
        link.all_nodes()
            .iter()
            .filter_map(|&id| NodeLocation::of(&tree, id))
            .map(|loc| loc.to_string())
            .collect::<Vec<_>>()
            .join("*")
    };

    if link.label() != LINK_SLC {
        log::warn!("Dropping {} link {} in {}", link.label(), describe(&link), instance.roleset_id());
        return;
    }

    let nodes = link.all_nodes();
    let shared: Vec<(String, NodeId)> = if nodes.len() == 2 {
        instance
            .arguments()
            .values()
            .filter(|a| a.label() != PREDICATE_LABEL)
            .filter_map(|a| {
                let members = a.all_nodes();
                let common: Vec<NodeId> = nodes.iter().copied().filter(|n| members.contains(n)).collect();
                match common.as_slice() {
                    [node] => Some((a.label().to_string(), *node)),
                    _ => None,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    match shared.as_slice() {
        [(label, node)] => {
            let referent: Vec<NodeId> = nodes.into_iter().filter(|n| n != node).collect();
            let reference = Argument::new(format!("{REFERENCE_PREFIX}{label}"), referent)
                .with_probability(link.probability());
            instance.add_argument(reference);
        }
        _ => log::warn!(
            "Dropping unresolved {LINK_SLC} {} in {}",
            describe(&link),
            instance.roleset_id()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsingErrorKind;
    use crate::treebank::TreeCorpus;

    fn corpus() -> TreeCorpus {
        let mut corpus = TreeCorpus::new();
        corpus.load_str(
            "wsj.mrg",
            "( (S (NP-SBJ (DT The) (NN man)) (VP (VBD said) (NP (DT the) (NN price)) (PP (IN on) (NP (NNP Monday))))) )\n\
             ( (NP (NP (DT the) (NN dog)) (SBAR (WHNP-1 (WDT that)) (S (NP-SBJ (-NONE- *T*-1)) (VP (VBD barked))))) )",
        );
        corpus
    }

    fn annotation_error(result: Result<Option<Instance>, ParsingError>) -> String {
        match result.unwrap_err().kind() {
            ParsingErrorKind::Annotation(msg) => msg.clone(),
            other => panic!("unexpected error kind {other:?}"),
        }
    }

    #[test]
    fn test_basic_line() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 0 2 gold say.01 vd--a 0:1-ARG0 2:0-rel 3:1-ARG1 5:1-ARGM-TMP")
            .unwrap()
            .unwrap();

        assert_eq!(instance.roleset_id(), "say.01");
        assert_eq!(instance.annotator(), "gold");
        assert_eq!(instance.inflection(), "vd--a");
        let labels: Vec<&str> = instance.arguments().keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["ARG0", "ARG1", "ARGM-TMP", "rel"]);
        assert_eq!(instance.argument("ARGM-TMP").unwrap().words(instance.tree()), vec!["on", "Monday"]);
    }

    #[test]
    fn test_comment_and_blank_lines() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        assert!(parser.parse_line("").unwrap().is_none());
        assert!(parser.parse_line("   # note").unwrap().is_none());
    }

    #[test]
    fn test_missing_roleset() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let msg = annotation_error(parser.parse_line("wsj.mrg 0 2 gold ----- 0:1-ARG0"));
        assert_eq!(msg, "no roleset id");
    }

    #[test]
    fn test_unknown_tree_and_bad_location() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        assert!(annotation_error(parser.parse_line("wsj.mrg 9 2 gold say.01 ----- 2:0-rel")).contains("no tree 9"));
        assert!(annotation_error(parser.parse_line("wsj.mrg 0 2 gold say.01 ----- 2:9-rel")).contains("invalid node"));
        assert!(annotation_error(parser.parse_line("wsj.mrg 0 42 gold say.01 ----- 2:0-rel")).contains("out of range"));
    }

    #[test]
    fn test_discontinuous_argument() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 0 2 gold say.01 ----- 0:1,5:1-ARG1 2:0-rel")
            .unwrap()
            .unwrap();
        let arg1 = instance.argument("ARG1").unwrap();
        assert_eq!(arg1.continuations().len(), 1);
        assert_eq!(arg1.continuations()[0].label(), "C-ARG1");
        assert_eq!(arg1.terminal_indices(instance.tree()).len(), 4);
    }

    #[test]
    fn test_star_joined_location_after_continuation() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 0 2 gold say.01 ----- 0:1,3:1*6:0-ARG1 2:0-rel")
            .unwrap()
            .unwrap();
        let tree = instance.tree();
        let arg1 = instance.argument("ARG1").unwrap();

        let main: Vec<_> = arg1.nodes().iter().map(|&id| tree[id].label()).collect();
        assert_eq!(main, vec!["NP", "NNP"]);
        assert_eq!(arg1.continuations().len(), 1);
        assert_eq!(arg1.continuations()[0].words(tree), vec!["the", "price"]);
    }

    #[test]
    fn test_duplicate_labels_merge() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 0 2 gold say.01 ----- 3:1-ARG1 5:1-ARG1 2:0-rel")
            .unwrap()
            .unwrap();
        assert_eq!(instance.arguments().len(), 2);
        assert_eq!(instance.argument("ARG1").unwrap().nodes().len(), 2);
    }

    #[test]
    fn test_link_slc_becomes_reference() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        // ARG0 is the trace; the link ties the trace to the relative pronoun
        let instance = parser
            .parse_line("wsj.mrg 1 4 gold bark.01 ----- 3:1-ARG0 4:0-rel 3:1*2:1-LINK-SLC")
            .unwrap()
            .unwrap();
        let reference = instance.argument("R-ARG0").unwrap();
        let tree = instance.tree();
        assert_eq!(reference.nodes().len(), 1);
        assert_eq!(tree[reference.nodes()[0]].label(), "WHNP");
    }

    #[test]
    fn test_unresolved_and_other_links_dropped() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 1 4 gold bark.01 ----- 3:1-ARG0 4:0-rel 0:1*2:1-LINK-SLC 0:1*3:1-LINK-PCR")
            .unwrap()
            .unwrap();
        assert_eq!(instance.arguments().len(), 2);
        assert!(instance.argument("R-ARG0").is_none());
    }

    #[test]
    fn test_alt_predicate() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 0 2 gold say.01 ----- 2:0-rel 4:0-ARGM-PRR")
            .unwrap()
            .unwrap();
        assert_eq!(instance.alt_predicates().len(), 1);
        assert!(instance.argument("ARGM-PRR").is_none());
    }

    #[test]
    fn test_nombank_format() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus).with_format(AnnotationFormat::NomBank);
        let instance = parser.parse_line("wsj.mrg 0 4 price 01 4:0-rel 3:0-ARG1").unwrap().unwrap();
        assert_eq!(instance.roleset_id(), "price.01");
        assert_eq!(instance.lemma(), "price");
        assert_eq!(instance.argument("ARG1").unwrap().words(instance.tree()), vec!["the"]);
    }

    #[test]
    fn test_probability_suffix() {
        let corpus = corpus();
        let parser = PropbankParser::new(&corpus);
        let instance = parser
            .parse_line("wsj.mrg 0 2 auto say.01 ----- 0:1-ARG0-0.25 2:0-rel")
            .unwrap()
            .unwrap();
        assert_eq!(instance.argument("ARG0").unwrap().probability(), 0.25);
        assert!(instance.to_string().contains("0:1-ARG0-0.25"));
    }
}
