//! Head-rule tables and their text format.
//!
//! One rule per line: a category followed by `;`-separated clauses.
//! A clause is an optional direction (`l`/`left` or `r`/`right`) and a
//! regular expression matched against the whole base category of a child.
//! A clause without direction inherits it from the previous clause of the
//! same rule; the first clause of a rule must name one. The category `*`
//! gives the default rule, used for categories without their own rule.
//! Blank lines and lines starting with `#` are ignored.
//!
//! ```text
//! # category  clauses
//! VP  l TO; VBD; VBN; MD; VBZ; VB; VBG; VBP; VP
//! NP  r NN|NNS|NNP; l NP
//! *   l .*
//! ```

use crate::heads::defaults::ENGLISH_HEAD_RULES;
use crate::parser::{ParsingError, ParsingErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Category name of the default rule.
pub const DEFAULT_RULE_CATEGORY: &str = "*";

static ENGLISH: Lazy<Arc<HeadRuleTable>> = Lazy::new(|| {
    Arc::new(HeadRuleTable::parse(ENGLISH_HEAD_RULES).expect("built-in head rules are valid"))
});

/// Direction in which a clause scans the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// First to last child
    Left,
    /// Last to first child
    Right,
}

impl Direction {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "l" | "left" => Some(Direction::Left),
            "r" | "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "l"),
            Direction::Right => write!(f, "r"),
        }
    }
}

// =#========================================================================#=
// HEAD RULE
// =#========================================================================#=
/// One clause of a head rule: scan direction plus category pattern.
#[derive(Debug, Clone)]
pub struct HeadClause {
    direction: Direction,
    source: String,
    pattern: Regex,
}

impl HeadClause {
    /// Compiles a clause; the pattern must match the whole category.
    pub fn new(direction: Direction, pattern: &str) -> Result<Self, regex::Error> {
        Ok(HeadClause {
            direction,
            source: pattern.to_string(),
            pattern: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    /// Scan direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Pattern as written in the rule.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Whether the pattern matches the given base category.
    pub fn matches(&self, category: &str) -> bool {
        self.pattern.is_match(category)
    }
}

/// Ordered clauses for one category.
#[derive(Debug, Clone)]
pub struct HeadRule {
    category: String,
    clauses: Vec<HeadClause>,
}

impl HeadRule {
    /// Category this rule applies to (`*` for the default rule).
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Clauses in priority order.
    pub fn clauses(&self) -> &[HeadClause] {
        &self.clauses
    }

    /// Direction of the first clause, used when no clause matches.
    pub fn fallback_direction(&self) -> Direction {
        self.clauses.first().map_or(Direction::Left, |c| c.direction)
    }
}

impl fmt::Display for HeadRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.category)?;
        for (i, clause) in self.clauses.iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            write!(f, "{sep}{} {}", clause.direction, clause.source)?;
        }
        Ok(())
    }
}

// =#========================================================================#=
// HEAD RULE TABLE
// =#========================================================================#=
/// Mapping from base category to [HeadRule], plus a default rule.
///
/// Tables are immutable once parsed and meant to be shared, e.g. via
/// [HeadRuleTable::english] which returns a process-wide instance.
///
/// # Example
/// ```
/// use treebank::heads::{Direction, HeadRuleTable};
///
/// let table = HeadRuleTable::parse("VP l VB.*; MD\nNP r NN.*").unwrap();
/// let vp = table.rule_for("VP");
/// assert_eq!(vp.clauses().len(), 2);
/// assert_eq!(vp.clauses()[1].direction(), Direction::Left);
/// // Categories without rule fall back to `* l .*`
/// assert_eq!(table.rule_for("ADJP").category(), "*");
/// ```
#[derive(Debug, Clone)]
pub struct HeadRuleTable {
    rules: HashMap<String, HeadRule>,
    default_rule: HeadRule,
}

impl HeadRuleTable {
    /// Parses a table from its text format.
    ///
    /// # Errors
    /// A [HeadRule](ParsingErrorKind::HeadRule) error naming the line for a
    /// rule without clauses, a first clause without direction, or an invalid
    /// pattern.
    pub fn parse(text: &str) -> Result<Self, ParsingError> {
        let mut rules: HashMap<String, HeadRule> = HashMap::new();

        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let rule = Self::parse_line(trimmed).map_err(|msg| {
                ParsingError::at_line(ParsingErrorKind::HeadRule(msg), number + 1, line)
            })?;

            // A repeated category extends its rule
            match rules.get_mut(&rule.category) {
                Some(existing) => existing.clauses.extend(rule.clauses),
                None => {
                    rules.insert(rule.category.clone(), rule);
                }
            }
        }

        let default_rule = match rules.remove(DEFAULT_RULE_CATEGORY) {
            Some(rule) => rule,
            None => HeadRule {
                category: DEFAULT_RULE_CATEGORY.to_string(),
                clauses: vec![HeadClause::new(Direction::Left, ".*").map_err(|e| {
                    ParsingError::without_context(ParsingErrorKind::HeadRule(e.to_string()))
                })?],
            },
        };

        Ok(HeadRuleTable { rules, default_rule })
    }

    /// Reads and parses a table from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Shared built-in table for English.
    pub fn english() -> Arc<HeadRuleTable> {
        Arc::clone(&ENGLISH)
    }

    /// Rule for the given base category, the default rule if there is none.
    pub fn rule_for(&self, category: &str) -> &HeadRule {
        self.rules.get(category).unwrap_or(&self.default_rule)
    }

    /// Whether the category has its own rule.
    pub fn has_rule(&self, category: &str) -> bool {
        self.rules.contains_key(category)
    }

    /// The default rule.
    pub fn default_rule(&self) -> &HeadRule {
        &self.default_rule
    }

    /// Number of category-specific rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no category-specific rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn parse_line(line: &str) -> Result<HeadRule, String> {
        let Some((category, rest)) = line.split_once(char::is_whitespace) else {
            return Err(format!("rule for '{line}' has no clauses"));
        };

        let mut clauses = Vec::new();
        let mut direction: Option<Direction> = None;
        for clause in rest.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let (keyword, remainder) = match clause.split_once(char::is_whitespace) {
                Some((keyword, remainder)) => (keyword, remainder.trim()),
                None => (clause, ""),
            };
            let pattern = match Direction::from_keyword(keyword) {
                Some(explicit) => {
                    direction = Some(explicit);
                    if remainder.is_empty() { ".*" } else { remainder }
                }
                None => clause,
            };
            let Some(direction) = direction else {
                return Err(format!("first clause '{clause}' of {category} has no direction"));
            };
            let compiled = HeadClause::new(direction, pattern)
                .map_err(|e| format!("invalid pattern '{pattern}' for {category}: {e}"))?;
            clauses.push(compiled);
        }

        if clauses.is_empty() {
            return Err(format!("rule for '{category}' has no clauses"));
        }

        Ok(HeadRule { category: category.to_string(), clauses })
    }
}

impl FromStr for HeadRuleTable {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeadRuleTable::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorLocation;

    #[test]
    fn test_direction_inherited() {
        let table = HeadRuleTable::parse("S r VP; S; l NP; ADJP").unwrap();
        let dirs: Vec<Direction> = table.rule_for("S").clauses().iter().map(|c| c.direction()).collect();
        assert_eq!(dirs, vec![Direction::Right, Direction::Right, Direction::Left, Direction::Left]);
    }

    #[test]
    fn test_patterns_match_whole_category() {
        let table = HeadRuleTable::parse("NP r NN|NNS").unwrap();
        let clause = &table.rule_for("NP").clauses()[0];
        assert!(clause.matches("NNS"));
        assert!(!clause.matches("NNPS"));
    }

    #[test]
    fn test_default_rule() {
        let table = HeadRuleTable::parse("# comment\n\n* r .*\nVP l VB").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.default_rule().fallback_direction(), Direction::Right);
        assert_eq!(table.rule_for("NP").category(), "*");
        assert!(table.has_rule("VP"));
    }

    #[test]
    fn test_missing_direction_is_error() {
        let err = HeadRuleTable::parse("VP l VB\nNP NN").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorKind::HeadRule(_)));
        assert_eq!(err.location(), ErrorLocation::Line(2));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let err = HeadRuleTable::parse("VP l VB(").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorKind::HeadRule(_)));
    }

    #[test]
    fn test_english_table() {
        let table = HeadRuleTable::english();
        assert!(table.has_rule("VP"));
        assert!(table.has_rule("WHNP"));
        assert_eq!(table.rule_for("PP").fallback_direction(), Direction::Right);
        assert_eq!(table.rule_for("VP").to_string().split("; ").count(), 13);
    }
}
