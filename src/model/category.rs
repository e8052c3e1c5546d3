//! Constituent categories (POS tags and phrase labels).
//!
//! A category label such as `NP-SBJ-1` or `NP=2` consists of
//! * a base category (`NP`, `VBZ`, `-NONE-`, `-LRB-`, `,`),
//! * function tags (`SBJ`, `TMP`, ...),
//! * an optional coindex declaration `-N`, and
//! * an optional gapping reference `=N`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Base category of empty-category terminals (traces, null elements).
pub const EMPTY_CATEGORY: &str = "-NONE-";

/// Base categories never selected as heads.
pub const HEAD_EXCLUDED_PUNCTUATION: &[&str] = &[":", ","];

/// Well-formed category labels; others are accepted with a warning.
static CATEGORY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:-[A-Z]+-|[A-Z][A-Z0-9]*\$?|[.,:;`'$#]+)(?:[-=][A-Z0-9]+)*$")
        .expect("valid category pattern")
});

/// Splits a label into base category and tail of `-X` / `=X` segments.
static CATEGORY_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-[A-Za-z]+-|[^-=]+|[-=]+)(.*)$").expect("valid split pattern"));

/// One `-TAG`, `-N` or `=N` segment of the tail.
static CATEGORY_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-=])([^-=]+)").expect("valid segment pattern"));

/// Numeric suffix of empty-category words, e.g. `*T*-1`.
static TRACE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*[^-]*-(\d+)$").expect("valid trace pattern"));

// =#========================================================================#=
// CATEGORY
// =#========================================================================#=
/// Parsed category label of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Category {
    text: String,
    base: String,
    function_tags: Vec<String>,
    coindex: Option<u32>,
    gap_index: Option<u32>,
}

impl Category {
    /// Parses a label; never fails, unrecognised parts end up in the base.
    ///
    /// # Example
    /// ```
    /// use treebank::model::Category;
    ///
    /// let cat = Category::parse("NP-SBJ-1");
    /// assert_eq!(cat.base(), "NP");
    /// assert_eq!(cat.function_tags(), ["SBJ"]);
    /// assert_eq!(cat.coindex(), Some(1));
    ///
    /// let gapped = Category::parse("NP=2");
    /// assert_eq!(gapped.gap_index(), Some(2));
    /// assert_eq!(Category::parse("-NONE-").base(), "-NONE-");
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut category = Category {
            text: text.to_string(),
            base: text.to_string(),
            ..Default::default()
        };

        let Some(caps) = CATEGORY_SPLIT.captures(text) else {
            return category;
        };
        category.base = caps[1].to_string();

        for segment in CATEGORY_SEGMENT.captures_iter(&caps[2]) {
            let value = &segment[2];
            match (&segment[1], value.parse::<u32>()) {
                ("-", Ok(n)) => category.coindex = Some(n),
                ("=", Ok(n)) => category.gap_index = Some(n),
                _ => category.function_tags.push(value.to_string()),
            }
        }

        category
    }

    /// Category of a node written without a label, e.g. the outer `( ... )`.
    pub fn unlabeled() -> Self {
        Self::default()
    }

    /// Whether a label matches the expected category syntax.
    pub fn is_well_formed(text: &str) -> bool {
        CATEGORY_PATTERN.is_match(text)
    }

    /// The full label as written in the source.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The base category without function tags and indices.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Function tags in source order.
    pub fn function_tags(&self) -> &[String] {
        &self.function_tags
    }

    /// Whether the given function tag is present.
    pub fn has_function_tag(&self, tag: &str) -> bool {
        self.function_tags.iter().any(|t| t == tag)
    }

    /// Declared coindex (`-N` suffix), if any.
    pub fn coindex(&self) -> Option<u32> {
        self.coindex
    }

    /// Gapping reference (`=N` suffix), if any.
    pub fn gap_index(&self) -> Option<u32> {
        self.gap_index
    }

    /// Whether this is the empty-category tag `-NONE-`.
    pub fn is_empty_category(&self) -> bool {
        self.base == EMPTY_CATEGORY
    }

    /// Whether this is one of the punctuation tags skipped during head finding.
    pub fn is_head_excluded_punctuation(&self) -> bool {
        HEAD_EXCLUDED_PUNCTUATION.contains(&self.base.as_str())
    }

    /// Whether the node was written without a label.
    pub fn is_unlabeled(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Extracts the referenced index from an empty-category word like `*T*-1`.
pub fn trace_index(word: &str) -> Option<u32> {
    TRACE_WORD
        .captures(word)
        .and_then(|caps| caps[1].parse().ok())
}
