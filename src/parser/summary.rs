//! Bookkeeping of parsed vs. skipped units over a whole input.

use crate::parser::parsing_error::ParsingError;
use std::fmt;

/// Counts of successfully parsed and skipped units (trees or instances),
/// with one diagnostic message per skipped unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Number of units parsed successfully
    pub parsed: usize,
    /// Number of units dropped because of an error
    pub skipped: usize,
    /// One message per skipped unit, in input order
    pub diagnostics: Vec<String>,
}

impl ParseSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully parsed unit.
    pub fn record_parsed(&mut self) {
        self.parsed += 1;
    }

    /// Records a skipped unit together with the reason.
    pub fn record_skipped(&mut self, err: &ParsingError) {
        self.skipped += 1;
        self.diagnostics.push(err.to_string());
    }

    /// Total number of units seen.
    pub fn total(&self) -> usize {
        self.parsed + self.skipped
    }
}

impl fmt::Display for ParseSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "parsed {}, skipped {} (of {})", self.parsed, self.skipped, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut summary = ParseSummary::new();
        summary.record_parsed();
        summary.record_skipped(&ParsingError::annotation("bad token"));
        assert_eq!(summary.parsed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.diagnostics.len(), 1);
        assert_eq!(summary.to_string(), "parsed 1, skipped 1 (of 2)");
    }
}
