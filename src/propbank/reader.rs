//! Line-by-line reading of annotation files.

use crate::parser::{ParseSummary, ParsingError};
use crate::propbank::instance::Instance;
use crate::propbank::parser::{AnnotationFormat, PropbankParser};
use crate::treebank::TreeLookup;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// =#========================================================================#=
// PROPBANK READER
// =#========================================================================#=
/// Iterator over the instances of an annotation file.
///
/// Consecutive lines for the same predicate and roleset are merged into one
/// instance. Bad lines are yielded as errors carrying their line number,
/// and reading continues with the next line; an I/O error ends iteration.
/// Items come out in the order of their first line: an error inside a
/// pending run is held back until that run is complete.
/// [ParseSummary] counts yielded instances and skipped lines.
///
/// # Example
/// ```
/// use treebank::propbank::PropbankReader;
/// use treebank::treebank::TreeCorpus;
///
/// let mut corpus = TreeCorpus::new();
/// corpus.load_str("f.parse", "( (S (NP (NNP Pierre)) (VP (VBZ is))) )");
///
/// let lines = "f.parse 0 1 gold is.01 ----- 0:1-ARG0 1:0-rel\n\
///              f.parse 0 9 gold is.01 ----- 1:0-rel\n";
/// let mut reader = PropbankReader::new(lines.as_bytes(), &corpus);
///
/// assert!(reader.next().unwrap().is_ok());
/// assert!(reader.next().unwrap().is_err());
/// assert!(reader.next().is_none());
/// assert_eq!(reader.summary().parsed, 1);
/// ```
pub struct PropbankReader<R: BufRead, L: TreeLookup> {
    input: R,
    parser: PropbankParser<L>,
    line_number: usize,
    buffer: String,
    pending: Option<Instance>,
    held: Vec<ParsingError>,
    ready: VecDeque<Result<Instance, ParsingError>>,
    summary: ParseSummary,
    done: bool,
}

impl<L: TreeLookup> PropbankReader<BufReader<File>, L> {
    /// Opens an annotation file.
    pub fn from_file<P: AsRef<Path>>(path: P, lookup: L) -> Result<Self, ParsingError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), lookup))
    }
}

impl<R: BufRead, L: TreeLookup> PropbankReader<R, L> {
    /// Creates a reader over PropBank lines.
    pub fn new(input: R, lookup: L) -> Self {
        PropbankReader {
            input,
            parser: PropbankParser::new(lookup),
            line_number: 0,
            buffer: String::new(),
            pending: None,
            held: Vec::new(),
            ready: VecDeque::new(),
            summary: ParseSummary::new(),
            done: false,
        }
    }

    /// Sets the line format.
    pub fn with_format(mut self, format: AnnotationFormat) -> Self {
        self.parser = self.parser.with_format(format);
        self
    }

    /// Counts so far.
    pub fn summary(&self) -> &ParseSummary {
        &self.summary
    }

    /// Consumes the reader, returning the final counts.
    pub fn into_summary(self) -> ParseSummary {
        self.summary
    }

    /// Number of lines read so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Queues a finished run followed by the errors held back during it.
    fn finish_run(&mut self, instance: Instance) {
        self.summary.record_parsed();
        self.ready.push_back(Ok(instance));
        self.ready.extend(self.held.drain(..).map(Err));
    }

    fn skip(&mut self, err: ParsingError) {
        let err = err.with_line(self.line_number, &self.buffer);
        log::warn!("Skipping annotation: {err}");
        self.summary.record_skipped(&err);
        if self.pending.is_some() {
            self.held.push(err);
        } else {
            self.ready.push_back(Err(err));
        }
    }

    /// Merges `instance` into the pending run or starts a new run.
    fn push(&mut self, instance: Instance) {
        match self.pending.as_mut() {
            Some(pending) if pending.same_predicate(&instance) => {
                let mut merged = pending.clone();
                merged.merge(instance);
                match merged.validate() {
                    Ok(()) => *pending = merged,
                    Err(err) => self.skip(err),
                }
            }
            _ => {
                if let Some(finished) = self.pending.replace(instance) {
                    self.finish_run(finished);
                }
            }
        }
    }

    fn read_next_line(&mut self) {
        self.buffer.clear();
        match self.input.read_line(&mut self.buffer) {
            Ok(0) => {
                self.done = true;
                if let Some(last) = self.pending.take() {
                    self.finish_run(last);
                }
            }
            Ok(_) => {
                self.line_number += 1;
                match self.parser.parse_line(&self.buffer) {
                    Ok(Some(instance)) => self.push(instance),
                    Ok(None) => {}
                    Err(err) => self.skip(err),
                }
            }
            Err(err) => {
                self.done = true;
                if let Some(last) = self.pending.take() {
                    self.finish_run(last);
                }
                let err = ParsingError::from(err).with_line(self.line_number + 1, "");
                log::error!("Stopped reading annotations: {err}");
                self.ready.push_back(Err(err));
            }
        }
    }
}

impl<R: BufRead, L: TreeLookup> Iterator for PropbankReader<R, L> {
    type Item = Result<Instance, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(item);
            }
            if self.done {
                return None;
            }
            self.read_next_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treebank::TreeCorpus;

    fn corpus() -> TreeCorpus {
        let mut corpus = TreeCorpus::new();
        corpus.load_str(
            "a.mrg",
            "( (S (NP-SBJ (NNP Mary)) (VP (VBD gave) (NP (PRP him)) (NP (DT a) (NN book)))) )\n\
             ( (S (NP-SBJ (PRP He)) (VP (VBD read) (NP (PRP it)))) )",
        );
        corpus
    }

    #[test]
    fn test_runs_are_merged() {
        let corpus = corpus();
        let lines = "a.mrg 0 1 gold give.01 ----- 0:1-ARG0 1:0-rel\n\
                     a.mrg 0 1 gold give.01 ----- 2:1-ARG2 3:1-ARG1\n\
                     a.mrg 1 1 gold read.01 ----- 0:1-ARG0 1:0-rel 2:1-ARG1\n";
        let instances: Vec<Instance> = PropbankReader::new(lines.as_bytes(), &corpus)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].arguments().len(), 4);
        assert_eq!(instances[1].roleset_id(), "read.01");
    }

    #[test]
    fn test_conflicting_merge_is_skipped() {
        let corpus = corpus();
        let lines = "a.mrg 0 1 gold give.01 ----- 0:1-ARG0 1:0-rel\n\
                     a.mrg 0 1 gold give.01 ----- 0:0-ARG1\n";
        let mut reader = PropbankReader::new(lines.as_bytes(), &corpus);
        let instance = reader.next().unwrap().unwrap();
        assert_eq!(instance.arguments().len(), 2);

        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.location(), crate::parser::ErrorLocation::Line(2));
        assert!(reader.next().is_none());
        assert_eq!(reader.summary().parsed, 1);
        assert_eq!(reader.summary().skipped, 1);
    }

    #[test]
    fn test_bad_lines_and_comments() {
        let corpus = corpus();
        let lines = "# header\n\
                     \n\
                     a.mrg 0 1 gold give.01 ----- 0:1-ARG0 1:0-rel 0:0-ARGM-DIS\n\
                     a.mrg 1 1 gold read.01 ----- 1:0-rel\n";
        let reader = PropbankReader::new(lines.as_bytes(), &corpus);
        let results: Vec<_> = reader.collect();

        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.location(), crate::parser::ErrorLocation::Line(3));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_items_follow_line_order() {
        let corpus = corpus();
        let lines = "a.mrg 0 1 gold give.01 ----- 0:1-ARG0 1:0-rel\n\
                     a.mrg 0 1 gold give.01 ----- 9:0-ARG1\n\
                     a.mrg 0 1 gold give.01 ----- 3:1-ARG1\n\
                     a.mrg 1 1 gold read.01 ----- 1:0-rel\n\
                     a.mrg 7 1 gold read.01 ----- 1:0-rel\n";
        let results: Vec<_> = PropbankReader::new(lines.as_bytes(), &corpus).collect();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().arguments().len(), 3);
        assert_eq!(results[1].as_ref().unwrap_err().location(), crate::parser::ErrorLocation::Line(2));
        assert_eq!(results[2].as_ref().unwrap().roleset_id(), "read.01");
        assert_eq!(results[3].as_ref().unwrap_err().location(), crate::parser::ErrorLocation::Line(5));
    }
}
