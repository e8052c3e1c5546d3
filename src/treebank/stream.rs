//! Background parsing of treebank files.
//!
//! A [TreeStream] runs a [TreebankParser] on a worker thread and hands the
//! parsed trees to the consumer through a bounded queue, so parsing overlaps
//! with whatever the consumer does with each tree.

use crate::model::Tree;
use crate::parser::byte_parser::{ByteParser, ReadStrategy};
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use crate::parser::summary::ParseSummary;
use crate::treebank::corpus::source_id_for;
use crate::treebank::parser::TreebankParser;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Default number of trees buffered between worker and consumer.
pub const DEFAULT_CAPACITY: usize = 64;

/// Messages from the worker to the consumer.
enum Message {
    Tree(Box<Tree>),
    End,
}

// =#========================================================================#=
// TREE STREAM
// =#========================================================================#=
/// Iterator over trees parsed on a background thread.
///
/// Trees that fail to parse are logged and skipped; the
/// [summary](Self::finish) reports them. Iteration ends after the last tree.
/// Dropping the stream (or calling [close](Self::close)) cancels the worker,
/// discards queued trees and waits for the thread to end.
///
/// # Example
/// ```
/// use treebank::parser::ByteParser;
/// use treebank::treebank::{TreebankParser, TreeStream};
///
/// let input = "(S (NN a)) (S (NN b) c) (S (NN d))";
/// let mut stream = TreeStream::spawn(TreebankParser::new("t"), ByteParser::for_str(input), 2);
///
/// let words: Vec<String> = stream.by_ref().map(|tree| tree.words().join(" ")).collect();
/// assert_eq!(words, vec!["a", "d"]);
///
/// let summary = stream.finish();
/// assert_eq!(summary.skipped, 1);
/// ```
pub struct TreeStream {
    receiver: Option<Receiver<Message>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<ParseSummary>>,
    summary: Option<ParseSummary>,
    ended: bool,
}

impl TreeStream {
    /// Starts parsing on a worker thread with a queue of the given capacity.
    ///
    /// A capacity of 0 makes every hand-over a rendezvous.
    pub fn spawn<B>(parser: TreebankParser, byte_parser: ByteParser<B>, capacity: usize) -> Self
    where
        B: ByteSource + Send + 'static,
    {
        let (sender, receiver) = bounded(capacity);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let worker = thread::spawn(move || produce(parser, byte_parser, sender, flag));

        TreeStream {
            receiver: Some(receiver),
            running,
            worker: Some(worker),
            summary: None,
            ended: false,
        }
    }

    /// Opens a file and starts parsing it in the background.
    ///
    /// The source is named by the file name; files are streamed through a
    /// buffer rather than loaded into memory.
    ///
    /// # Errors
    /// A [ParsingError] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let path = path.as_ref();
        let byte_parser = ByteParser::from_file(path, ReadStrategy::Buffered)?;
        Ok(Self::spawn(TreebankParser::new(source_id_for(path)), byte_parser, DEFAULT_CAPACITY))
    }

    /// Whether the worker may still produce trees.
    pub fn is_running(&self) -> bool {
        !self.ended && self.running.load(Ordering::Acquire)
    }

    /// Cancels the worker, discards queued trees and waits for it to end.
    ///
    /// Calling this more than once is harmless.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::Release);
        self.ended = true;

        // Dropping the receiver unblocks a worker waiting on a full queue
        if let Some(receiver) = self.receiver.take() {
            while receiver.try_recv().is_ok() {}
        }

        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(summary) => self.summary = Some(summary),
                Err(_) => log::error!("Tree stream worker panicked"),
            }
        }
    }

    /// Closes the stream and returns the counts of parsed and skipped trees.
    ///
    /// Trees still queued when this is called are discarded (and not
    /// counted as skipped).
    pub fn finish(mut self) -> ParseSummary {
        self.close();
        self.summary.take().unwrap_or_default()
    }
}

impl Iterator for TreeStream {
    type Item = Tree;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ended {
            return None;
        }

        match self.receiver.as_ref().map(|r| r.recv()) {
            Some(Ok(Message::Tree(tree))) => Some(*tree),
            Some(Ok(Message::End)) | Some(Err(_)) | None => {
                self.ended = true;
                None
            }
        }
    }
}

impl Drop for TreeStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Worker loop: parses trees and sends them until done or cancelled.
fn produce<B: ByteSource>(
    parser: TreebankParser,
    byte_parser: ByteParser<B>,
    sender: Sender<Message>,
    running: Arc<AtomicBool>,
) -> ParseSummary {
    let source_id = parser.source_id().to_string();
    let mut summary = ParseSummary::new();
    let mut trees = parser.into_iter(byte_parser);

    while running.load(Ordering::Acquire) {
        match trees.next() {
            None => break,
            Some(Ok(tree)) => {
                summary.record_parsed();
                if sender.send(Message::Tree(Box::new(tree))).is_err() {
                    // Consumer is gone
                    return summary;
                }
            }
            Some(Err(err)) => {
                summary.record_skipped(&err);
                if err.is_io() {
                    log::error!("Stopping to read {source_id}: {err}");
                    break;
                }
                log::warn!("Skipping tree in {source_id}: {err}");
            }
        }
    }

    log::debug!("Finished reading {source_id}: {summary}");
    let _ = sender.send(Message::End);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(num_trees: usize) -> String {
        (0..num_trees).map(|i| format!("(S (NN w{i}))\n")).collect()
    }

    #[test]
    fn test_streams_all_trees_in_order() {
        let stream = TreeStream::spawn(TreebankParser::new("t"), ByteParser::for_str(&input(50)), 4);
        let indices: Vec<usize> = stream.map(|tree| tree.index()).collect();
        assert_eq!(indices, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_early_close_does_not_hang() {
        let mut stream = TreeStream::spawn(TreebankParser::new("t"), ByteParser::for_str(&input(1000)), 1);
        assert_eq!(stream.next().unwrap().index(), 0);
        stream.close();
        assert!(!stream.is_running());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_drop_without_consuming() {
        let stream = TreeStream::spawn(TreebankParser::new("t"), ByteParser::for_str(&input(100)), 0);
        drop(stream);
    }

    #[test]
    fn test_empty_input() {
        let mut stream = TreeStream::spawn(TreebankParser::new("t"), ByteParser::for_str(""), 4);
        assert!(stream.next().is_none());
        assert_eq!(stream.finish().total(), 0);
    }
}
