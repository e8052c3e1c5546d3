//! Buffered reader implementation of byte source for parsing.
//!
//! This module provides [BufferedByteSource], which wraps a reader in a
//! [BufReader] for streaming I/O. Use this for large treebank files or when
//! handing a source to a [TreeStream](crate::treebank::TreeStream) worker.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::parser::byte_source::ByteSource;

// =#========================================================================#=
// BUFFERED BYTE SOURCE
// =#========================================================================$=
/// A buffered byte source for streaming large files.
///
/// Lexing treebank text never needs to backtrack, so peeking only ever looks
/// at the front of the current [BufReader] buffer. Read errors are treated
/// as end of data and logged.
pub struct BufferedByteSource<R: Read = File> {
    /// Underlying reader, handles getting chunks from the file
    reader: BufReader<R>,

    /// Current absolute position in the stream
    pos: usize,
}

impl BufferedByteSource<File> {
    /// Creates a new buffered byte source from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<BufferedByteSource<File>> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> BufferedByteSource<R> {
    /// Creates a new buffered byte source over any reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pos: 0,
        }
    }

    fn buffer(&mut self) -> &[u8] {
        match self.reader.fill_buf() {
            Ok(buf) => buf,
            Err(err) => {
                log::warn!("Read error at byte {}, treating as end of input: {err}", self.pos);
                &[]
            }
        }
    }
}

impl<R: Read> ByteSource for BufferedByteSource<R> {
    fn peek(&mut self) -> Option<u8> {
        self.buffer().first().copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.reader.consume(1);
        self.pos += 1;
        Some(byte)
    }

    fn upcoming(&mut self, k: usize) -> Vec<u8> {
        let buf = self.buffer();
        buf[..k.min(buf.len())].to_vec()
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn is_eof(&mut self) -> bool {
        self.buffer().is_empty()
    }
}

// =#========================================================================#=
// TESTS - BUFFERED BYTE SOURCE
// =#========================================================================$=
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_reads_all_bytes() {
        let data: &[u8] = b"( (S (NN a)) )";
        let mut source = BufferedByteSource::from_reader(data);

        let mut out = Vec::new();
        while let Some(b) = source.next_byte() {
            out.push(b);
        }
        assert_eq!(out, data.to_vec());
        assert_eq!(source.position(), data.len());
        assert!(source.is_eof());
    }

    #[test]
    fn test_buffered_context_does_not_consume() {
        let data: &[u8] = b"(NP (DT the))";
        let mut source = BufferedByteSource::from_reader(data);
        assert_eq!(source.upcoming(3), b"(NP".to_vec());
        assert_eq!(source.peek(), Some(b'('));
        assert_eq!(source.position(), 0);
    }
}
