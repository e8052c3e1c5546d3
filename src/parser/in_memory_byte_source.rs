//! Byte source over text already held in memory.

use crate::parser::byte_source::ByteSource;
use std::fs;
use std::path::Path;

// =#========================================================================#=
// IN MEMORY BYTE SOURCE
// =#========================================================================$=
/// Owns the whole text of a tree file or string.
///
/// Used for `parse_str` and for files below the
/// [ReadStrategy](crate::parser::ReadStrategy) size threshold.
pub struct InMemoryByteSource {
    bytes: Vec<u8>,
    cursor: usize,
}

impl InMemoryByteSource {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Loads a whole tree file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<InMemoryByteSource> {
        fs::read(path).map(Self::from_vec)
    }
}

impl ByteSource for InMemoryByteSource {
    #[inline(always)]
    fn peek(&mut self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.cursor += 1;
        Some(byte)
    }

    fn upcoming(&mut self, k: usize) -> Vec<u8> {
        let end = (self.cursor + k).min(self.bytes.len());
        self.bytes[self.cursor..end].to_vec()
    }

    #[inline]
    fn position(&self) -> usize {
        self.cursor
    }

    fn is_eof(&mut self) -> bool {
        self.cursor >= self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_a_leaf_bracket() {
        let mut source = InMemoryByteSource::from_vec(b"(NN dog)".to_vec());
        assert_eq!(source.peek(), Some(b'('));
        assert_eq!(source.next_byte(), Some(b'('));
        assert_eq!(source.upcoming(2), b"NN".to_vec());
        assert_eq!(source.position(), 1);

        let rest: Vec<u8> = std::iter::from_fn(|| source.next_byte()).collect();
        assert_eq!(rest, b"NN dog)".to_vec());
        assert!(source.is_eof());
        assert_eq!(source.upcoming(10), Vec::<u8>::new());
    }
}
