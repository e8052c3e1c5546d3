//! Where the lexer's bytes come from.
//!
//! [ByteSource] is implemented by [InMemoryByteSource](crate::parser::InMemoryByteSource)
//! for text held in memory and by [BufferedByteSource](crate::parser::BufferedByteSource)
//! for readers such as treebank files on disk.

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================T=
/// A forward-only cursor over bracketed tree text.
///
/// Treebank text is read strictly left to right, so a source only needs a
/// one-byte lookahead plus a short window of upcoming bytes for error
/// messages. Both the synchronous parser and the background [TreeStream]
/// read through this trait.
///
/// [TreeStream]: crate::treebank::TreeStream
pub trait ByteSource {
    /// The next byte, left in place; `None` at end of input.
    fn peek(&mut self) -> Option<u8>;

    /// The next byte, consumed; `None` at end of input.
    fn next_byte(&mut self) -> Option<u8>;

    /// Up to `k` bytes ahead of the cursor, without consuming them.
    ///
    /// Only used to quote the input in a [ParsingError](crate::parser::ParsingError),
    /// so a source may return fewer bytes if more are not buffered.
    fn upcoming(&mut self, k: usize) -> Vec<u8>;

    /// Bytes consumed so far.
    fn position(&self) -> usize;

    fn is_eof(&mut self) -> bool;
}
