//! Splitting transcripts into overlapping chunks for embedding and retrieval.

mod recursive;

pub use recursive::RecursiveSplitter;

use serde::{Deserialize, Serialize};

/// A chunk of transcript text produced by splitting.
///
/// Offsets are character offsets into the source document. A chunk covers
/// `[start_char, end_char)` and is immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Character offset of the first character in the source document.
    pub start_char: usize,
    /// Character offset one past the last character.
    pub end_char: usize,
    /// Order of this chunk in the document.
    pub order: usize,
}

impl TextChunk {
    /// Length of this chunk in characters.
    pub fn char_len(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Configuration for chunk splitting.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters of context shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}
