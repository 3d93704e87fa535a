//! Boundary-aware fixed-size splitting.
//!
//! Chunks are cut close to `chunk_size` characters, preferring paragraph,
//! line, and word boundaries over raw character cuts. Each chunk starts
//! exactly `overlap` characters before the end of the previous one, so
//! concatenating chunks with the overlaps dropped reproduces the source
//! text exactly.

use super::{ChunkingConfig, TextChunk};

/// Boundary candidates, in order of preference.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Boundary-aware splitter with a fixed chunk size and overlap.
pub struct RecursiveSplitter {
    config: ChunkingConfig,
}

impl RecursiveSplitter {
    /// Create a splitter.
    ///
    /// `overlap` must be smaller than `chunk_size`, otherwise chunking could
    /// never advance through the document.
    pub fn new(config: ChunkingConfig) -> Self {
        assert!(
            config.overlap < config.chunk_size,
            "overlap must be smaller than chunk_size"
        );
        Self { config }
    }

    /// Split a document into ordered, overlapping chunks.
    pub fn split(&self, document: &str) -> Vec<TextChunk> {
        // Byte offset of every character, plus the end sentinel, so char
        // positions can be sliced without landing inside a UTF-8 sequence.
        let offsets: Vec<usize> = document
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(document.len()))
            .collect();
        let char_count = offsets.len() - 1;

        if char_count == 0 {
            return Vec::new();
        }

        let chars: Vec<char> = document.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let hard_end = (start + self.config.chunk_size).min(char_count);
            let end = if hard_end == char_count {
                char_count
            } else {
                self.find_break(&chars, start, hard_end)
            };

            chunks.push(TextChunk {
                content: document[offsets[start]..offsets[end]].to_string(),
                start_char: start,
                end_char: end,
                order: chunks.len(),
            });

            if end == char_count {
                break;
            }
            start = end - self.config.overlap;
        }

        chunks
    }

    /// Find the best chunk end in `(start + overlap, hard_end]`.
    ///
    /// Prefers ending just after a separator; the lower bound keeps every
    /// chunk longer than the overlap so the next start always advances.
    fn find_break(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let min_end = start + self.config.overlap + 1;

        for sep in SEPARATORS {
            let sep_chars: Vec<char> = sep.chars().collect();
            let width = sep_chars.len();

            let mut end = hard_end;
            while end >= min_end {
                if end >= width && chars[end - width..end] == sep_chars[..] {
                    return end;
                }
                end -= 1;
            }
        }

        hard_end
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, overlap: usize) -> RecursiveSplitter {
        RecursiveSplitter::new(ChunkingConfig {
            chunk_size,
            overlap,
        })
    }

    /// Rebuild the source from chunks by dropping each chunk's overlap with
    /// its predecessor.
    fn reconstruct(chunks: &[TextChunk]) -> String {
        let mut out = String::new();
        let mut prev_end = 0usize;
        for chunk in chunks {
            let skip = prev_end - chunk.start_char;
            out.extend(chunk.content.chars().skip(skip));
            prev_end = chunk.end_char;
        }
        out
    }

    #[test]
    fn test_short_document_is_one_chunk() {
        let chunks = splitter(1000, 200).split("a short document");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "a short document");
        assert_eq!(chunks[0].start_char, 0);
        assert_eq!(chunks[0].end_char, 16);
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        assert!(splitter(1000, 200).split("").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let document = "word ".repeat(1000);
        let chunks = splitter(100, 20).split(&document);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.char_len() <= 100);
        }
    }

    #[test]
    fn test_prefers_word_boundaries() {
        let document = "word ".repeat(1000);
        let chunks = splitter(100, 20).split(&document);

        // Every non-final chunk should end just after a space, never
        // mid-word.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.content.ends_with(' '), "chunk ended mid-word");
        }
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let document = "word ".repeat(1000);
        let chunks = splitter(100, 20).split(&document);

        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start_char, pair[0].end_char - 20);
            let tail: String = pair[0]
                .content
                .chars()
                .skip(pair[0].char_len() - 20)
                .collect();
            let head: String = pair[1].content.chars().take(20).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_reconstruction_is_lossless() {
        let document = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(60);
        let chunks = splitter(1000, 200).split(&document);

        assert!(chunks.len() >= 3);
        assert_eq!(reconstruct(&chunks), document);
    }

    #[test]
    fn test_reconstruction_without_boundaries() {
        // No separators at all forces raw character cuts.
        let document = "x".repeat(2500);
        let chunks = splitter(1000, 200).split(&document);

        for chunk in &chunks {
            assert!(chunk.char_len() <= 1000);
        }
        assert_eq!(reconstruct(&chunks), document);
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let document = "æøå ".repeat(500);
        let chunks = splitter(100, 20).split(&document);

        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks), document);
    }

    #[test]
    fn test_paragraph_boundary_preferred_over_space() {
        let mut document = "a".repeat(500);
        document.push_str("\n\n");
        document.push_str(&"b ".repeat(400));
        let chunks = splitter(600, 100).split(&document);

        assert!(chunks[0].content.ends_with("\n\n"));
        assert_eq!(reconstruct(&chunks), document);
    }

    #[test]
    fn test_spec_sized_transcript_produces_multiple_chunks() {
        let document = "the quick brown fox jumps over the lazy dog ".repeat(114);
        assert!(document.chars().count() > 5000);

        let chunks = RecursiveSplitter::default().split(&document);
        assert!(chunks.len() >= 5);
        assert_eq!(reconstruct(&chunks), document);
    }

    #[test]
    #[should_panic(expected = "overlap must be smaller than chunk_size")]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        splitter(100, 100);
    }
}
