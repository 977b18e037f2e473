//! Overlapping, boundary-aware text chunking
//!
//! Splits extracted text into chunks of roughly `chunk_size` characters,
//! preferring to cut just after a sentence terminator, then at whitespace,
//! then mid-word as a last resort. Consecutive chunks share `overlap`
//! characters so that context is preserved across chunk boundaries.

use crate::error::{Error, Result};

/// Backward scan window for sentence terminators, relative to the tentative end
const SENTENCE_WINDOW: usize = 100;
/// Backward scan window for whitespace, relative to the tentative end
const WORD_WINDOW: usize = 50;

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. Overlap must be strictly smaller than the chunk
    /// size; anything else would stall the cursor and is rejected up front.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split text into ordered, trimmed, non-empty chunks. Empty input
    /// yields an empty sequence.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < total {
            let mut end = start + self.chunk_size;

            if end < total {
                end = self.find_cut(&chars, start, end);
            }

            let piece: String = chars[start..end.min(total)].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }

            start = if end < total { end - self.overlap } else { total };
        }

        tracing::debug!("Created {} chunks from text of length {}", chunks.len(), total);
        chunks
    }

    /// Find the cut position for a chunk whose tentative end is inside the
    /// text. Scans backward from the tentative end: first for a sentence
    /// terminator within the last `SENTENCE_WINDOW` characters (cut right
    /// after it), then for whitespace within the last `WORD_WINDOW`
    /// characters (cut at it). Falls back to the raw tentative end.
    fn find_cut(&self, chars: &[char], start: usize, tentative: usize) -> usize {
        let floor = start.max(tentative.saturating_sub(SENTENCE_WINDOW));
        for i in (floor + 1..=tentative).rev() {
            if matches!(chars[i], '.' | '!' | '?' | '\n') {
                return i + 1;
            }
        }

        let floor = start.max(tentative.saturating_sub(WORD_WINDOW));
        for i in (floor + 1..=tentative).rev() {
            if chars[i].is_whitespace() {
                return i;
            }
        }

        tentative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(1000, 200).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n  ").is_empty());
    }

    #[test]
    fn short_text_yields_single_trimmed_chunk() {
        let chunker = TextChunker::new(1000, 200).unwrap();
        let chunks = chunker.chunk("  A short document.  ");
        assert_eq!(chunks, vec!["A short document.".to_string()]);
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        assert!(matches!(
            TextChunker::new(100, 100),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TextChunker::new(100, 150),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TextChunker::new(0, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn cuts_after_sentence_terminator() {
        // 60 chars per chunk; the period at position 39 falls inside the
        // sentence scan window, so the first chunk ends right after it.
        let text = format!("{}. {}", "a".repeat(39), "b".repeat(80));
        let chunker = TextChunker::new(60, 10).unwrap();
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0], format!("{}.", "a".repeat(39)));
    }

    #[test]
    fn falls_back_to_word_boundary() {
        // No sentence terminators at all; the space should be used instead.
        let text = format!("{} {}", "a".repeat(55), "b".repeat(60));
        let chunker = TextChunker::new(60, 10).unwrap();
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0], "a".repeat(55));
    }

    #[test]
    fn cuts_mid_word_as_last_resort() {
        let text = "x".repeat(250);
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0].len(), 100);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = "x".repeat(250);
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&text);

        // Cursor advances by chunk_size - overlap for uniform text
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[1].len(), 100);
        // Last chunk covers the tail: 250 - 2 * 80 = 90 remaining + overlap
        assert_eq!(chunks[2].len(), 90);
    }

    #[test]
    fn chunks_cover_the_whole_text_without_gaps() {
        // Every character of the input must appear in some chunk: the start
        // of chunk N+1 is at most the end of chunk N (they overlap).
        let text: String = (0..40)
            .map(|i| format!("Sentence number {} of the test corpus. ", i))
            .collect();
        let chunker = TextChunker::new(120, 30).unwrap();
        let chunks = chunker.chunk(&text);

        assert!(!chunks.is_empty());

        // Reconstruct coverage by locating each chunk in the original text;
        // each next chunk must start at or before the previous chunk's end.
        let mut covered_to = 0usize;
        let mut search_from = 0usize;
        for chunk in &chunks {
            let pos = text[search_from..]
                .find(chunk.as_str())
                .map(|p| p + search_from)
                .expect("chunk text must appear in the original");
            assert!(pos <= covered_to, "gap before chunk at byte {}", pos);
            covered_to = covered_to.max(pos + chunk.len());
            search_from = pos;
        }
        assert_eq!(covered_to, text.trim_end().len());
    }

    #[test]
    fn multibyte_text_is_chunked_on_character_boundaries() {
        let text = "日本語のテキスト。".repeat(40);
        let chunker = TextChunker::new(50, 10).unwrap();
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }
}
