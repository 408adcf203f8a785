//! Size-bounded chunking of file contents.
//!
//! Backed by the `text-splitter` crate: text is broken at the coarsest
//! semantic level that fits (paragraphs, lines, words, graphemes), chunks
//! are measured in characters and neighbouring chunks share up to
//! `chunk_overlap` characters.

use anyhow::{Context, Result};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Splits file contents into overlapping chunks of at most `chunk_size`
/// characters.
pub struct DocumentSplitter {
    inner: TextSplitter<Characters>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentSplitter {
    /// Fails when the overlap is not smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .with_context(|| {
                format!(
                    "Invalid chunking settings (size {}, overlap {})",
                    chunk_size, chunk_overlap
                )
            })?;

        Ok(Self {
            inner: TextSplitter::new(config),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.inner
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let splitter = DocumentSplitter::new(1500, 150).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = DocumentSplitter::new(1500, 150).unwrap();
        assert_eq!(splitter.split("  print('hi')\n"), vec!["print('hi')"]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = (0..400)
            .map(|i| format!("line number {} with some words", i))
            .collect::<Vec<_>>()
            .join("\n");
        let splitter = DocumentSplitter::new(200, 20).unwrap();
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 200, "chunk too long: {}", char_len(chunk));
        }
    }

    #[test]
    fn test_paragraphs_preferred_over_lines() {
        let para_a = "a".repeat(60);
        let para_b = "b".repeat(60);
        let text = format!("{}\n\n{}", para_a, para_b);
        let chunks = DocumentSplitter::new(100, 0).unwrap().split(&text);
        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn test_neighbouring_chunks_overlap() {
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll mm nn oo pp";
        let chunks = DocumentSplitter::new(12, 5).unwrap().split(text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(pair[0].contains(first_word), "no overlap in {:?}", pair);
        }
    }

    #[test]
    fn test_multibyte_text_measured_in_characters() {
        let text = "é".repeat(250);
        let chunks = DocumentSplitter::new(100, 10).unwrap().split(&text);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 100);
        }
    }

    #[test]
    fn test_overlap_not_below_size_rejected() {
        assert!(DocumentSplitter::new(10, 50).is_err());
        assert_eq!(DocumentSplitter::new(10, 9).unwrap().chunk_overlap(), 9);
    }
}
