//! Text chunking.
//!
//! Text is cut on the configured separator, then the pieces are greedily
//! merged into chunks of at most `chunk_size` characters. Each new chunk
//! starts with up to `chunk_overlap` characters of trailing pieces from the
//! previous one. Sizes are counted in characters, not bytes.

use std::collections::VecDeque;

use super::config::ChunkingConfig;
use super::{IngestError, IngestResult};

/// Separator-based splitter with overlap.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

impl TextChunker {
    /// Create a chunker, rejecting an invalid configuration.
    pub fn new(config: ChunkingConfig) -> IngestResult<Self> {
        config.validate().map_err(IngestError::InvalidChunking)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split `text` into trimmed, non-empty chunks in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = text
            .split(self.config.separator.as_str())
            .filter(|piece| !piece.is_empty())
            .flat_map(|piece| self.hard_split(piece))
            .collect();

        self.merge(pieces)
    }

    /// Cut a single piece longer than `chunk_size` with a sliding window, so no
    /// chunk exceeds the limit even when the text has no separators.
    fn hard_split<'a>(&self, piece: &'a str) -> Vec<&'a str> {
        let size = self.config.chunk_size;
        let char_count = piece.chars().count();
        if char_count <= size {
            return vec![piece];
        }

        // Byte offset of every char boundary, including the end
        let bounds: Vec<usize> = piece
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(piece.len()))
            .collect();
        let step = size.saturating_sub(self.config.chunk_overlap).max(1);

        let mut windows = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + size).min(char_count);
            windows.push(&piece[bounds[start]..bounds[end]]);
            if end >= char_count {
                break;
            }
            start += step;
        }
        windows
    }

    fn merge(&self, pieces: Vec<&str>) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = self.config.separator.chars().count();

        let mut chunks = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = piece.chars().count();
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > size && !current.is_empty() {
                self.push_joined(&current, &mut chunks);

                // Drop leading pieces until only the overlap remains and the
                // next piece fits
                while total > overlap || (total > 0 && total + len + sep_len > size) {
                    let Some((_, first)) = current.pop_front() else {
                        break;
                    };
                    let joiner = if current.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(first + joiner);
                }
            }

            current.push_back((piece, len));
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        self.push_joined(&current, &mut chunks);
        chunks
    }

    fn push_joined(&self, pieces: &VecDeque<(&str, usize)>, chunks: &mut Vec<String>) {
        let joined = pieces
            .iter()
            .map(|(piece, _)| *piece)
            .collect::<Vec<_>>()
            .join(&self.config.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> TextChunker {
        TextChunker::new(ChunkingConfig {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_empty_content() {
        assert!(TextChunker::default().split("").is_empty());
        assert!(TextChunker::default().split("\n\n  \n").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let text = "Cats sleep a lot.\nDogs bark.";
        assert_eq!(TextChunker::default().split(text), vec![text.to_string()]);
    }

    #[test]
    fn test_merge_with_overlap() {
        let chunks = chunker(3, 1).split("a\nb\nc");
        assert_eq!(chunks, vec!["a\nb".to_string(), "b\nc".to_string()]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = (0..50)
            .map(|i| format!("line number {i} of the document"))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunker(120, 30).split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 120, "chunk too long: {chunk:?}");
        }
        assert!(chunks[0].starts_with("line number 0 "));
        assert!(chunks.last().unwrap().ends_with("line number 49 of the document"));
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = (0..20)
            .map(|i| format!("sentence {i:02}"))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunker(60, 25).split(&text);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let first_line = pair[1].lines().next().unwrap();
            assert!(
                pair[0].contains(first_line),
                "{:?} should repeat {first_line:?}",
                pair[0]
            );
        }
    }

    #[test]
    fn test_overlong_line_is_hard_split() {
        let chunks = chunker(10, 2).split("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(chunks, vec!["abcdefghij", "ijklmnopqr", "qrstuvwxyz"]);
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "é".repeat(25);
        let chunks = chunker(10, 0).split(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = TextChunker::new(ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Default::default()
        });
        assert!(matches!(result, Err(IngestError::InvalidChunking(_))));
    }
}
