//! Overlapping, size-bounded chunking of document text.
//!
//! Offsets are character positions, not byte positions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    ZeroSize,
    #[error("overlap must be greater than zero")]
    ZeroOverlap,
    #[error("overlap ({overlap}) must be less than chunk size ({chunk_size})")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },
}

/// A 0-indexed slice of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    /// Start of the window in the source text, inclusive
    pub start: usize,
    /// End of the window in the source text, exclusive
    pub end: usize,
    /// Window contents with surrounding whitespace trimmed
    pub text: String,
}

/// Splits text into windows of `chunk_size` characters that advance by
/// `chunk_size - overlap`.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::ZeroSize);
        }
        if overlap == 0 {
            return Err(ChunkError::ZeroOverlap);
        }
        if overlap >= chunk_size {
            return Err(ChunkError::OverlapTooLarge {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus the end, so windows slice on char boundaries.
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let len = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(len);
            let window = text[boundaries[start]..boundaries[end]].trim();
            if !window.is_empty() {
                chunks.push(Chunk {
                    index: chunks.len(),
                    start,
                    end,
                    text: window.to_string(),
                });
            }
            if end == len {
                break;
            }
            start += self.stride();
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_overlap() {
        assert_eq!(ChunkSplitter::new(0, 0).unwrap_err(), ChunkError::ZeroSize);
        assert_eq!(ChunkSplitter::new(10, 0).unwrap_err(), ChunkError::ZeroOverlap);
        assert!(matches!(
            ChunkSplitter::new(10, 10),
            Err(ChunkError::OverlapTooLarge { .. })
        ));
        assert!(ChunkSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn empty_and_blank_text_yield_no_chunks() {
        let splitter = ChunkSplitter::new(100, 10).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("  \n\t  ").is_empty());
    }

    #[test]
    fn short_text_is_single_chunk() {
        let splitter = ChunkSplitter::new(100, 10).unwrap();
        let chunks = splitter.split("  tender no. 42  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, 17);
        assert_eq!(chunks[0].text, "tender no. 42");
    }

    #[test]
    fn seven_thousand_chars_split_into_three() {
        let text: String = (0..7000).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let splitter = ChunkSplitter::new(3000, 300).unwrap();
        let chunks = splitter.split(&text);

        let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 2700, 5400]);
        assert_eq!(chunks[2].end, 7000);
        assert_eq!(chunks[0].text.len(), 3000);
        assert_eq!(chunks[2].text.len(), 1600);
    }

    #[test]
    fn exact_fit_does_not_rescan_tail() {
        let text = "x".repeat(10);
        let splitter = ChunkSplitter::new(10, 3).unwrap();
        let chunks = splitter.split(&text);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn consecutive_windows_share_overlap() {
        let text: String = (0..250).map(|i| char::from(b'0' + (i % 10) as u8)).collect();
        let splitter = ChunkSplitter::new(100, 25).unwrap();
        let chunks = splitter.split(&text);

        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 25);
            let tail = &pair[0].text[pair[0].text.len() - 25..];
            assert!(pair[1].text.starts_with(tail));
        }
    }

    #[test]
    fn chunks_cover_text_and_are_never_empty() {
        let samples = [
            "a".to_string(),
            "word ".repeat(123),
            "line one\n\nline two\n".repeat(57),
            "x".repeat(999),
        ];
        for (size, overlap) in [(10, 1), (64, 16), (100, 99), (1000, 500)] {
            let splitter = ChunkSplitter::new(size, overlap).unwrap();
            for text in &samples {
                let len = text.chars().count();
                let chunks = splitter.split(text);

                assert_eq!(chunks.first().map(|c| c.start), Some(0));
                assert_eq!(chunks.last().map(|c| c.end), Some(len));
                for pair in chunks.windows(2) {
                    assert!(pair[1].start <= pair[0].end, "gap between chunks");
                }
                for (i, chunk) in chunks.iter().enumerate() {
                    assert_eq!(chunk.index, i);
                    assert!(!chunk.text.trim().is_empty());
                }
            }
        }
    }

    #[test]
    fn whitespace_window_is_skipped_but_indices_stay_dense() {
        let text = format!("{}{}{}", "a".repeat(10), " ".repeat(20), "b".repeat(10));
        let splitter = ChunkSplitter::new(10, 2).unwrap();
        let chunks = splitter.split(&text);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
        assert!(chunks.len() < 5);
    }

    #[test]
    fn multibyte_text_slices_on_char_boundaries() {
        let text = "é".repeat(15);
        let splitter = ChunkSplitter::new(10, 5).unwrap();
        let chunks = splitter.split(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].start, 5);
        assert_eq!(chunks[1].text.chars().count(), 10);
    }
}
