//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`],
//! which splits page text hierarchically — paragraph breaks, then line
//! breaks, then sentence-final periods, then spaces — only falling back to
//! a harder boundary when no higher-priority boundary fits the size budget.

use crate::document::{Chunk, ChunkMetadata, SourceDocument};

/// Separator priority for [`RecursiveChunker`], highest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// A strategy for splitting source pages into chunks.
///
/// Implementations must be deterministic: identical input always yields
/// identical output. No produced chunk is ever empty.
pub trait Chunker: Send + Sync {
    /// Split an ordered sequence of source pages into an ordered sequence
    /// of chunks.
    ///
    /// Every chunk inherits the full metadata of its source page, and a
    /// contiguous `chunk_index` is assigned across the whole output.
    fn chunk(&self, documents: &[SourceDocument]) -> Vec<Chunk>;
}

/// Splits text hierarchically with bounded chunk size and overlap.
///
/// Output chunk text length is bounded above by `chunk_size`, and adjacent
/// chunks from the same page share approximately `chunk_overlap` trailing
/// characters so context is not lost at boundaries.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(800, 150);
/// let chunks = chunker.chunk(&pages);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — approximate number of characters shared between
    ///   consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0;

        for document in documents {
            let pieces =
                split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &SEPARATORS);

            for text in pieces {
                if text.trim().is_empty() {
                    continue;
                }
                chunks.push(Chunk {
                    text,
                    metadata: ChunkMetadata {
                        user_id: document.user_id.clone(),
                        source: document.source.clone(),
                        page: document.page,
                        chunk_index,
                    },
                });
                chunk_index += 1;
            }
        }

        chunks
    }
}

/// Split text at the highest-priority separator that is present, then merge
/// segments into chunks that respect `chunk_size`, carrying a tail of
/// segments (up to `chunk_overlap` characters) into the next chunk.
///
/// Segments that exceed `chunk_size` on their own are split further with
/// the next-level separator; with no separators left, raw character
/// windows are used.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }
    let Some((&separator, remaining_separators)) = separators.split_first() else {
        return split_by_size(text, chunk_size, chunk_overlap);
    };

    let segments = split_keeping_separator(text, separator);
    if segments.len() <= 1 {
        // This separator does not occur; try the next boundary level.
        return split_and_merge(text, chunk_size, chunk_overlap, remaining_separators);
    }

    let mut chunks = Vec::new();
    // Sliding window of segments forming the chunk under construction.
    let mut window: Vec<&str> = Vec::new();
    let mut window_len = 0;
    // Segments added since the last emit; an emit requires at least one,
    // so a pure-overlap tail is never emitted as its own chunk.
    let mut fresh = 0;

    for segment in segments {
        if segment.len() > chunk_size {
            if fresh > 0 {
                chunks.push(window.concat());
            }
            window.clear();
            window_len = 0;
            fresh = 0;
            chunks.extend(split_and_merge(
                segment,
                chunk_size,
                chunk_overlap,
                remaining_separators,
            ));
            continue;
        }

        if window_len + segment.len() > chunk_size {
            if fresh > 0 {
                chunks.push(window.concat());
                fresh = 0;
            }
            // Keep a tail of segments as overlap, shrinking until the
            // incoming segment fits within the size budget.
            while !window.is_empty()
                && (window_len > chunk_overlap || window_len + segment.len() > chunk_size)
            {
                let removed = window.remove(0);
                window_len -= removed.len();
            }
        }

        window.push(segment);
        window_len += segment.len();
        fresh += 1;
    }

    if fresh > 0 {
        chunks.push(window.concat());
    }

    chunks
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so concatenating segments reproduces the input.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Raw character-window splitting with overlap, for unsplittable runs.
///
/// Window edges are adjusted to `char` boundaries so multi-byte text never
/// splits mid-character.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single char wider than the budget; take it whole.
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
        }
        chunks.push(text[start..end].to_string());
        if end == text.len() {
            break;
        }
        let mut next = start + step;
        while next < text.len() && !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str, page: u32) -> SourceDocument {
        SourceDocument {
            text: text.to_string(),
            page,
            user_id: "u1".to_string(),
            source: "test.pdf".to_string(),
        }
    }

    /// Length of the longest suffix of `a` that is a prefix of `b`.
    fn shared_boundary(a: &str, b: &str) -> usize {
        (1..=a.len().min(b.len()))
            .rev()
            .find(|&n| a.is_char_boundary(a.len() - n) && b.is_char_boundary(n) && a.ends_with(&b[..n]))
            .unwrap_or(0)
    }

    fn sentences(count: usize) -> String {
        (0..count)
            .map(|i| format!("Sentence number {i} talks about topic {i} in a few words. "))
            .collect()
    }

    #[test]
    fn chunks_respect_size_bound() {
        let chunker = RecursiveChunker::new(200, 40);
        let docs = [page(&sentences(30), 1)];
        let chunks = chunker.chunk(&docs);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 200, "chunk too long: {}", chunk.text.len());
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let chunk_overlap = 80;
        let chunker = RecursiveChunker::new(200, chunk_overlap);
        let docs = [page(&sentences(30), 1)];
        let chunks = chunker.chunk(&docs);
        assert!(chunks.len() > 2);
        // The carried tail is made of whole segments, each shorter than
        // chunk_overlap here, so the shared boundary lands within
        // [chunk_overlap / 2, chunk_overlap].
        for pair in chunks.windows(2) {
            let overlap = shared_boundary(&pair[0].text, &pair[1].text);
            assert!(
                overlap >= chunk_overlap / 2 && overlap <= chunk_overlap,
                "overlap {overlap} outside [{}, {chunk_overlap}]",
                chunk_overlap / 2
            );
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "alpha ".repeat(20).trim(), "beta ".repeat(20).trim());
        let chunker = RecursiveChunker::new(130, 0);
        let chunks = chunker.chunk(&[page(&text, 1)]);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.starts_with("alpha"));
        assert!(chunks[1].text.starts_with("beta"));
    }

    #[test]
    fn chunk_index_is_contiguous_across_pages() {
        let chunker = RecursiveChunker::new(100, 20);
        let docs = [page(&sentences(8), 1), page(&sentences(8), 2)];
        let chunks = chunker.chunk(&docs);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
        }
        assert!(chunks.iter().any(|c| c.metadata.page == 2));
    }

    #[test]
    fn metadata_is_inherited() {
        let chunker = RecursiveChunker::new(100, 20);
        let chunks = chunker.chunk(&[page(&sentences(8), 3)]);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.user_id, "u1");
            assert_eq!(chunk.metadata.source, "test.pdf");
            assert_eq!(chunk.metadata.page, 3);
        }
    }

    #[test]
    fn deterministic_output() {
        let chunker = RecursiveChunker::new(150, 30);
        let docs = [page(&sentences(20), 1)];
        assert_eq!(chunker.chunk(&docs), chunker.chunk(&docs));
    }

    #[test]
    fn no_empty_chunks() {
        let chunker = RecursiveChunker::new(50, 10);
        let docs = [page("   \n\n  \n  ", 1), page(&sentences(5), 2)];
        for chunk in chunker.chunk(&docs) {
            assert!(!chunk.text.trim().is_empty());
        }
    }

    #[test]
    fn unsplittable_token_falls_back_to_character_windows() {
        let text = "x".repeat(500);
        let chunker = RecursiveChunker::new(100, 20);
        let chunks = chunker.chunk(&[page(&text, 1)]);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 100);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld ".repeat(40);
        let chunker = RecursiveChunker::new(60, 15);
        // Would panic on a non-boundary slice if windows were byte-naive.
        let chunks = chunker.chunk(&[page(&text, 1)]);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn short_page_is_a_single_chunk() {
        let chunker = RecursiveChunker::new(800, 150);
        let chunks = chunker.chunk(&[page("Just one short page.", 1)]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Just one short page.");
    }
}
