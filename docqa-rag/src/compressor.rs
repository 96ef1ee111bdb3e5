//! Query-conditioned chunk compression.
//!
//! [`SentenceCompressor`] reduces a retrieved chunk to its most
//! query-relevant sentences so the grounding context fits language-model
//! input constraints. It is a content-shaping step, independent of the
//! retriever's filtering and ranking.

use std::sync::Arc;

use tracing::debug;

use crate::document::RetrievedDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::inmemory::cosine_similarity;

/// Compresses chunks to their `top_n` most query-relevant sentences.
///
/// Chunks shorter than `min_chars` are returned unchanged — compression
/// there would discard signal, not noise. Selected sentences are re-sorted
/// into original document order before joining, preserving narrative order
/// over relevance order.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::SentenceCompressor;
///
/// let compressor = SentenceCompressor::new(embedder, 300, 3);
/// let compressed = compressor.compress(doc, "what is photosynthesis?").await?;
/// ```
pub struct SentenceCompressor {
    embedder: Arc<dyn EmbeddingProvider>,
    min_chars: usize,
    top_n: usize,
}

impl SentenceCompressor {
    /// Create a new compressor.
    ///
    /// # Arguments
    ///
    /// * `embedder` — must be the same provider used for retrieval so
    ///   sentence and query vectors share a space
    /// * `min_chars` — chunks shorter than this pass through unchanged
    /// * `top_n` — maximum number of sentences to keep per chunk
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, min_chars: usize, top_n: usize) -> Self {
        Self { embedder, min_chars, top_n }
    }

    /// Compress one retrieved document against a query.
    ///
    /// Metadata and score pass through unchanged; only the text is
    /// replaced.
    pub async fn compress(
        &self,
        document: RetrievedDocument,
        query: &str,
    ) -> Result<RetrievedDocument> {
        let query_embedding = self.embedder.embed(query).await?;
        self.compress_scored(document, &query_embedding).await
    }

    /// Compress a batch of retrieved documents, embedding the query once.
    pub async fn compress_batch(
        &self,
        documents: Vec<RetrievedDocument>,
        query: &str,
    ) -> Result<Vec<RetrievedDocument>> {
        if documents.is_empty() {
            return Ok(documents);
        }
        let query_embedding = self.embedder.embed(query).await?;
        let mut compressed = Vec::with_capacity(documents.len());
        for document in documents {
            compressed.push(self.compress_scored(document, &query_embedding).await?);
        }
        Ok(compressed)
    }

    async fn compress_scored(
        &self,
        document: RetrievedDocument,
        query_embedding: &[f32],
    ) -> Result<RetrievedDocument> {
        if document.text.len() < self.min_chars {
            return Ok(document);
        }

        let sentences = split_sentences(&document.text);
        if sentences.is_empty() || sentences.len() <= self.top_n {
            return Ok(document);
        }

        let sentence_refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&sentence_refs).await?;

        let mut ranked: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(e, query_embedding)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected: Vec<usize> = ranked.iter().take(self.top_n).map(|(i, _)| *i).collect();
        // Narrative order, not relevance order.
        selected.sort_unstable();

        let text = selected
            .iter()
            .map(|&i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");

        debug!(
            kept = selected.len(),
            total = sentences.len(),
            "compressed chunk to query-relevant sentences"
        );

        Ok(RetrievedDocument { text, metadata: document.metadata, score: document.score })
    }
}

/// Split text into sentences at `.`, `!`, or `?` terminators, discarding
/// sentences with no alphanumeric content (empty, whitespace-only, or bare
/// punctuation). Terminators stay attached to their sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let mut push = |current: &mut String| {
        if current.chars().any(char::is_alphanumeric) {
            sentences.push(current.trim().to_string());
        }
        current.clear();
    };

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            push(&mut current);
        }
    }
    push(&mut current);

    sentences
}
