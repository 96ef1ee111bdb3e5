//! Data types for source pages, chunks, index records, and retrieval results.

use serde::{Deserialize, Serialize};

/// The raw text of one page of a source document.
///
/// Produced by a [`DocumentLoader`](crate::ingestion::DocumentLoader),
/// consumed by the [`Chunker`](crate::chunking::Chunker), and discarded
/// after chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// The extracted text of the page.
    pub text: String,
    /// Page number within the source (1-based, consistent within a run).
    pub page: u32,
    /// The tenant that owns this document.
    pub user_id: String,
    /// Source name, derived from the file name.
    pub source: String,
}

/// Provenance metadata carried by every chunk and index record.
///
/// The `user_id` is the tenant isolation key: retrieval must never cross
/// `user_id` boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// The tenant that owns the originating document.
    pub user_id: String,
    /// Source name of the originating document.
    pub source: String,
    /// Page number the chunk was cut from.
    pub page: u32,
    /// Position of the chunk in the chunker's output sequence.
    pub chunk_index: usize,
}

impl ChunkMetadata {
    /// The deterministic record id for this chunk:
    /// `{user_id}_{source}_page{page}_chunk{chunk_index}`.
    ///
    /// Stable given the same inputs, so re-indexing the same document
    /// under the same `user_id` overwrites rather than duplicates.
    pub fn record_id(&self) -> String {
        format!(
            "{}_{}_page{}_chunk{}",
            self.user_id, self.source, self.page, self.chunk_index
        )
    }

    /// Look up a metadata field by name, rendered as a string.
    ///
    /// Used by [`MetadataFilter`](crate::vectorstore::MetadataFilter) to
    /// match filter expressions against records.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "user_id" => Some(self.user_id.clone()),
            "source" => Some(self.source.clone()),
            "page" => Some(self.page.to_string()),
            "chunk_index" => Some(self.chunk_index.to_string()),
            _ => None,
        }
    }
}

/// A bounded segment of document text with its provenance metadata.
///
/// Created by the chunker; ephemeral — it is embedded and persisted as an
/// [`IndexRecord`], not stored itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub text: String,
    /// Provenance metadata inherited from the source page.
    pub metadata: ChunkMetadata,
}

/// The persisted unit in the vector index store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    /// Deterministic id, see [`ChunkMetadata::record_id`].
    pub id: String,
    /// Fixed-length embedding vector for the chunk text.
    pub embedding: Vec<f32>,
    /// Copy of the chunk's metadata.
    pub metadata: ChunkMetadata,
    /// The raw chunk text.
    pub document: String,
}

impl IndexRecord {
    /// Build a record from a chunk and its embedding.
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.metadata.record_id(),
            embedding,
            metadata: chunk.metadata,
            document: chunk.text,
        }
    }
}

/// A record reconstructed from a similarity query.
///
/// Read-only and scoped to one question-answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The stored chunk text.
    pub text: String,
    /// The stored chunk metadata.
    pub metadata: ChunkMetadata,
    /// Similarity score (higher is more relevant).
    pub score: f32,
}
