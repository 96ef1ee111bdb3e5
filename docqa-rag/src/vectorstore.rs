//! Vector store trait for persisting and querying index records.

use async_trait::async_trait;

use crate::document::{ChunkMetadata, IndexRecord, RetrievedDocument};
use crate::error::Result;

/// A metadata filter expression applied at query time.
///
/// Currently a single equality-on-field form; in this system it is used
/// exclusively for `user_id` tenant isolation, but the tagged shape lets
/// future filters (by source, by page) compose without special-casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    /// Matches records whose metadata field `field` equals `value`.
    Eq {
        /// Metadata field name (`user_id`, `source`, `page`, `chunk_index`).
        field: String,
        /// Value the field must equal, rendered as a string.
        value: String,
    },
}

impl MetadataFilter {
    /// Build an equality filter on a metadata field.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq { field: field.into(), value: value.into() }
    }

    /// Whether the given metadata satisfies this filter.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            Self::Eq { field, value } => metadata.field(field).as_deref() == Some(value.as_str()),
        }
    }
}

/// A multi-tenant vector index keyed by record id.
///
/// The store is the only shared mutable resource in the pipeline. Records
/// are never mutated in place; upsert-by-id is the only write operation,
/// so concurrent writes to different ids are independent.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite records by id.
    ///
    /// Idempotent: re-submitting a record with the same id overwrites
    /// rather than duplicates.
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()>;

    /// Return at most `top_k` records ordered by descending similarity to
    /// `embedding`, restricted to records matching `filter`.
    ///
    /// If `top_k` exceeds the number of matching records, all matches are
    /// returned without error. No matching records yields an empty `Vec`,
    /// not an error.
    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievedDocument>>;
}
