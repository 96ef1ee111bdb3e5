//! Similarity retrieval with tenant isolation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::RetrievedDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::{MetadataFilter, VectorStore};

/// Embeds a user prompt and returns the top-K matching documents for one
/// tenant.
///
/// An empty result is a normal outcome ("no context found"), never an
/// error — the caller routes it to the fixed fallback answer.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    /// Create a retriever over the given embedder and store.
    ///
    /// The embedder must be the same one used at index time so query and
    /// record vectors are comparable.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve up to `top_k` documents relevant to `user_prompt`.
    ///
    /// When `user_id` is given, results are restricted to that tenant via
    /// an equality filter. `None` performs a global search and is only
    /// sound in contexts guaranteed to be single-tenant.
    pub async fn retrieve(
        &self,
        user_prompt: &str,
        user_id: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let query_embedding = self.embedder.embed(user_prompt).await?;

        let filter = user_id.map(|id| MetadataFilter::eq("user_id", id));

        let results = self.store.query(&query_embedding, top_k, filter.as_ref()).await?;

        // A store may return placeholder empties for under-filled result
        // slots; drop them rather than ground the prompt on nothing.
        let documents: Vec<RetrievedDocument> =
            results.into_iter().filter(|doc| !doc.text.trim().is_empty()).collect();

        if documents.is_empty() {
            debug!(user_id, "retrieval found no context");
        } else {
            info!(user_id, result_count = documents.len(), "retrieved context");
        }

        Ok(documents)
    }
}
