//! Answering pipeline orchestration.
//!
//! [`AnsweringPipeline`] composes the collaborators into the two top-level
//! operations: indexing (load → chunk → embed → upsert) and question
//! answering (retrieve → optional compression → prompt assembly → model
//! call).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{AnsweringPipeline, InMemoryVectorStore, PipelineConfig};
//!
//! let pipeline = AnsweringPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .completer(Arc::new(my_model))
//!     .build()?;
//!
//! pipeline.index_document(Path::new("paper.pdf"), "user_001").await?;
//! let answer = pipeline.ask_question("what is the main result?", "user_001").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::completion::CompletionProvider;
use crate::compressor::SentenceCompressor;
use crate::config::PipelineConfig;
use crate::document::{IndexRecord, SourceDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{DocQaError, Result};
use crate::ingestion::DocumentLoader;
use crate::prompt::{assemble_prompt, FALLBACK_ANSWER};
use crate::retrieval::Retriever;
use crate::vectorstore::VectorStore;

/// The per-user document question-answering pipeline.
///
/// Both entry points are idempotent with respect to retries: the vector
/// store is the only durability boundary, and record ids are deterministic
/// so re-indexing overwrites rather than duplicates. Construct one via
/// [`AnsweringPipeline::builder()`].
pub struct AnsweringPipeline {
    config: PipelineConfig,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    completer: Arc<dyn CompletionProvider>,
    retriever: Retriever,
    compressor: Option<SentenceCompressor>,
}

impl AnsweringPipeline {
    /// Create a new [`AnsweringPipelineBuilder`].
    pub fn builder() -> AnsweringPipelineBuilder {
        AnsweringPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest a document from disk and index it for `user_id`:
    /// load → chunk → embed (batch) → upsert.
    ///
    /// Returns the number of records written. Any stage failure aborts the
    /// whole operation; no partial-upsert guarantees exist beyond the
    /// store's own upsert boundary.
    ///
    /// Concurrent re-indexing of the *same* document by the same user is
    /// unsupported; callers must serialize those.
    ///
    /// # Errors
    ///
    /// Returns [`DocQaError::Pipeline`] if no document loader is
    /// configured, otherwise propagates the failing stage's error.
    pub async fn index_document(&self, path: &Path, user_id: &str) -> Result<usize> {
        let loader = self.loader.as_ref().ok_or_else(|| {
            DocQaError::Pipeline("no document loader configured".to_string())
        })?;

        let pages = loader.load(path, user_id).map_err(|e| {
            error!(path = %path.display(), error = %e, "ingestion failed");
            e
        })?;

        self.index_pages(pages).await
    }

    /// Index already-extracted pages: chunk → embed (batch) → upsert.
    ///
    /// Returns the number of records written.
    pub async fn index_pages(&self, pages: Vec<SourceDocument>) -> Result<usize> {
        let chunks = self.chunker.chunk(&pages);
        if chunks.is_empty() {
            info!(record_count = 0, "indexed document (no chunkable text)");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(chunk_count = chunks.len(), error = %e, "embedding failed during indexing");
            e
        })?;

        let records: Vec<IndexRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexRecord::from_chunk(chunk, embedding))
            .collect();

        self.store.upsert(&records).await.map_err(|e| {
            error!(record_count = records.len(), error = %e, "upsert failed during indexing");
            e
        })?;

        info!(record_count = records.len(), "indexed document");
        Ok(records.len())
    }

    /// Answer a question for `user_id` using the configured default
    /// `top_k`.
    ///
    /// When retrieval finds no context, returns
    /// [`FALLBACK_ANSWER`](crate::prompt::FALLBACK_ANSWER) immediately —
    /// no compression, no prompt assembly, no model call.
    pub async fn ask_question(&self, user_prompt: &str, user_id: &str) -> Result<String> {
        self.ask_question_with_top_k(user_prompt, user_id, self.config.top_k).await
    }

    /// Answer a question with an explicit `top_k` override.
    pub async fn ask_question_with_top_k(
        &self,
        user_prompt: &str,
        user_id: &str,
        top_k: usize,
    ) -> Result<String> {
        let context = self.retriever.retrieve(user_prompt, Some(user_id), top_k).await?;

        if context.is_empty() {
            info!(user_id, "no context retrieved, returning fallback answer");
            return Ok(FALLBACK_ANSWER.to_string());
        }

        let context = match &self.compressor {
            Some(compressor) => compressor.compress_batch(context, user_prompt).await?,
            None => context,
        };

        let prompt = assemble_prompt(user_prompt, &context);

        let answer = self.completer.complete(&prompt).await.map_err(|e| {
            error!(model = self.completer.model_name(), error = %e, "completion failed");
            e
        })?;

        info!(user_id, model = self.completer.model_name(), "answered question");
        Ok(answer)
    }
}

/// Builder for constructing an [`AnsweringPipeline`].
///
/// `embedder`, `store`, and `completer` are required. The chunker defaults
/// to a [`RecursiveChunker`] built from the config; the loader and
/// compression are optional.
#[derive(Default)]
pub struct AnsweringPipelineBuilder {
    config: Option<PipelineConfig>,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    completer: Option<Arc<dyn CompletionProvider>>,
    compression: bool,
}

impl AnsweringPipelineBuilder {
    /// Set the pipeline configuration (defaults to
    /// [`PipelineConfig::default()`]).
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document loader used by
    /// [`index_document`](AnsweringPipeline::index_document).
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Override the chunker (defaults to a [`RecursiveChunker`] using the
    /// config's size and overlap).
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider (required). Used at both index and query
    /// time so vectors stay comparable.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend (required).
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the language-model completion provider (required).
    pub fn completer(mut self, completer: Arc<dyn CompletionProvider>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Enable query-conditioned chunk compression between retrieval and
    /// prompt assembly.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Build the [`AnsweringPipeline`], validating that all required
    /// collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`DocQaError::Config`] if a required collaborator is
    /// missing.
    pub fn build(self) -> Result<AnsweringPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| DocQaError::Config("embedder is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| DocQaError::Config("store is required".to_string()))?;
        let completer = self
            .completer
            .ok_or_else(|| DocQaError::Config("completer is required".to_string()))?;

        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
        });

        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&store));

        let compressor = self.compression.then(|| {
            SentenceCompressor::new(
                Arc::clone(&embedder),
                config.compression_min_chars,
                config.compression_top_n,
            )
        });

        Ok(AnsweringPipeline {
            config,
            loader: self.loader,
            chunker,
            embedder,
            store,
            completer,
            retriever,
            compressor,
        })
    }
}
