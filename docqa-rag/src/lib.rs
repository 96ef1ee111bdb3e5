//! # docqa-rag
//!
//! Multi-tenant retrieval-augmented question answering over user
//! documents.
//!
//! A document is split into overlapping chunks with provenance metadata,
//! embedded into a vector space, and persisted in a multi-tenant index.
//! Questions are answered by retrieving the owner's most similar chunks,
//! optionally compressing them to their query-relevant sentences, and
//! grounding a language-model prompt on them.
//!
//! ## Overview
//!
//! - [`RecursiveChunker`] — bounded, overlapping, boundary-aware chunks
//! - [`EmbeddingProvider`] / [`CompletionProvider`] — narrow capability
//!   traits for the embedding and language models
//! - [`VectorStore`] — multi-tenant index with equality metadata filters;
//!   [`InMemoryVectorStore`] built in, Chroma Cloud behind the `chroma`
//!   feature
//! - [`SentenceCompressor`] — optional query-conditioned chunk compression
//! - [`Retriever`] — tenant-isolated similarity retrieval
//! - [`AnsweringPipeline`] — indexing and question-answering orchestration
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use docqa_rag::{AnsweringPipeline, InMemoryVectorStore, PipelineConfig};
//! use docqa_rag::gemini::{GeminiCompletionProvider, GeminiEmbeddingProvider};
//!
//! let pipeline = AnsweringPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(GeminiEmbeddingProvider::from_env()?))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .completer(Arc::new(GeminiCompletionProvider::from_env()?))
//!     .build()?;
//!
//! pipeline.index_document(Path::new("paper.pdf"), "user_001").await?;
//! let answer = pipeline.ask_question("what is the main result?", "user_001").await?;
//! ```
//!
//! ## Features
//!
//! - `gemini` — Gemini embedding and completion providers over REST
//! - `chroma` — Chroma Cloud vector store backend
//! - `pdf` — `lopdf`-based per-page PDF loader
//! - `full` — all of the above

pub mod chunking;
pub mod completion;
pub mod compressor;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod inmemory;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod vectorstore;

#[cfg(feature = "chroma")]
pub mod chroma;
#[cfg(feature = "gemini")]
pub mod gemini;

pub use chunking::{Chunker, RecursiveChunker};
pub use completion::CompletionProvider;
pub use compressor::SentenceCompressor;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{Chunk, ChunkMetadata, IndexRecord, RetrievedDocument, SourceDocument};
pub use embedding::EmbeddingProvider;
pub use error::{DocQaError, Result};
pub use ingestion::DocumentLoader;
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{AnsweringPipeline, AnsweringPipelineBuilder};
pub use prompt::{assemble_prompt, FALLBACK_ANSWER};
pub use retrieval::Retriever;
pub use vectorstore::{MetadataFilter, VectorStore};

#[cfg(feature = "pdf")]
pub use ingestion::PdfLoader;
