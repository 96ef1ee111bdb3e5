//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in the question-answering pipeline.
///
/// None of these are retried internally; each stage propagates failure to
/// its caller unchanged. "No retrieved context" is deliberately *not* an
/// error — it is a normal outcome routed to the fixed fallback answer.
#[derive(Debug, Error)]
pub enum DocQaError {
    /// A source document could not be read or parsed.
    #[error("Ingestion error ({source_name}): {message}")]
    Ingestion {
        /// The source (file name or path) that failed to ingest.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index store.
    #[error("Store error ({backend}): {message}")]
    Store {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A language-model completion call failed.
    #[error("Completion error ({provider}): {message}")]
    Completion {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, DocQaError>;
