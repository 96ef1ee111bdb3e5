//! Configuration for the answering pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{DocQaError, Result};

/// Tunable parameters for chunking, retrieval, and compression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Approximate overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Default number of results to retrieve per question.
    pub top_k: usize,
    /// Chunks shorter than this bypass compression entirely.
    pub compression_min_chars: usize,
    /// Maximum sentences kept per chunk when compression is enabled.
    pub compression_top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
            top_k: 5,
            compression_min_chars: 300,
            compression_top_n: 3,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of results retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum chunk length (characters) for compression to apply.
    pub fn compression_min_chars(mut self, min_chars: usize) -> Self {
        self.config.compression_min_chars = min_chars;
        self
    }

    /// Set the maximum sentences kept per compressed chunk.
    pub fn compression_top_n(mut self, top_n: usize) -> Self {
        self.config.compression_top_n = top_n;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`DocQaError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `compression_top_n == 0`
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(DocQaError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(DocQaError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.compression_top_n == 0 {
            return Err(DocQaError::Config(
                "compression_top_n must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
