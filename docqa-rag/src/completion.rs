//! Completion provider trait for language-model calls.

use async_trait::async_trait;

use crate::error::Result;

/// A language model exposed as a single stateless operation:
/// prompt in, raw text out.
///
/// The pipeline treats the model as a pure function; no conversation state
/// is carried between calls. Callers that need timeouts apply their own
/// policy around [`complete`](CompletionProvider::complete).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the given prompt, returning the model's
    /// raw text response.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// The name of the underlying model, for logging.
    fn model_name(&self) -> &str;
}
