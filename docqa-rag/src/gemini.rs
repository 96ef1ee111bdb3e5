//! Gemini embedding and completion providers over the Generative Language
//! REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::CompletionProvider;
use crate::embedding::EmbeddingProvider;
use crate::error::{DocQaError, Result};

/// Base URL of the Generative Language API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "embedding-001";

/// The default dimensionality of `embedding-001` vectors.
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;

/// The default completion model.
const DEFAULT_COMPLETION_MODEL: &str = "gemini-1.5-flash";

/// Environment variable holding the API key.
const API_KEY_ENV: &str = "GOOGLE_API_KEY";

fn embedding_error(message: impl Into<String>) -> DocQaError {
    DocQaError::Embedding { provider: "Gemini".into(), message: message.into() }
}

fn completion_error(message: impl Into<String>) -> DocQaError {
    DocQaError::Completion { provider: "Gemini".into(), message: message.into() }
}

/// Decode an API error body down to its message, falling back to the raw
/// body text.
fn decode_error_body(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// The same instance (and model) must be used at index and query time so
/// vectors stay comparable.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::from_env()?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider with the given API key and the default
    /// `embedding-001` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(embedding_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Create a new provider using the `GOOGLE_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| embedding_error(format!("{API_KEY_ENV} environment variable not set")))?;
        Self::new(api_key)
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected output dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    fn qualified_model(&self) -> String {
        format!("models/{}", self.model)
    }

    async fn post_json<T: Serialize>(&self, operation: &str, body: &T) -> Result<reqwest::Response> {
        let url = format!("{API_BASE_URL}/models/{}:{operation}", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                embedding_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Gemini", %status, "API error");
            return Err(embedding_error(format!(
                "API returned {status}: {}",
                decode_error_body(&body)
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let request = EmbedRequest {
            model: self.qualified_model(),
            content: Content { parts: vec![Part { text }] },
        };

        let response = self.post_json("embedContent", &request).await?;
        let decoded: EmbedResponse = response
            .json()
            .await
            .map_err(|e| embedding_error(format!("failed to parse response: {e}")))?;

        Ok(decoded.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: self.qualified_model(),
                    content: Content { parts: vec![Part { text }] },
                })
                .collect(),
        };

        let response = self.post_json("batchEmbedContents", &request).await?;
        let decoded: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| embedding_error(format!("failed to parse response: {e}")))?;

        if decoded.embeddings.len() != texts.len() {
            return Err(embedding_error(format!(
                "API returned {} embeddings for {} inputs",
                decoded.embeddings.len(),
                texts.len()
            )));
        }

        Ok(decoded.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Completion provider ────────────────────────────────────────────

/// A [`CompletionProvider`] backed by the Gemini `generateContent` API.
///
/// Stateless: every call sends a single prompt and returns the first
/// candidate's text.
pub struct GeminiCompletionProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiCompletionProvider {
    /// Create a new provider with the given API key and the default
    /// `gemini-1.5-flash` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(completion_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_COMPLETION_MODEL.into(),
        })
    }

    /// Create a new provider using the `GOOGLE_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            completion_error(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        Self::new(api_key)
    }

    /// Set the completion model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl CompletionProvider for GeminiCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = "Gemini", model = %self.model, prompt_len = prompt.len(), "completion request");

        let request =
            GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };

        let url = format!("{API_BASE_URL}/models/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                completion_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Gemini", %status, "API error");
            return Err(completion_error(format!(
                "API returned {status}: {}",
                decode_error_body(&body)
            )));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| completion_error(format!("failed to parse response: {e}")))?;

        let text = decoded
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(completion_error("API returned no candidates"));
        }

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
