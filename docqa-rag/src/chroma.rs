//! Chroma Cloud vector store backend over its REST API.
//!
//! This module is only available when the `chroma` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::document::{ChunkMetadata, IndexRecord, RetrievedDocument};
use crate::error::{DocQaError, Result};
use crate::vectorstore::{MetadataFilter, VectorStore};

/// Base URL of the Chroma Cloud API.
const API_BASE_URL: &str = "https://api.trychroma.com";

fn store_error(message: impl Into<String>) -> DocQaError {
    DocQaError::Store { backend: "Chroma".into(), message: message.into() }
}

/// Connection settings for a Chroma Cloud collection.
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    /// API key, sent as the `x-chroma-token` header.
    pub api_key: String,
    /// Tenant id.
    pub tenant: String,
    /// Database name within the tenant.
    pub database: String,
    /// Collection name; created on connect if missing.
    pub collection: String,
}

impl ChromaConfig {
    /// Load the configuration from `CHROMA_API_KEY`, `CHROMA_TENANT`,
    /// `CHROMA_DATABASE`, and `CHROMA_COLLECTION`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| store_error(format!("{name} environment variable not set")))
        };
        Ok(Self {
            api_key: var("CHROMA_API_KEY")?,
            tenant: var("CHROMA_TENANT")?,
            database: var("CHROMA_DATABASE")?,
            collection: var("CHROMA_COLLECTION")?,
        })
    }
}

// ── Chroma API request/response types ──────────────────────────────

#[derive(Serialize)]
struct GetOrCreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    metadatas: Vec<Value>,
    documents: Vec<String>,
}

#[derive(Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    r#where: Option<Value>,
    include: Vec<&'static str>,
}

/// Query results come back as a sequence of one outer list per query
/// embedding; we always send exactly one.
#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<Value>>>,
    #[serde(default)]
    distances: Vec<Vec<Option<f32>>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(alias = "message")]
    error: String,
}

// ── Store implementation ───────────────────────────────────────────

/// A [`VectorStore`] backed by a Chroma Cloud collection.
///
/// Records are written with parallel `ids`/`embeddings`/`metadatas`/
/// `documents` arrays; queries send a single embedding and unwrap the
/// one-element outer lists of the response. Cosine distance is converted
/// to a similarity score as `1 - distance`.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::chroma::{ChromaConfig, ChromaVectorStore};
///
/// let store = ChromaVectorStore::connect(ChromaConfig::from_env()?).await?;
/// store.upsert(&records).await?;
/// ```
pub struct ChromaVectorStore {
    client: reqwest::Client,
    config: ChromaConfig,
    collection_id: String,
}

impl ChromaVectorStore {
    /// Connect to Chroma Cloud, resolving (or creating) the configured
    /// collection.
    pub async fn connect(config: ChromaConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(store_error("API key must not be empty"));
        }

        let client = reqwest::Client::new();
        let url = format!(
            "{API_BASE_URL}/api/v2/tenants/{}/databases/{}/collections",
            config.tenant, config.database
        );
        let request =
            GetOrCreateCollectionRequest { name: &config.collection, get_or_create: true };

        let response = client
            .post(&url)
            .header("x-chroma-token", &config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "Chroma", error = %e, "request failed");
                store_error(format!("request failed: {e}"))
            })?;

        let response = Self::check_status(response).await?;
        let collection: CollectionResponse = response
            .json()
            .await
            .map_err(|e| store_error(format!("failed to parse collection response: {e}")))?;

        info!(
            backend = "Chroma",
            collection = %config.collection,
            collection_id = %collection.id,
            "connected to collection"
        );

        Ok(Self { client, config, collection_id: collection.id })
    }

    fn collection_url(&self, operation: &str) -> String {
        format!(
            "{API_BASE_URL}/api/v2/tenants/{}/databases/{}/collections/{}/{operation}",
            self.config.tenant, self.config.database, self.collection_id
        )
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail =
            serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);
        error!(backend = "Chroma", %status, "API error");
        Err(store_error(format!("API returned {status}: {detail}")))
    }

    async fn post(&self, operation: &str, body: &impl Serialize) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.collection_url(operation))
            .header("x-chroma-token", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "Chroma", error = %e, "request failed");
                store_error(format!("request failed: {e}"))
            })?;
        Self::check_status(response).await
    }

    /// Render a filter as a Chroma `where` document, e.g.
    /// `{"user_id": {"$eq": "u1"}}`.
    ///
    /// Chroma's `$eq` is type-sensitive, so the JSON type follows the
    /// field's type in [`ChunkMetadata`]: `page` and `chunk_index` are
    /// stored as numbers, everything else as strings. A numeric-looking
    /// value for a string field (a user id of `"123"`, say) must stay a
    /// string or it matches nothing.
    fn where_document(filter: &MetadataFilter) -> Value {
        match filter {
            MetadataFilter::Eq { field, value } => {
                let value: Value = match field.as_str() {
                    "page" | "chunk_index" => match value.parse::<i64>() {
                        Ok(n) => json!(n),
                        Err(_) => json!(value),
                    },
                    _ => json!(value),
                };
                json!({ field.as_str(): { "$eq": value } })
            }
        }
    }
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest {
            ids: records.iter().map(|r| r.id.clone()).collect(),
            embeddings: records.iter().map(|r| r.embedding.clone()).collect(),
            metadatas: records
                .iter()
                .map(|r| serde_json::to_value(&r.metadata))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| store_error(format!("failed to serialize metadata: {e}")))?,
            documents: records.iter().map(|r| r.document.clone()).collect(),
        };

        self.post("upsert", &request).await?;
        debug!(backend = "Chroma", record_count = records.len(), "upserted records");
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievedDocument>> {
        let request = QueryRequest {
            query_embeddings: vec![embedding.to_vec()],
            n_results: top_k,
            r#where: filter.map(Self::where_document),
            include: vec!["documents", "metadatas", "distances"],
        };

        let response = self.post("query", &request).await?;
        let decoded: QueryResponse = response
            .json()
            .await
            .map_err(|e| store_error(format!("failed to parse query response: {e}")))?;

        // One outer list per query embedding; we sent exactly one.
        let documents = decoded.documents.into_iter().next().unwrap_or_default();
        let metadatas = decoded.metadatas.into_iter().next().unwrap_or_default();
        let distances = decoded.distances.into_iter().next().unwrap_or_default();

        let mut results = Vec::with_capacity(documents.len());
        for (i, document) in documents.into_iter().enumerate() {
            let (Some(text), Some(Some(metadata))) = (document, metadatas.get(i).cloned()) else {
                continue;
            };
            let metadata: ChunkMetadata = serde_json::from_value(metadata)
                .map_err(|e| store_error(format!("failed to decode record metadata: {e}")))?;
            let score = match distances.get(i).copied().flatten() {
                Some(distance) => 1.0 - distance,
                None => 0.0,
            };
            results.push(RetrievedDocument { text, metadata, score });
        }

        debug!(backend = "Chroma", result_count = results.len(), "query completed");
        Ok(results)
    }
}
