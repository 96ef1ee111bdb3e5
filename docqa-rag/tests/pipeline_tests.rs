//! Integration tests for the answering pipeline with stub collaborators.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use docqa_rag::{
    AnsweringPipeline, CompletionProvider, DocQaError, EmbeddingProvider, InMemoryVectorStore,
    PipelineConfig, Result, Retriever, SourceDocument, FALLBACK_ANSWER,
};

/// Deterministic keyword-count embedder: one dimension per vocabulary
/// word, so similarity tracks topic overlap exactly.
struct StubEmbedder;

const VOCAB: [&str; 9] = [
    "mitochondria",
    "energy",
    "cell",
    "photosynthesis",
    "chlorophyll",
    "sunlight",
    "volcano",
    "lava",
    "eruption",
];

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; VOCAB.len()];
        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if let Some(i) = VOCAB.iter().position(|w| *w == token) {
                v[i] += 1.0;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        VOCAB.len()
    }
}

/// Completion stub that counts calls and captures the last prompt.
#[derive(Default)]
struct StubCompleter {
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

#[async_trait]
impl CompletionProvider for StubCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok("stub answer".to_string())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

fn page(text: &str, page: u32, user_id: &str) -> SourceDocument {
    SourceDocument {
        text: text.to_string(),
        page,
        user_id: user_id.to_string(),
        source: "biology.pdf".to_string(),
    }
}

fn three_pages(user_id: &str) -> Vec<SourceDocument> {
    vec![
        page(
            "The mitochondria produces energy for the cell. \
             Every cell depends on mitochondria for its energy budget.",
            1,
            user_id,
        ),
        page(
            "Photosynthesis converts sunlight into sugar. \
             Chlorophyll absorbs sunlight in the leaf. \
             Without chlorophyll there is no photosynthesis.",
            2,
            user_id,
        ),
        page(
            "A volcano erupts when lava reaches the surface. \
             Each eruption reshapes the slopes with fresh lava.",
            3,
            user_id,
        ),
    ]
}

struct Harness {
    pipeline: AnsweringPipeline,
    store: Arc<InMemoryVectorStore>,
    embedder: Arc<StubEmbedder>,
    completer: Arc<StubCompleter>,
}

fn harness(compression: bool) -> Harness {
    let store = Arc::new(InMemoryVectorStore::new());
    let embedder = Arc::new(StubEmbedder);
    let completer = Arc::new(StubCompleter::default());
    let pipeline = AnsweringPipeline::builder()
        .config(PipelineConfig::default())
        .embedder(embedder.clone())
        .store(store.clone())
        .completer(completer.clone())
        .with_compression(compression)
        .build()
        .unwrap();
    Harness { pipeline, store, embedder, completer }
}

#[tokio::test]
async fn empty_retrieval_returns_fallback_without_model_call() {
    let h = harness(false);

    let answer = h.pipeline.ask_question("what is photosynthesis?", "u1").await.unwrap();

    assert_eq!(answer, FALLBACK_ANSWER);
    assert_eq!(answer, "I do not have enough information on this");
    assert_eq!(h.completer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tenant_with_no_documents_gets_fallback_even_when_others_have_content() {
    let h = harness(false);
    h.pipeline.index_pages(three_pages("u1")).await.unwrap();

    let answer = h.pipeline.ask_question("what is photosynthesis?", "someone_else").await.unwrap();

    assert_eq!(answer, FALLBACK_ANSWER);
    assert_eq!(h.completer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn retrieval_never_crosses_tenant_boundaries() {
    let h = harness(false);
    h.pipeline.index_pages(three_pages("user_a")).await.unwrap();
    h.pipeline
        .index_pages(vec![page(
            "A volcano erupts when lava reaches the surface above the eruption chamber.",
            1,
            "user_b",
        )])
        .await
        .unwrap();

    let retriever = Retriever::new(h.embedder.clone(), h.store.clone());
    for query in ["volcano lava eruption", "photosynthesis", "anything at all"] {
        let results = retriever.retrieve(query, Some("user_a"), 10).await.unwrap();
        assert!(results.iter().all(|d| d.metadata.user_id == "user_a"), "query {query:?} leaked");
    }
}

#[tokio::test]
async fn reindexing_overwrites_instead_of_duplicating() {
    let h = harness(false);
    let first = h.pipeline.index_pages(three_pages("u1")).await.unwrap();
    let stored_after_first = h.store.len().await;

    let second = h.pipeline.index_pages(three_pages("u1")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.store.len().await, stored_after_first);
}

#[tokio::test]
async fn question_about_page_two_is_grounded_on_page_two() {
    let h = harness(false);
    h.pipeline.index_pages(three_pages("u1")).await.unwrap();

    let question = "How does photosynthesis use chlorophyll and sunlight?";

    let retriever = Retriever::new(h.embedder.clone(), h.store.clone());
    let results = retriever.retrieve(question, Some("u1"), 5).await.unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].metadata.page, 2);

    let answer = h.pipeline.ask_question(question, "u1").await.unwrap();
    assert_eq!(answer, "stub answer");
    assert_eq!(h.completer.calls.load(Ordering::SeqCst), 1);

    let prompt = h.completer.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Chlorophyll absorbs sunlight in the leaf."));
    assert!(prompt.contains(question));
}

#[tokio::test]
async fn compression_drops_irrelevant_sentences_from_the_prompt() {
    let h = harness(true);
    // One long page: three sentences about photosynthesis, padding around
    // an off-topic sentence that compression should drop.
    let text = "Photosynthesis converts sunlight into sugar inside the leaf tissue. \
                The laboratory cafeteria serves lunch at noon for visitors. \
                Chlorophyll absorbs sunlight and drives photosynthesis forward. \
                Seasonal menus rotate weekly according to the posted schedule. \
                Strong sunlight increases the photosynthesis rate measurably.";
    assert!(text.len() >= 300);
    h.pipeline.index_pages(vec![page(text, 1, "u1")]).await.unwrap();

    let answer =
        h.pipeline.ask_question("photosynthesis chlorophyll sunlight", "u1").await.unwrap();
    assert_eq!(answer, "stub answer");

    let prompt = h.completer.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Chlorophyll absorbs sunlight"));
    assert!(!prompt.contains("cafeteria"));
}

#[tokio::test]
async fn index_document_without_loader_is_a_pipeline_error() {
    let h = harness(false);
    let result = h.pipeline.index_document(Path::new("missing.pdf"), "u1").await;
    assert!(matches!(result, Err(DocQaError::Pipeline(_))));
}

#[tokio::test]
async fn indexing_blank_pages_writes_nothing() {
    let h = harness(false);
    let written = h.pipeline.index_pages(vec![page("   \n\n ", 1, "u1")]).await.unwrap();
    assert_eq!(written, 0);
    assert!(h.store.is_empty().await);
}
