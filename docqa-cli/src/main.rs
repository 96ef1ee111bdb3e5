//! Interactive shell for document question answering.
//!
//! Indexes one or more PDFs for a user, then answers questions in a REPL
//! loop. Credentials come from the environment: `GOOGLE_API_KEY` for the
//! models, and `CHROMA_API_KEY`/`CHROMA_TENANT`/`CHROMA_DATABASE`/
//! `CHROMA_COLLECTION` for the cloud store (skipped with `--in-memory`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docqa_rag::chroma::{ChromaConfig, ChromaVectorStore};
use docqa_rag::gemini::{GeminiCompletionProvider, GeminiEmbeddingProvider};
use docqa_rag::{
    AnsweringPipeline, InMemoryVectorStore, PdfLoader, PipelineConfig, VectorStore,
};

#[derive(Parser)]
#[command(name = "docqa", about = "Ask questions about your documents")]
struct Args {
    /// PDF files to index before the question loop starts.
    #[arg(required = true)]
    pdfs: Vec<PathBuf>,

    /// User id owning the indexed documents.
    #[arg(long, default_value = "user_001")]
    user: String,

    /// Number of chunks to retrieve per question.
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Compress retrieved chunks to their query-relevant sentences.
    #[arg(long)]
    compress: bool,

    /// Use an in-memory store instead of Chroma Cloud (nothing persists).
    #[arg(long)]
    in_memory: bool,

    /// Override the embedding model name.
    #[arg(long)]
    embedding_model: Option<String>,

    /// Override the chat model name.
    #[arg(long)]
    chat_model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();

    let mut embedder =
        GeminiEmbeddingProvider::from_env().context("failed to configure embedding model")?;
    if let Some(model) = &args.embedding_model {
        embedder = embedder.with_model(model);
    }
    let embedder = Arc::new(embedder);

    let mut completer =
        GeminiCompletionProvider::from_env().context("failed to configure chat model")?;
    if let Some(model) = &args.chat_model {
        completer = completer.with_model(model);
    }

    let store: Arc<dyn VectorStore> = if args.in_memory {
        Arc::new(InMemoryVectorStore::new())
    } else {
        let config = ChromaConfig::from_env().context("failed to configure Chroma Cloud")?;
        Arc::new(ChromaVectorStore::connect(config).await.context("failed to connect to Chroma")?)
    };

    let config = PipelineConfig::builder().top_k(args.top_k).build()?;
    let pipeline = AnsweringPipeline::builder()
        .config(config)
        .loader(Arc::new(PdfLoader::new()))
        .embedder(embedder)
        .store(store)
        .completer(Arc::new(completer))
        .with_compression(args.compress)
        .build()?;

    for pdf in &args.pdfs {
        let written = pipeline
            .index_document(pdf, &args.user)
            .await
            .with_context(|| format!("failed to index {}", pdf.display()))?;
        println!("indexed {} ({written} chunks)", pdf.display());
    }

    println!("Ask questions about your documents (\"exit\" to quit).");
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("ask> ") {
            Ok(line) => {
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if question == "exit" {
                    break;
                }
                editor.add_history_entry(question)?;
                match pipeline.ask_question(question, &args.user).await {
                    Ok(answer) => println!("{answer}\n"),
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                debug!(error = %e, "readline failed");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
