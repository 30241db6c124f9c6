//! askdocs - chat with a local document collection over Ollama.

mod chat;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use askdocs_core::{AskdocsConfig, Result};
use askdocs_ingest::{load_documents, IngestPipeline};
use askdocs_ollama::{OllamaEmbedder, OllamaGenerator};
use askdocs_query::QueryEngine;
use askdocs_store::SqliteStore;

/// askdocs - Local retrieval-augmented question answering
#[derive(Parser)]
#[command(name = "askdocs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: askdocs.toml, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the source documents into the persistent collection (full rebuild)
    Ingest {
        /// Source directory (overrides config)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Chat with the ingested collection
    Chat,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<&PathBuf>) -> Result<AskdocsConfig> {
    match path {
        Some(path) => AskdocsConfig::load(path),
        None => AskdocsConfig::load_default(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let result = match run(cli).await {
        Ok(()) => return,
        Err(e) => e,
    };

    eprintln!("Error: {result}");
    std::process::exit(1);
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Ingest { data_dir } => {
            let mut config = config;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_ingest(&config).await
        }
        Commands::Chat => run_chat(&config).await,
    }
}

async fn run_ingest(config: &AskdocsConfig) -> Result<()> {
    println!("--- Starting ingestion ---");

    let documents = load_documents(&config.data_dir)?;
    println!("Loaded {} document(s) from {}", documents.len(), config.data_dir.display());

    let store = Arc::new(SqliteStore::open(&config.persist_path)?);
    let embedder = Arc::new(OllamaEmbedder::new(
        &config.ollama_url,
        &config.embedding_model,
        config.request_timeout(),
    )?);

    let pipeline = IngestPipeline::new(store, embedder, &config.collection);
    let count = pipeline.run(documents).await?;

    println!(
        "Ingested {} entries into '{}' at {}",
        count,
        config.collection,
        config.persist_path.display()
    );
    println!("You can now run `askdocs chat`.");
    Ok(())
}

async fn run_chat(config: &AskdocsConfig) -> Result<()> {
    let store = Arc::new(SqliteStore::open_existing(&config.persist_path)?);
    let embedder = Arc::new(OllamaEmbedder::new(
        &config.ollama_url,
        &config.embedding_model,
        config.request_timeout(),
    )?);
    let generator = Arc::new(OllamaGenerator::new(
        &config.ollama_url,
        &config.llm_model,
        config.request_timeout(),
    )?);

    let engine = QueryEngine::open(
        store,
        embedder,
        generator,
        &config.collection,
        config.top_k,
    )
    .await?;

    chat::run_chat_loop(&engine).await
}
