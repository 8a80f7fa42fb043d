//! ragdoc - Command-line interface for the document retrieval pipeline.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use ragdoc_core::{ConfigOverrides, GenerationGateway, RagdocConfig, SearchHit, StreamEvent};
use ragdoc_llm::{EmbeddingGateway, OllamaGateway};
use ragdoc_query::{Indexer, Retriever};
use ragdoc_segment::{analyze, chunk};
use ragdoc_store::ElasticBackend;

/// ragdoc - Document query with a large language model
#[derive(Parser)]
#[command(name = "ragdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Collection name override
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration
    Config,

    /// Manage the storage collection
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },

    /// Segment and index a document
    Index {
        /// File to index; its file name becomes the document id
        file: PathBuf,
    },

    /// Search indexed documents and generate an answer over the hits
    Search {
        /// Search query
        query: String,

        /// Maximum number of hits
        #[arg(short = 'k', long)]
        size: Option<usize>,

        /// Minimum exclusive hit score
        #[arg(long)]
        score: Option<f32>,

        /// Print hits only, skip answer generation
        #[arg(long)]
        no_generate: bool,
    },

    /// Query the model without search context
    Generate {
        /// Prompt text
        text: String,
    },

    /// Print the embedding vector for a text
    Embed {
        /// Input text
        text: String,
    },
}

#[derive(Subcommand)]
enum StorageAction {
    /// Create the collection (success if it already exists)
    Create,

    /// Delete the collection (success if absent)
    Delete,

    /// Show collection metadata
    Info,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let base = match &cli.config {
        Some(path) => RagdocConfig::load(path)?,
        None => RagdocConfig::load_default()?,
    };

    let mut overrides = ConfigOverrides {
        collection: cli.collection.clone(),
        ..Default::default()
    };
    if let Commands::Search { size, score, .. } = &cli.command {
        overrides.search_size = *size;
        overrides.score_threshold = *score;
    }
    let config = base.with_overrides(overrides);

    // process-wide service handles, constructed once
    let gateway = Arc::new(OllamaGateway::new(&config.gateway));
    let backend = Arc::new(ElasticBackend::new(
        &config.storage,
        config.gateway.embed_dims,
    ));

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Storage { action } => match action {
            StorageAction::Create => {
                Indexer::new(backend, gateway).init().await?;
                println!("Collection '{}' ready", config.storage.collection);
            }
            StorageAction::Delete => {
                backend.delete_collection().await?;
                println!("Collection '{}' deleted", config.storage.collection);
            }
            StorageAction::Info => {
                let body = backend.collection_info().await?;
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        },
        Commands::Index { file } => {
            index_document(&config, backend, gateway, &file).await?;
        }
        Commands::Search {
            query, no_generate, ..
        } => {
            search(&config, backend, gateway, &query, no_generate).await?;
        }
        Commands::Generate { text } => {
            let generation = gateway.generate(&text).await?;
            println!("{}", generation.response);
            debug!(
                prompt_tokens = ?generation.prompt_tokens,
                response_tokens = ?generation.response_tokens,
                "generation complete"
            );
        }
        Commands::Embed { text } => {
            let embedding = gateway.embed(&text).await?;
            info!(dims = embedding.len(), "embedding generated");
            println!("{}", serde_json::to_string(&embedding)?);
        }
    }

    Ok(())
}

async fn index_document(
    config: &RagdocConfig,
    backend: Arc<ElasticBackend>,
    gateway: Arc<OllamaGateway>,
    file: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc_id = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("file path has no usable file name")?
        .to_string();

    info!(file = %file.display(), "reading document");
    let text = std::fs::read_to_string(file)?;

    let doc = analyze(&text);
    let chunks = chunk(&doc, config.chunking.chunk_size);
    info!(chunks = chunks.len(), words = doc.len(), "segmented document");

    if let (Some(first), Some(last)) = (chunks.first(), chunks.last()) {
        debug!(text = %first.text, lemma = %first.lemma, "first chunk");
        debug!(text = %last.text, lemma = %last.lemma, "last chunk");
    }

    let indexer = Indexer::new(backend, gateway);
    indexer.init().await?;
    indexer.index(&chunks, &doc_id).await?;

    println!("Indexed {} chunk(s) from '{}'", chunks.len(), doc_id);
    Ok(())
}

async fn search(
    config: &RagdocConfig,
    backend: Arc<ElasticBackend>,
    gateway: Arc<OllamaGateway>,
    query: &str,
    no_generate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let retriever = Retriever::new(backend, gateway.clone(), config.search.clone());
    let hits = retriever.search(query).await?;

    if hits.is_empty() {
        println!(
            "No results above score {}; retry with a lower --score",
            config.search.score_threshold
        );
        return Ok(());
    }

    for hit in &hits {
        println!("{}  (score {:.2})\n{}\n", hit.id, hit.score, hit.text);
    }

    if no_generate {
        return Ok(());
    }

    let prompt = build_prompt(query, &hits);
    let mut events = gateway.stream(&prompt).await?;

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Token(token) => {
                print!("{}", token);
                std::io::stdout().flush()?;
            }
            StreamEvent::Done {
                prompt_tokens,
                response_tokens,
            } => {
                println!();
                info!(?prompt_tokens, ?response_tokens, "generation complete");
            }
        }
    }

    Ok(())
}

/// Assemble the generation prompt from the query and the retrieved context.
fn build_prompt(query: &str, hits: &[SearchHit]) -> String {
    let mut context = String::new();
    for hit in hits {
        context.push_str(&format!("document-id {}\n{}\n\n", hit.id, hit.text));
    }

    format!("User question:\n{}\n\nSearch results:\n{}", query, context)
}
