use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use archmatch::config::{AppConfig, ProviderConfig};
use archmatch::dataset::{self, DatasetMetadata, EnrichedDataset};
use archmatch::services::{AiServices, BatchProcessor, CancelFlag, PipelineConfig};
use archmatch::AppError;

#[derive(Parser)]
#[command(name = "archmatch")]
#[command(about = "AI enrichment and semantic search over an Israeli company catalog")]
#[command(version)]
struct Cli {
    /// Optional JSON config file with tuning parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich a raw catalog with AI analysis and embeddings
    Enrich {
        /// Raw catalog file (companies + reference lists)
        input: PathBuf,
        /// Where to write the enriched catalog
        output: PathBuf,
        /// Records per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Only process the first N records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Semantic search over an enriched catalog
    Search {
        /// Enriched catalog file
        input: PathBuf,
        /// Query text
        query: String,
        /// Maximum number of results
        #[arg(long)]
        top_k: Option<usize>,
        /// Minimum cosine similarity (strict)
        #[arg(long)]
        threshold: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let provider = ProviderConfig::from_env().map_err(AppError::Config)?;
    let ai = Arc::new(AiServices::new(&config, &provider).map_err(AppError::from)?);

    match cli.command {
        Command::Enrich {
            input,
            output,
            batch_size,
            limit,
        } => run_enrich(ai, config, &input, &output, batch_size, limit).await,
        Command::Search {
            input,
            query,
            top_k,
            threshold,
        } => run_search(ai, config, &input, &query, top_k, threshold).await,
    }
}

async fn run_enrich(
    ai: Arc<AiServices>,
    config: AppConfig,
    input: &Path,
    output: &Path,
    batch_size: Option<usize>,
    limit: Option<usize>,
) -> Result<()> {
    let raw = dataset::load_raw(input)?;

    let mut companies = raw.companies;
    if let Some(limit) = limit {
        companies.truncate(limit);
        tracing::info!(limit, "processing a limited prefix of the catalog");
    }

    let mut pipeline_config = PipelineConfig::from(&config);
    if let Some(batch_size) = batch_size {
        pipeline_config.batch_size = batch_size;
    }

    let cancel = CancelFlag::new();
    let ctrlc_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing the current record");
            ctrlc_cancel.cancel();
        }
    });

    let processor = BatchProcessor::new(ai, pipeline_config);
    let enriched = processor.process(&companies, &cancel).await;

    let dataset = EnrichedDataset {
        regions: raw.regions,
        company_types: raw.company_types,
        metadata: DatasetMetadata {
            total_companies: enriched.len(),
            rag_enhanced: true,
            embedding_model: config.embedding_model.clone(),
            processed_at: Utc::now(),
        },
        companies: enriched,
    };
    dataset::save_enriched(output, &dataset)?;

    Ok(())
}

async fn run_search(
    ai: Arc<AiServices>,
    config: AppConfig,
    input: &Path,
    query: &str,
    top_k: Option<usize>,
    threshold: Option<f32>,
) -> Result<()> {
    let catalog = dataset::load_enriched(input)?;
    let top_k = top_k.unwrap_or(config.search_top_k);
    let threshold = threshold.unwrap_or(config.search_threshold);

    let results = ai
        .search
        .search(query, &catalog.companies, top_k, threshold)
        .await;

    if results.is_empty() {
        println!("No results found");
        return Ok(());
    }

    println!("Found {} results:", results.len());
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. {} ({}) - similarity: {:.3}",
            rank + 1,
            result.record.record.display_name(),
            result
                .record
                .record
                .company_type
                .as_deref()
                .unwrap_or("Unknown"),
            result.score
        );
    }

    Ok(())
}
