//! Entry point: loads configuration, wires the store/backend/indexing/
//! retrieval stack, and runs the MCP server over stdio.

// Internal modules
mod common;
mod config;
mod handlers;
mod server;
mod signal;
mod state;

use std::sync::Arc;

use clap::Parser;
use log::debug;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use cindex_backend::{DefaultEmbeddingService, EmbeddingProvider, HttpEmbeddingProvider, HttpSummaryProvider, RuleBasedSummaryProvider};
use cindex_config::Validate;
use cindex_detect::{LargeFileDetector, SecretFilter};
use cindex_index::IndexingOrchestrator;
use cindex_parsing::{ChunkingService, ParserRegistry, TokenBudget, TokenCounterRegistry};
use cindex_retrieval::RetrievalPipeline;
use cindex_store::{PgStoreRepository, PoolConfig, PoolManager, StoreRepository, run_migrations};

use crate::config::Config;
use crate::state::AppState;

/// cindex MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log directory path (defaults to OS-specific location)
    #[arg(long)]
    log_dir: Option<String>,

    /// Optional configuration file path (TOML format)
    #[arg(long, short = 'c')]
    config_file: Option<String>,
}

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    cindex_common::init::initialize_environment();
    debug!("[cindex-mcp] main() reached");

    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config_file {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file '{config_path}': {e}"))?;
        toml::from_str::<Config>(&contents)
            .map_err(|e| format!("Failed to parse config file '{config_path}': {e}"))?
    } else {
        Config::default()
    };

    if let Some(log_dir) = args.log_dir {
        config.log_dir = std::path::PathBuf::from(log_dir);
    }
    config.application.validate()?;

    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "cindex-mcp.log");
    let (file_writer, file_guard): (NonBlocking, WorkerGuard) = tracing_appender::non_blocking(file_appender);

    let (stderr_writer, stderr_guard): (NonBlocking, WorkerGuard) = tracing_appender::non_blocking(std::io::stderr());
    let multi_writer = file_writer.and(stderr_writer);

    tracing_subscriber::fmt()
        .json()
        .with_writer(multi_writer)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    debug!("[cindex-mcp] tracing initialized, profile={}", config.application.profile);

    let state = build_state(&config).await?;

    server::start(state, file_guard, stderr_guard).await
}

async fn build_state(config: &Config) -> Result<AppState, BoxError> {
    let app = &config.application;

    let pools = PoolManager::new(&app.store, PoolConfig::default()).await?;
    if app.store.auto_migrate {
        run_migrations(pools.write_pool()).await?;
    }
    let store: Arc<dyn StoreRepository> = Arc::new(PgStoreRepository::new(pools));

    let parsers = Arc::new(ParserRegistry::with_defaults());
    let token_counters = Arc::new(TokenCounterRegistry::with_defaults());
    let budget = TokenBudget::new(app.embedding.context_window / 4, app.embedding.context_window / 2);
    let chunker = Arc::new(ChunkingService::new(token_counters.default_counter(), budget));

    let embedding_provider = HttpEmbeddingProvider::new(app.backend.clone(), &app.embedding)?;
    let embedding_dimension = embedding_provider.embedding_dimension();
    if embedding_dimension != app.embedding.dimensions {
        tracing::warn!(
            configured = app.embedding.dimensions,
            provider = embedding_dimension,
            "embedding.dimensions does not match the provider's actual output dimension"
        );
    }
    let embeddings: Arc<dyn cindex_backend::EmbeddingService> = Arc::new(DefaultEmbeddingService::new(
        Arc::new(embedding_provider),
        app.indexing.indexing_batch_size,
        app.cache.query_embedding_capacity,
    ));

    let summary_primary: Arc<dyn cindex_backend::SummaryProvider> =
        Arc::new(HttpSummaryProvider::new(app.backend.clone(), &app.summary)?);
    let summary_fallback: Arc<dyn cindex_backend::SummaryProvider> = Arc::new(RuleBasedSummaryProvider::default());

    let secret_filter = Arc::new(SecretFilter::new(app.indexing.secret_patterns.clone())?);
    let large_file = Arc::new(LargeFileDetector::new());

    let orchestrator = Arc::new(IndexingOrchestrator::new(
        store.clone(),
        parsers.clone(),
        chunker.clone(),
        embeddings.clone(),
        summary_primary,
        summary_fallback,
        secret_filter,
        large_file,
        app.indexing.clone(),
    ));

    let retrieval = Arc::new(RetrievalPipeline::new(
        store.clone(),
        embeddings.clone(),
        token_counters.clone(),
        app.retrieval.clone(),
    ));

    Ok(AppState {
        store,
        embeddings,
        orchestrator,
        retrieval,
        parsers,
        chunker,
        token_counters,
        config: Arc::new(app.clone()),
    })
}
