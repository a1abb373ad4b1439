//! Shared application state: the fully wired store, embedding/summary
//! backends, indexing orchestrator, and retrieval pipeline every handler
//! draws on. Built once in `main` and cloned cheaply into each tool call.

use std::sync::Arc;

use cindex_backend::EmbeddingService;
use cindex_config::ApplicationConfig;
use cindex_index::IndexingOrchestrator;
use cindex_parsing::{ChunkingService, ParserRegistry, TokenCounterRegistry};
use cindex_retrieval::RetrievalPipeline;
use cindex_store::StoreRepository;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoreRepository>,
    pub embeddings: Arc<dyn EmbeddingService>,
    pub orchestrator: Arc<IndexingOrchestrator>,
    pub retrieval: Arc<RetrievalPipeline>,
    pub parsers: Arc<ParserRegistry>,
    pub chunker: Arc<ChunkingService>,
    pub token_counters: Arc<TokenCounterRegistry>,
    pub config: Arc<ApplicationConfig>,
}
