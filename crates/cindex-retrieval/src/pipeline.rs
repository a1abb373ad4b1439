//! Top-level retrieval pipeline (spec §4.6-§4.14, §5): drives all nine
//! stages in the required order. Stages 0-3 run sequentially; stages 4, 5,
//! and 6 run concurrently off stage 3's output; stage 7 waits on stages 3
//! and 6; stage 8 waits on everything.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cindex_backend::EmbeddingService;
use cindex_config::RetrievalConfig;
use cindex_core::{Chunk, RepoKind};
use cindex_parsing::TokenCounterRegistry;
use cindex_store::StoreRepository;

use crate::api::{self, ApiEnrichment};
use crate::context::{self, AssembledContext};
use crate::dedup;
use crate::imports::{self, ImportChainEntry};
use crate::query::QueryProcessor;
use crate::retrieval::{self, ScoredFile};
use crate::scope::{self, ScopeConfig};
use crate::symbols::{self, SymbolResolution};

use crate::error::RetrievalResult;

pub struct RetrievalPipeline {
    store: Arc<dyn StoreRepository>,
    query_processor: QueryProcessor,
    token_counters: Arc<TokenCounterRegistry>,
    config: RetrievalConfig,
}

#[derive(Debug, Clone, Default)]
pub struct RetrievalRequest {
    pub query: String,
    pub scope: ScopeConfig,
}

impl RetrievalPipeline {
    #[must_use]
    pub fn new(
        store: Arc<dyn StoreRepository>,
        embeddings: Arc<dyn EmbeddingService>,
        token_counters: Arc<TokenCounterRegistry>,
        config: RetrievalConfig,
    ) -> Self {
        Self { store, query_processor: QueryProcessor::new(embeddings), token_counters, config }
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn retrieve(&self, request: &RetrievalRequest) -> RetrievalResult<AssembledContext> {
        // Stage 0: Scope Filter.
        let scope = scope::resolve(&self.store, &request.scope).await?;

        // Stage 1: Query Processor.
        let processed = self.query_processor.process(&request.query).await?;

        // Stage 2: File Retrieval.
        let top_files = retrieval::retrieve_files(
            &self.store,
            &processed.embedding,
            &processed.normalized_text,
            &scope,
            self.config.hybrid_vector_weight,
            self.config.hybrid_keyword_weight,
            self.config.similarity_threshold,
            self.config.top_k_files,
        )
        .await?;

        // Stage 3: Chunk Retrieval.
        let scored_chunks = retrieval::retrieve_chunks(
            &self.store,
            &processed.embedding,
            &processed.normalized_text,
            &scope,
            &top_files,
            self.config.hybrid_vector_weight,
            self.config.hybrid_keyword_weight,
            self.config.chunk_similarity_threshold,
            self.config.max_chunks,
        )
        .await?;

        let retrieved_chunks: Vec<Chunk> = scored_chunks.iter().map(|c| c.chunk.clone()).collect();
        let retrieved_chunk_ids: HashSet<uuid::Uuid> = retrieved_chunks.iter().map(|c| c.chunk_id).collect();
        let repo_ids_in_scope = scope.repo_ids.clone();

        // Stages 4, 5, 6 run concurrently; each depends only on stage 2/3 output.
        let symbols_fut = self.resolve_symbols_by_repo(&retrieved_chunks);
        let imports_fut = self.expand_imports(&top_files);
        let api_fut = self.enrich_api(&repo_ids_in_scope, Some(&processed.embedding), &retrieved_chunks, &retrieved_chunk_ids);

        let (symbol_resolutions, import_chain, api_enrichment) = tokio::try_join!(symbols_fut, imports_fut, api_fut)?;

        // Stage 7: waits on stage 3 (chunks) and stage 6 (api_enrichment, already joined above).
        let touched_repo_ids: Vec<String> =
            retrieved_chunks.iter().map(|c| c.repo_id.clone()).collect::<HashSet<_>>().into_iter().collect();
        let repo_kinds: HashMap<String, RepoKind> = self
            .store
            .list_repositories(Some(&touched_repo_ids))
            .await?
            .into_iter()
            .map(|r| (r.repo_id, r.kind.0))
            .collect();
        let prioritized = dedup::dedup_and_prioritize(
            scored_chunks,
            |repo_id| repo_kinds.get(repo_id).copied().unwrap_or(RepoKind::Monolithic),
            self.config.dedup_threshold,
        );

        // Stage 8: Context Assembly, waits on everything.
        let token_counter = self.token_counters.default_counter();
        let assembled = context::assemble_context(
            prioritized,
            symbol_resolutions,
            import_chain,
            api_enrichment,
            &token_counter,
            self.config.warn_context_tokens,
            self.config.max_context_tokens,
        );

        Ok(assembled)
    }

    async fn resolve_symbols_by_repo(&self, chunks: &[Chunk]) -> RetrievalResult<Vec<SymbolResolution>> {
        let mut by_repo: HashMap<&str, Vec<&Chunk>> = HashMap::new();
        for chunk in chunks {
            by_repo.entry(chunk.repo_id.as_str()).or_default().push(chunk);
        }
        let mut resolutions = Vec::new();
        for (repo_id, repo_chunks) in by_repo {
            resolutions.extend(symbols::resolve_symbols(&self.store, repo_id, &repo_chunks).await?);
        }
        Ok(resolutions)
    }

    async fn expand_imports(&self, top_files: &[ScoredFile]) -> RetrievalResult<Vec<ImportChainEntry>> {
        let mut by_repo: HashMap<&str, Vec<String>> = HashMap::new();
        for file in top_files {
            by_repo.entry(file.repo_id.as_str()).or_default().push(file.file_path.clone());
        }
        let mut entries = Vec::new();
        for (repo_id, seeds) in by_repo {
            let repo = self.store.get_repository(repo_id).await?;
            let aliases = imports::extract_aliases(repo.as_ref().and_then(|r| r.workspace_config.as_ref()));
            entries.extend(
                imports::expand_import_chain(
                    &self.store,
                    repo_id,
                    &seeds,
                    &aliases,
                    self.config.import_depth,
                    self.config.workspace_depth,
                    self.config.service_depth,
                )
                .await?,
            );
        }
        Ok(entries)
    }

    async fn enrich_api(
        &self,
        repo_ids: &[String],
        query_embedding: Option<&[f32]>,
        chunks: &[Chunk],
        retrieved_chunk_ids: &HashSet<uuid::Uuid>,
    ) -> RetrievalResult<ApiEnrichment> {
        if !self.config.enable_api_endpoint_detection {
            return Ok(ApiEnrichment::default());
        }
        let chunk_refs: Vec<&Chunk> = chunks.iter().collect();
        api::enrich_api_context(
            &self.store,
            repo_ids,
            query_embedding,
            &chunk_refs,
            retrieved_chunk_ids,
            self.config.api_endpoint_similarity_threshold,
            self.config.api_endpoint_cap,
        )
        .await
    }
}
