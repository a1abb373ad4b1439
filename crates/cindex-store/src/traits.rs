//! Store repository trait for dependency injection and testing.

use async_trait::async_trait;
use cindex_core::{
    ApiEndpoint, Chunk, CrossRepoDependency, DocumentationChunk, File, Repository, Service,
    Symbol, Workspace,
};
use serde::Serialize;

use crate::error::StoreResult;

/// A scored chunk returned from hybrid search (spec §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub vector_score: f64,
    pub keyword_score: f64,
    pub combined_score: f64,
}

/// A scored API endpoint returned from API search (spec §4.12).
#[derive(Debug, Clone, Serialize)]
pub struct ScoredEndpoint {
    pub endpoint: ApiEndpoint,
    pub combined_score: f64,
}

/// All persistent storage operations the indexing orchestrator and the
/// retrieval pipeline need, behind one trait so both can be tested against
/// an in-memory fake.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Register or update a repository's metadata. Upserts on `repo_id`.
    async fn upsert_repository(&self, repo: &Repository) -> StoreResult<()>;

    /// Fetch a repository by id.
    async fn get_repository(&self, repo_id: &str) -> StoreResult<Option<Repository>>;

    /// List repositories, optionally restricted to a `repo_id` subset.
    async fn list_repositories(&self, repo_ids: Option<&[String]>) -> StoreResult<Vec<Repository>>;

    /// Look up a file's current `content_hash`, used for incremental re-index
    /// skip decisions (spec §4.5 stage 1).
    async fn get_file_content_hash(
        &self,
        repo_id: &str,
        file_path: &str,
    ) -> StoreResult<Option<String>>;

    /// Upsert file metadata (summary, embedding, import/export lists).
    async fn upsert_file(&self, file: &File) -> StoreResult<()>;

    /// Fetch a file's own row, including its workspace/service linkage —
    /// the only source of that linkage, distinct from the file-summary
    /// `Chunk` returned by `get_file_summaries`.
    async fn get_file(&self, repo_id: &str, file_path: &str) -> StoreResult<Option<File>>;

    /// Atomically replace all chunks belonging to `(repo_id, file_path)` with
    /// `chunks`, returning the chunk IDs that were removed.
    async fn replace_file_chunks(
        &self,
        repo_id: &str,
        file_path: &str,
        chunks: Vec<Chunk>,
    ) -> StoreResult<Vec<uuid::Uuid>>;

    /// Delete every row for a repository (files, chunks, symbols, endpoints,
    /// workspaces, services) in one transaction. Used by `reindex_repository`
    /// and repository removal.
    async fn delete_repository(&self, repo_id: &str) -> StoreResult<()>;

    /// Hybrid (vector + full-text) search over chunks (spec §4.8).
    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        repo_ids: Option<&[String]>,
        vector_weight: f64,
        keyword_weight: f64,
        limit: usize,
    ) -> StoreResult<Vec<ScoredChunk>>;

    /// Fetch file-level summary chunks for the given files (spec §4.7).
    async fn get_file_summaries(&self, repo_id: &str, file_paths: &[String]) -> StoreResult<Vec<Chunk>>;

    /// Resolve a symbol name to all matching definitions, ordered by
    /// `(name, file_path)` (spec §4.10).
    async fn resolve_symbol(&self, repo_id: &str, name: &str) -> StoreResult<Vec<Symbol>>;

    /// Upsert symbols extracted for a file, replacing any prior symbols for
    /// that file.
    async fn replace_file_symbols(
        &self,
        repo_id: &str,
        file_path: &str,
        symbols: Vec<Symbol>,
    ) -> StoreResult<()>;

    /// Upsert workspace (monorepo package) metadata.
    async fn upsert_workspace(&self, workspace: &Workspace) -> StoreResult<()>;

    /// List workspaces for a repository.
    async fn list_workspaces(&self, repo_id: &str) -> StoreResult<Vec<Workspace>>;

    /// Upsert service boundary metadata.
    async fn upsert_service(&self, service: &Service) -> StoreResult<()>;

    /// List services for a repository.
    async fn list_services(&self, repo_id: &str) -> StoreResult<Vec<Service>>;

    /// Upsert an API endpoint, enforcing the at-most-one-implementation
    /// invariant (spec §3, §8).
    async fn upsert_api_endpoint(&self, endpoint: &ApiEndpoint) -> StoreResult<()>;

    /// Hybrid search over API endpoints (spec §4.12).
    async fn search_api_endpoints(
        &self,
        query_embedding: &[f32],
        repo_ids: Option<&[String]>,
        api_type: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<ScoredEndpoint>>;

    /// Record a directed cross-repo dependency edge (spec §4.11).
    async fn upsert_cross_repo_dependency(&self, dep: &CrossRepoDependency) -> StoreResult<()>;

    /// List dependency edges reachable from `repo_id` up to `max_depth` hops.
    async fn list_cross_repo_dependencies(
        &self,
        repo_id: &str,
        max_depth: u32,
    ) -> StoreResult<Vec<CrossRepoDependency>>;

    /// Atomically replace documentation chunks for a `doc_set`.
    async fn replace_documentation_chunks(
        &self,
        doc_set: &str,
        chunks: Vec<DocumentationChunk>,
    ) -> StoreResult<()>;

    /// Hybrid search over documentation chunks (spec §4.9).
    async fn search_documentation(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        doc_sets: Option<&[String]>,
        limit: usize,
    ) -> StoreResult<Vec<DocumentationChunk>>;

    /// Aggregate counts and sizes for `get_index_stats` (spec §6).
    async fn index_stats(&self, repo_id: Option<&str>) -> StoreResult<IndexStats>;
}

/// Aggregate index statistics (spec §6 `get_index_stats`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub repository_count: i64,
    pub file_count: i64,
    pub chunk_count: i64,
    pub symbol_count: i64,
    pub endpoint_count: i64,
    pub storage_bytes: i64,
}
