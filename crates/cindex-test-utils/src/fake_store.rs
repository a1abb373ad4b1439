//! In-memory `StoreRepository` fake, standing in for `cindex-store`'s
//! Postgres implementation in unit and orchestrator tests. Scoring in
//! `search_chunks`/`search_api_endpoints`/`search_documentation` is a
//! simplified cosine-similarity + substring-match stand-in for the real
//! pgvector/`ts_rank` hybrid query, good enough to exercise pipeline wiring
//! without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cindex_core::{ApiEndpoint, Chunk, CrossRepoDependency, DocumentationChunk, File, Repository, Service, Symbol, Workspace};
use cindex_store::{IndexStats, ScoredChunk, ScoredEndpoint, StoreRepository, StoreResult};

#[derive(Default)]
pub struct FakeStoreRepository {
    repositories: Mutex<HashMap<String, Repository>>,
    files: Mutex<HashMap<(String, String), File>>,
    chunks: Mutex<HashMap<(String, String), Vec<Chunk>>>,
    symbols: Mutex<HashMap<(String, String), Vec<Symbol>>>,
    workspaces: Mutex<HashMap<String, Vec<Workspace>>>,
    services: Mutex<HashMap<String, Vec<Service>>>,
    endpoints: Mutex<Vec<ApiEndpoint>>,
    cross_repo_deps: Mutex<Vec<CrossRepoDependency>>,
    documentation: Mutex<HashMap<String, Vec<DocumentationChunk>>>,
}

impl FakeStoreRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    f64::from(dot / (norm_a * norm_b))
}

fn keyword_score(text: &str, query_text: &str) -> f64 {
    let text = text.to_lowercase();
    let hits = query_text
        .split_whitespace()
        .filter(|term| text.contains(&term.to_lowercase()))
        .count();
    let terms = query_text.split_whitespace().count().max(1);
    hits as f64 / terms as f64
}

#[async_trait]
impl StoreRepository for FakeStoreRepository {
    async fn upsert_repository(&self, repo: &Repository) -> StoreResult<()> {
        self.repositories.lock().unwrap().insert(repo.repo_id.clone(), repo.clone());
        Ok(())
    }

    async fn get_repository(&self, repo_id: &str) -> StoreResult<Option<Repository>> {
        Ok(self.repositories.lock().unwrap().get(repo_id).cloned())
    }

    async fn list_repositories(&self, repo_ids: Option<&[String]>) -> StoreResult<Vec<Repository>> {
        let repos = self.repositories.lock().unwrap();
        Ok(match repo_ids {
            Some(ids) => ids.iter().filter_map(|id| repos.get(id).cloned()).collect(),
            None => repos.values().cloned().collect(),
        })
    }

    async fn get_file_content_hash(&self, repo_id: &str, file_path: &str) -> StoreResult<Option<String>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&(repo_id.to_string(), file_path.to_string()))
            .map(|f| f.content_hash.clone()))
    }

    async fn upsert_file(&self, file: &File) -> StoreResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert((file.repo_id.clone(), file.file_path.clone()), file.clone());
        Ok(())
    }

    async fn get_file(&self, repo_id: &str, file_path: &str) -> StoreResult<Option<File>> {
        Ok(self.files.lock().unwrap().get(&(repo_id.to_string(), file_path.to_string())).cloned())
    }

    async fn replace_file_chunks(
        &self,
        repo_id: &str,
        file_path: &str,
        chunks: Vec<Chunk>,
    ) -> StoreResult<Vec<uuid::Uuid>> {
        let key = (repo_id.to_string(), file_path.to_string());
        let removed = self
            .chunks
            .lock()
            .unwrap()
            .insert(key, chunks)
            .map(|old| old.into_iter().map(|c| c.chunk_id).collect())
            .unwrap_or_default();
        Ok(removed)
    }

    async fn delete_repository(&self, repo_id: &str) -> StoreResult<()> {
        self.repositories.lock().unwrap().remove(repo_id);
        self.files.lock().unwrap().retain(|(r, _), _| r != repo_id);
        self.chunks.lock().unwrap().retain(|(r, _), _| r != repo_id);
        self.symbols.lock().unwrap().retain(|(r, _), _| r != repo_id);
        self.workspaces.lock().unwrap().remove(repo_id);
        self.services.lock().unwrap().remove(repo_id);
        self.endpoints.lock().unwrap().retain(|e| e.repo_id != repo_id);
        Ok(())
    }

    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        repo_ids: Option<&[String]>,
        vector_weight: f64,
        keyword_weight: f64,
        limit: usize,
    ) -> StoreResult<Vec<ScoredChunk>> {
        let chunks = self.chunks.lock().unwrap();
        let mut scored: Vec<ScoredChunk> = chunks
            .values()
            .flatten()
            .filter(|c| repo_ids.is_none_or(|ids| ids.iter().any(|id| id == &c.repo_id)))
            .map(|chunk| {
                let vector_score = chunk.embedding.as_deref().map_or(0.0, |e| cosine_similarity(e, query_embedding));
                let keyword_score = keyword_score(&chunk.content, query_text);
                ScoredChunk {
                    chunk: chunk.clone(),
                    vector_score,
                    keyword_score,
                    combined_score: vector_score * vector_weight + keyword_score * keyword_weight,
                }
            })
            .collect();
        scored.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap());
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get_file_summaries(&self, repo_id: &str, file_paths: &[String]) -> StoreResult<Vec<Chunk>> {
        let files = self.files.lock().unwrap();
        Ok(file_paths
            .iter()
            .filter_map(|path| {
                let file = files.get(&(repo_id.to_string(), path.clone()))?;
                let summary = file.summary.clone()?;
                Some(Chunk {
                    chunk_id: uuid::Uuid::new_v4(),
                    repo_id: repo_id.to_string(),
                    file_path: path.clone(),
                    chunk_type: cindex_core::ChunkType::FileSummary,
                    content: summary,
                    start_line: 0,
                    end_line: 0,
                    token_count: 0,
                    metadata: cindex_core::ChunkMetadata::default(),
                    embedding: file.summary_embedding.clone(),
                })
            })
            .collect())
    }

    async fn resolve_symbol(&self, repo_id: &str, name: &str) -> StoreResult<Vec<Symbol>> {
        let mut matches: Vec<Symbol> = self
            .symbols
            .lock()
            .unwrap()
            .iter()
            .filter(|((r, _), _)| r == repo_id)
            .flat_map(|(_, syms)| syms.iter().filter(|s| s.name == name).cloned())
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.file_path.cmp(&b.file_path)));
        Ok(matches)
    }

    async fn replace_file_symbols(&self, repo_id: &str, file_path: &str, symbols: Vec<Symbol>) -> StoreResult<()> {
        self.symbols
            .lock()
            .unwrap()
            .insert((repo_id.to_string(), file_path.to_string()), symbols);
        Ok(())
    }

    async fn upsert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        let mut workspaces = self.workspaces.lock().unwrap();
        let entry = workspaces.entry(workspace.repo_id.clone()).or_default();
        entry.retain(|w| w.workspace_id != workspace.workspace_id);
        entry.push(workspace.clone());
        Ok(())
    }

    async fn list_workspaces(&self, repo_id: &str) -> StoreResult<Vec<Workspace>> {
        Ok(self.workspaces.lock().unwrap().get(repo_id).cloned().unwrap_or_default())
    }

    async fn upsert_service(&self, service: &Service) -> StoreResult<()> {
        let mut services = self.services.lock().unwrap();
        let entry = services.entry(service.repo_id.clone()).or_default();
        entry.retain(|s| s.service_id != service.service_id);
        entry.push(service.clone());
        Ok(())
    }

    async fn list_services(&self, repo_id: &str) -> StoreResult<Vec<Service>> {
        Ok(self.services.lock().unwrap().get(repo_id).cloned().unwrap_or_default())
    }

    async fn upsert_api_endpoint(&self, endpoint: &ApiEndpoint) -> StoreResult<()> {
        let mut endpoints = self.endpoints.lock().unwrap();
        endpoints.retain(|e| e.endpoint_id != endpoint.endpoint_id);
        endpoints.push(endpoint.clone());
        Ok(())
    }

    async fn search_api_endpoints(
        &self,
        query_embedding: &[f32],
        repo_ids: Option<&[String]>,
        api_type: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<ScoredEndpoint>> {
        let endpoints = self.endpoints.lock().unwrap();
        let mut scored: Vec<ScoredEndpoint> = endpoints
            .iter()
            .filter(|e| repo_ids.is_none_or(|ids| ids.iter().any(|id| id == &e.repo_id)))
            .filter(|e| api_type.is_none_or(|t| format!("{:?}", e.api_type).eq_ignore_ascii_case(t)))
            .map(|endpoint| ScoredEndpoint {
                endpoint: endpoint.clone(),
                combined_score: endpoint.embedding.as_deref().map_or(0.0, |e| cosine_similarity(e, query_embedding)),
            })
            .collect();
        scored.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap());
        scored.truncate(limit);
        Ok(scored)
    }

    async fn upsert_cross_repo_dependency(&self, dep: &CrossRepoDependency) -> StoreResult<()> {
        let mut deps = self.cross_repo_deps.lock().unwrap();
        if !deps.iter().any(|d| d.source_repo_id == dep.source_repo_id && d.target_repo_id == dep.target_repo_id) {
            deps.push(dep.clone());
        }
        Ok(())
    }

    async fn list_cross_repo_dependencies(&self, repo_id: &str, max_depth: u32) -> StoreResult<Vec<CrossRepoDependency>> {
        if max_depth == 0 {
            return Ok(Vec::new());
        }
        let deps = self.cross_repo_deps.lock().unwrap();
        let mut frontier = vec![repo_id.to_string()];
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for _ in 0..max_depth {
            let mut next_frontier = Vec::new();
            for source in &frontier {
                for dep in deps.iter().filter(|d| &d.source_repo_id == source) {
                    if seen.insert((dep.source_repo_id.clone(), dep.target_repo_id.clone())) {
                        result.push(dep.clone());
                        next_frontier.push(dep.target_repo_id.clone());
                    }
                }
            }
            frontier = next_frontier;
            if frontier.is_empty() {
                break;
            }
        }
        Ok(result)
    }

    async fn replace_documentation_chunks(&self, doc_set: &str, chunks: Vec<DocumentationChunk>) -> StoreResult<()> {
        self.documentation.lock().unwrap().insert(doc_set.to_string(), chunks);
        Ok(())
    }

    async fn search_documentation(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        doc_sets: Option<&[String]>,
        limit: usize,
    ) -> StoreResult<Vec<DocumentationChunk>> {
        let documentation = self.documentation.lock().unwrap();
        let mut scored: Vec<(f64, DocumentationChunk)> = documentation
            .iter()
            .filter(|(set, _)| doc_sets.is_none_or(|sets| sets.iter().any(|s| s == *set)))
            .flat_map(|(_, chunks)| chunks.iter().cloned())
            .map(|chunk| {
                let vector_score = chunk.embedding.as_deref().map_or(0.0, |e| cosine_similarity(e, query_embedding));
                let score = vector_score + keyword_score(&chunk.content, query_text);
                (score, chunk)
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        Ok(scored.into_iter().take(limit).map(|(_, chunk)| chunk).collect())
    }

    async fn index_stats(&self, repo_id: Option<&str>) -> StoreResult<IndexStats> {
        let repositories = self.repositories.lock().unwrap();
        let files = self.files.lock().unwrap();
        let chunks = self.chunks.lock().unwrap();
        let symbols = self.symbols.lock().unwrap();
        let endpoints = self.endpoints.lock().unwrap();
        let matches = |repo: &str| repo_id.is_none_or(|id| id == repo);
        Ok(IndexStats {
            repository_count: repositories.keys().filter(|id| matches(id)).count() as i64,
            file_count: files.keys().filter(|(r, _)| matches(r)).count() as i64,
            chunk_count: chunks
                .iter()
                .filter(|((r, _), _)| matches(r))
                .map(|(_, cs)| cs.len() as i64)
                .sum(),
            symbol_count: symbols
                .iter()
                .filter(|((r, _), _)| matches(r))
                .map(|(_, ss)| ss.len() as i64)
                .sum(),
            endpoint_count: endpoints.iter().filter(|e| matches(&e.repo_id)).count() as i64,
            storage_bytes: chunks
                .iter()
                .filter(|((r, _), _)| matches(r))
                .flat_map(|(_, cs)| cs.iter())
                .map(|c| c.content.len() as i64)
                .sum(),
        })
    }
}
