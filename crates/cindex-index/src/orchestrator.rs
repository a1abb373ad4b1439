//! Indexing Orchestrator (spec §4.5, §5): drives the full nine-stage
//! pipeline for a repository with progress reporting. Discover and the
//! unchanged-file skip check run sequentially; Parse/Chunk/Summarize/Embed/
//! Extract Symbols run as a bounded pool of `indexing_batch_size` concurrent
//! futures. Persist is serialized in the task draining that pool, which is
//! the single-writer boundary for chunk and symbol replacement.

use std::path::Path;
use std::sync::Arc;

use cindex_backend::{EmbeddingService, SummaryProvider};
use cindex_config::IndexingConfig;
use cindex_core::RepoKind;
use cindex_core::entities::Repository;
use cindex_detect::{LargeFileDetector, SecretFilter};
use cindex_parsing::{ChunkingService, ParserRegistry};
use cindex_store::StoreRepository;
use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;

use crate::discover::discover;
use crate::error::IndexResult;
use crate::pipeline::{FileProcessors, process_file};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::stats::{FileFailure, IndexRunStats};
use crate::workspace_service::{detect_api_endpoints, detect_services, detect_workspaces};

pub struct IndexingOrchestrator {
    store: Arc<dyn StoreRepository>,
    processors: Arc<FileProcessors>,
    secret_filter: Arc<SecretFilter>,
    large_file: Arc<LargeFileDetector>,
    config: IndexingConfig,
}

impl IndexingOrchestrator {
    #[must_use]
    pub fn new(
        store: Arc<dyn StoreRepository>,
        parsers: Arc<ParserRegistry>,
        chunker: Arc<ChunkingService>,
        embeddings: Arc<dyn EmbeddingService>,
        summary_primary: Arc<dyn SummaryProvider>,
        summary_fallback: Arc<dyn SummaryProvider>,
        secret_filter: Arc<SecretFilter>,
        large_file: Arc<LargeFileDetector>,
        config: IndexingConfig,
    ) -> Self {
        Self {
            store,
            processors: Arc::new(FileProcessors {
                parsers,
                chunker,
                embeddings,
                summary_primary,
                summary_fallback,
            }),
            secret_filter,
            large_file,
            config,
        }
    }

    /// Indexes `repo` rooted at `root`. A file is skipped if its content
    /// hash matches the stored hash for `(repo_id, file_path)`, unless
    /// `force_reindex` is set. A `force_reindex` against a reference repo
    /// whose `version` is unchanged from the stored one is a no-op: there is
    /// nothing a forced reindex would accomplish for an immutable, versioned
    /// reference snapshot that a plain content-hash skip wouldn't already do.
    ///
    /// # Errors
    /// Returns an error only for a Stage 9 (Persist) failure; per-file
    /// failures are captured in the returned stats instead.
    pub async fn index_repository(
        &self,
        root: &Path,
        repo: &Repository,
        force_reindex: bool,
        progress_tx: broadcast::Sender<ProgressEvent>,
    ) -> IndexResult<IndexRunStats> {
        if !root.exists() {
            return Err(crate::error::IndexError::RootNotFound {
                path: root.display().to_string(),
            });
        }

        if force_reindex {
            if let Some(existing) = self.store.get_repository(&repo.repo_id).await? {
                if existing.kind.0 == RepoKind::Reference && existing.version.is_some() && existing.version == repo.version {
                    return Ok(IndexRunStats::default());
                }
            }
        }

        let mut reporter = ProgressReporter::new(progress_tx);
        reporter.emit_for_file("discover", 0, 0, "walking repository".to_string());
        let (discovered, discover_stats) = discover(root, &self.secret_filter, &self.large_file);
        let total = discovered.len();

        let mut stats = IndexRunStats {
            files_discovered: total,
            ..IndexRunStats::default()
        };

        let worker_count = self.config.indexing_batch_size.max(1);

        // Stage 1b: skip unchanged files before they ever reach a worker, so
        // incremental reindexing doesn't pay for parse/embed work it throws
        // away. Runs sequentially against the store; cheap relative to the
        // per-file work it's gating.
        let mut pending = Vec::with_capacity(discovered.len());
        for file in discovered.clone() {
            if !force_reindex {
                let current_hash = cindex_store::hash_content(&file.content);
                if let Ok(Some(stored_hash)) = self.store.get_file_content_hash(&repo.repo_id, &file.rel_path).await {
                    if stored_hash == current_hash {
                        stats.files_skipped_unchanged += 1;
                        continue;
                    }
                }
            }
            pending.push(file);
        }

        // Stage 2-6 run concurrently across up to `worker_count` files at a
        // time; Stage 9 (Persist) is serialized below as results arrive,
        // which is the single-writer boundary.
        let processors = self.processors.clone();
        let repo_id = repo.repo_id.clone();
        let mut results = stream::iter(pending.into_iter().map(|file| {
            let processors = processors.clone();
            let repo_id = repo_id.clone();
            async move {
                let path = file.rel_path.clone();
                let outcome = process_file(&processors, &repo_id, &file).await;
                (path, outcome.map_err(|e| e.to_string()))
            }
        }))
        .buffer_unordered(worker_count);

        let mut processed_count = 0usize;
        while let Some((path, outcome)) = results.next().await {
            processed_count += 1;
            match outcome {
                Ok(processed) => {
                    stats.files_indexed += 1;
                    stats.chunks_written += processed.chunks.len();
                    stats.symbols_written += processed.symbols.len();
                    self.store.upsert_file(&processed.file).await?;
                    self.store
                        .replace_file_chunks(&repo.repo_id, &path, processed.chunks)
                        .await?;
                    self.store
                        .replace_file_symbols(&repo.repo_id, &path, processed.symbols)
                        .await?;
                }
                Err(error) => {
                    stats.failures.push(FileFailure {
                        file: path,
                        stage: "pipeline",
                        error,
                    });
                }
            }
            reporter.emit_if_due("index", processed_count, total, format!("{processed_count}/{total} files"));
        }

        reporter.emit_for_file("detect_workspaces", total, total, "detecting workspaces".to_string());
        let workspaces = detect_workspaces(&repo.repo_id, repo.kind.0, &discovered);
        stats.workspaces_detected = workspaces.len();
        for workspace in &workspaces {
            self.store.upsert_workspace(workspace).await?;
        }

        reporter.emit_for_file("detect_services", total, total, "detecting services".to_string());
        let services = detect_services(&repo.repo_id, repo.kind.0, &discovered);
        stats.services_detected = services.len();
        for service in &services {
            self.store.upsert_service(service).await?;
        }

        // Stage 2-6 persisted each file's row before workspace/service
        // detection above had run, so every file was written with no
        // workspace/service linkage. Backfill it now that both are known.
        if !workspaces.is_empty() || !services.is_empty() {
            for file in &discovered {
                let workspace_id = workspaces
                    .iter()
                    .find(|w| file.rel_path.starts_with(&format!("{}/", w.rel_path)))
                    .map(|w| w.workspace_id.clone());
                let service_id =
                    services.iter().find(|s| s.files.contains(&file.rel_path)).map(|s| s.service_id.clone());
                if workspace_id.is_none() && service_id.is_none() {
                    continue;
                }
                if let Some(mut stored_file) = self.store.get_file(&repo.repo_id, &file.rel_path).await? {
                    stored_file.workspace_id = workspace_id;
                    stored_file.service_id = service_id;
                    self.store.upsert_file(&stored_file).await?;
                }
            }
        }

        let endpoints = detect_api_endpoints(&repo.repo_id, &discovered, |_, _| None);
        stats.endpoints_detected = endpoints.len();
        for endpoint in &endpoints {
            self.store.upsert_api_endpoint(endpoint).await?;
        }

        let mut committed_repo = repo.clone();
        committed_repo.indexed_at = Some(chrono::Utc::now());
        self.store.upsert_repository(&committed_repo).await?;

        reporter.emit_for_file("persist", total, total, "commit complete".to_string());
        stats.detector_stats.secret_files_skipped = discover_stats.secret_skipped;
        stats.detector_stats.large_files_skipped = discover_stats.large_file_skipped;
        Ok(stats)
    }
}
