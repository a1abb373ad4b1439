//! Handler for the `index_repository` tool (spec §6, §4.5): indexes or
//! re-indexes a repository, forwarding orchestrator progress events as
//! structured log notifications on the `cindex.indexing` logger.

use std::path::PathBuf;

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::entities::{Repository, RepoKindColumn};
use cindex_index::{IndexRunStats, ProgressEvent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct IndexRepositoryParams {
    pub repo_path: String,
    /// Stable repo identifier; derived from the root directory name when absent.
    pub repo_id: Option<String>,
    pub name: Option<String>,
    /// One of `monolithic`, `monorepo`, `microservice`, `library`, `reference`, `documentation`.
    pub kind: Option<String>,
    pub version: Option<String>,
    pub upstream_url: Option<String>,
    pub force_reindex: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndexRepositoryResponse {
    pub repo_id: String,
    pub stats: IndexRunStats,
}

impl IntoContents for IndexRepositoryResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize IndexRepositoryResponse")]
    }
}

pub async fn index_repository_handler(
    state: &AppState,
    params: &IndexRepositoryParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    if params.repo_path.trim().is_empty() {
        return Err(validation_err("repo_path must not be empty"));
    }

    let root = PathBuf::from(&params.repo_path);
    let repo_id = params.repo_id.clone().unwrap_or_else(|| {
        root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| params.repo_path.clone())
    });
    let kind = match &params.kind {
        Some(k) => RepoKindColumn::try_from(k.clone()).map_err(validation_err)?,
        None => RepoKindColumn(cindex_core::RepoKind::Monolithic),
    };

    info!(
        target = "handler",
        event = "incoming_request",
        tool = "index_repository",
        repo_id = %repo_id,
        repo_path = %params.repo_path
    );

    let repo = Repository {
        repo_id: repo_id.clone(),
        name: params.name.clone().unwrap_or_else(|| repo_id.clone()),
        kind,
        version: params.version.clone(),
        upstream_url: params.upstream_url.clone(),
        workspace_config: None,
        indexed_at: None,
    };
    state.store.upsert_repository(&repo).await.map_err(|e| domain_err(e, "index_repository:upsert_repository"))?;

    let (progress_tx, mut progress_rx) = broadcast::channel(64);
    let progress_repo_id = repo_id.clone();
    let progress_task = tokio::spawn(async move {
        while let Ok(event) = progress_rx.recv().await {
            log_progress(&progress_repo_id, &event);
        }
    });

    let stats = state
        .orchestrator
        .index_repository(&root, &repo, params.force_reindex.unwrap_or(false), progress_tx)
        .await;
    progress_task.abort();

    if let Err(e) = &stats {
        error!(target = "handler", event = "index_error", tool = "index_repository", repo_id = %repo_id, error = %e);
    }
    let stats = stats.map_err(|e| domain_err(e, "index_repository"))?;
    info!(
        target = "handler",
        event = "index_ok",
        tool = "index_repository",
        repo_id = %repo_id,
        files_indexed = stats.files_indexed,
        failures = stats.failures.len()
    );

    IndexRepositoryResponse { repo_id, stats }.into_call_tool_result()
}

fn log_progress(repo_id: &str, event: &ProgressEvent) {
    let percentage = if event.total == 0 { 0.0 } else { (event.current as f64 / event.total as f64) * 100.0 };
    info!(
        logger = "cindex.indexing",
        r#type = "progress",
        repo_id,
        stage = event.stage,
        current = event.current,
        total = event.total,
        percentage,
        message = %event.message,
        eta_seconds = event.eta_seconds,
        timestamp = %chrono::Utc::now().to_rfc3339(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = IndexRepositoryParams { repo_path: "/repos/org/repo".to_string(), ..Default::default() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: IndexRepositoryParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.repo_path, "/repos/org/repo");
    }

    #[test]
    fn derives_repo_id_from_path_basename() {
        let root = PathBuf::from("/repos/org/my-repo");
        let id = root.file_name().map(|n| n.to_string_lossy().to_string());
        assert_eq!(id.as_deref(), Some("my-repo"));
    }
}
