//! Handler for the `find_cross_workspace_usages` tool (spec §6): traces
//! usages of a symbol outside the workspace that defines it.
//!
//! The store only tracks symbol definitions and chunk content, not a
//! dedicated references table, so "usage" is approximated as: chunks whose
//! metadata names the symbol, restricted to files outside the origin
//! workspace's directory (`Workspace::rel_path`).

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_store::ScoredChunk;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct FindCrossWorkspaceUsagesParams {
    pub repo_id: String,
    pub symbol_name: String,
    /// Workspace that defines the symbol; usages inside it are excluded.
    pub origin_workspace_id: Option<String>,
    /// Accepted but not yet implemented: transitive (re-exported) usages are
    /// not tracked, only direct references. See `transitive_tracking_supported`
    /// on the response.
    pub include_indirect: Option<bool>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FindCrossWorkspaceUsagesResponse {
    pub usages: Vec<ScoredChunk>,
    /// Always `false`: `include_indirect=true` is accepted for forward
    /// compatibility but currently behaves identically to `false`.
    pub transitive_tracking_supported: bool,
}

impl IntoContents for FindCrossWorkspaceUsagesResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize FindCrossWorkspaceUsagesResponse")]
    }
}

pub async fn find_cross_workspace_usages_handler(
    state: &AppState,
    params: &FindCrossWorkspaceUsagesParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "find_cross_workspace_usages",
        repo_id = %params.repo_id,
        symbol_name = %params.symbol_name
    );

    if params.repo_id.trim().is_empty() || params.symbol_name.trim().is_empty() {
        return Err(validation_err("repo_id and symbol_name must not be empty"));
    }

    let embedding = state
        .embeddings
        .embed_query(&params.symbol_name)
        .await
        .map_err(|e| domain_err(e, "find_cross_workspace_usages:embed_query"))?;

    let repo_ids = [params.repo_id.clone()];
    let limit = params.limit.unwrap_or(100);
    let chunks = state
        .store
        .search_chunks(
            &embedding,
            &params.symbol_name,
            Some(&repo_ids),
            state.config.retrieval.hybrid_vector_weight,
            state.config.retrieval.hybrid_keyword_weight,
            limit,
        )
        .await;
    if let Err(e) = &chunks {
        error!(target = "handler", event = "search_error", tool = "find_cross_workspace_usages", error = %e);
    }
    let mut usages = chunks.map_err(|e| domain_err(e, "find_cross_workspace_usages"))?;

    usages.retain(|c| c.chunk.metadata.referenced_names().iter().any(|n| n == &params.symbol_name));

    if let Some(origin) = &params.origin_workspace_id {
        let workspaces = state
            .store
            .list_workspaces(&params.repo_id)
            .await
            .map_err(|e| domain_err(e, "find_cross_workspace_usages:list_workspaces"))?;
        if let Some(workspace) = workspaces.iter().find(|w| &w.workspace_id == origin) {
            let prefix = workspace.rel_path.clone();
            usages.retain(|c| !c.chunk.file_path.starts_with(&prefix));
        }
    }

    info!(
        target = "handler",
        event = "find_ok",
        tool = "find_cross_workspace_usages",
        result_count = usages.len()
    );
    FindCrossWorkspaceUsagesResponse { usages, transitive_tracking_supported: false }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = FindCrossWorkspaceUsagesParams {
            repo_id: "org/repo".to_string(),
            symbol_name: "formatDate".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: FindCrossWorkspaceUsagesParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.symbol_name, "formatDate");
    }
}
