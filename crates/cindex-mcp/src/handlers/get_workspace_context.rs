//! Handler for the `get_workspace_context` tool (spec §6): a workspace's
//! metadata plus the cross-repo dependency edges reachable from its repo.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::{CrossRepoDependency, Workspace};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetWorkspaceContextParams {
    pub repo_id: String,
    pub workspace_id: String,
    /// Max hop count for the dependency walk (default from retrieval config).
    pub max_depth: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GetWorkspaceContextResponse {
    pub workspace: Option<Workspace>,
    pub dependencies: Vec<CrossRepoDependency>,
}

impl IntoContents for GetWorkspaceContextResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize GetWorkspaceContextResponse")]
    }
}

pub async fn get_workspace_context_handler(
    state: &AppState,
    params: &GetWorkspaceContextParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "get_workspace_context",
        repo_id = %params.repo_id,
        workspace_id = %params.workspace_id
    );

    if params.repo_id.trim().is_empty() || params.workspace_id.trim().is_empty() {
        return Err(validation_err("repo_id and workspace_id must not be empty"));
    }

    let workspaces = state
        .store
        .list_workspaces(&params.repo_id)
        .await
        .map_err(|e| domain_err(e, "get_workspace_context:list_workspaces"))?;
    let workspace = workspaces.into_iter().find(|w| w.workspace_id == params.workspace_id);

    let max_depth = params.max_depth.unwrap_or(state.config.retrieval.workspace_depth);
    let dependencies = state.store.list_cross_repo_dependencies(&params.repo_id, max_depth).await;
    if let Err(e) = &dependencies {
        error!(target = "handler", event = "dependencies_error", tool = "get_workspace_context", error = %e);
    }
    let dependencies = dependencies.map_err(|e| domain_err(e, "get_workspace_context:list_cross_repo_dependencies"))?;

    GetWorkspaceContextResponse { workspace, dependencies }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params =
            GetWorkspaceContextParams { repo_id: "org/repo".to_string(), workspace_id: "packages/core".to_string(), max_depth: None };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: GetWorkspaceContextParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.workspace_id, "packages/core");
    }
}
