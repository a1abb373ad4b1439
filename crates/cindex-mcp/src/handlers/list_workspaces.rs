//! Handler for the `list_workspaces` tool (spec §6).

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::Workspace;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ListWorkspacesParams {
    pub repo_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListWorkspacesResponse {
    pub workspaces: Vec<Workspace>,
}

impl IntoContents for ListWorkspacesResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize ListWorkspacesResponse")]
    }
}

pub async fn list_workspaces_handler(
    state: &AppState,
    params: &ListWorkspacesParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "list_workspaces", repo_id = %params.repo_id);

    if params.repo_id.trim().is_empty() {
        return Err(validation_err("repo_id must not be empty"));
    }

    let workspaces = state.store.list_workspaces(&params.repo_id).await;
    if let Err(e) = &workspaces {
        error!(target = "handler", event = "list_error", tool = "list_workspaces", error = %e);
    }
    let workspaces = workspaces.map_err(|e| domain_err(e, "list_workspaces"))?;

    ListWorkspacesResponse { workspaces }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = ListWorkspacesParams { repo_id: "org/repo".to_string() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: ListWorkspacesParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.repo_id, "org/repo");
    }
}
