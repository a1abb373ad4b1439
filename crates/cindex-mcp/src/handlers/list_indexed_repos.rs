//! Handler for the `list_indexed_repos` tool (spec §6).

use crate::common::domain_err;
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::Repository;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ListIndexedReposParams {
    pub repo_ids: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListIndexedReposResponse {
    pub repositories: Vec<Repository>,
}

impl IntoContents for ListIndexedReposResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize ListIndexedReposResponse")]
    }
}

pub async fn list_indexed_repos_handler(
    state: &AppState,
    params: &ListIndexedReposParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "list_indexed_repos");

    let repositories = state.store.list_repositories(params.repo_ids.as_deref()).await;
    if let Err(e) = &repositories {
        error!(target = "handler", event = "list_error", tool = "list_indexed_repos", error = %e);
    }
    let repositories = repositories.map_err(|e| domain_err(e, "list_indexed_repos"))?;

    ListIndexedReposResponse { repositories }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = ListIndexedReposParams { repo_ids: Some(vec!["org/repo".to_string()]) };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: ListIndexedReposParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.repo_ids.unwrap().len(), 1);
    }
}
