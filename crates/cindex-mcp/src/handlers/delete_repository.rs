//! Handler for the destructive `delete_repository` tool (spec §6, §7
//! "destructive tools demand an explicit confirmation flag").

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct DeleteRepositoryParams {
    pub repo_ids: Vec<String>,
    /// Must be `true`; this call removes every row referencing these repos.
    pub confirm: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeleteRepositoryResponse {
    pub deleted: Vec<String>,
}

impl IntoContents for DeleteRepositoryResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize DeleteRepositoryResponse")]
    }
}

pub async fn delete_repository_handler(
    state: &AppState,
    params: &DeleteRepositoryParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    warn!(
        target = "handler",
        event = "incoming_request",
        tool = "delete_repository",
        repo_ids = ?params.repo_ids,
        destructive = true
    );

    if params.repo_ids.is_empty() {
        return Err(validation_err("repo_ids must not be empty"));
    }
    if !params.confirm {
        return Err(validation_err("confirm must be true to delete a repository"));
    }

    let mut deleted = Vec::with_capacity(params.repo_ids.len());
    for repo_id in &params.repo_ids {
        state.store.delete_repository(repo_id).await.map_err(|e| {
            error!(target = "handler", event = "delete_error", tool = "delete_repository", repo_id = %repo_id, error = %e);
            domain_err(e, "delete_repository")
        })?;
        deleted.push(repo_id.clone());
    }

    info!(target = "handler", event = "delete_ok", tool = "delete_repository", deleted_count = deleted.len());
    DeleteRepositoryResponse { deleted }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = DeleteRepositoryParams { repo_ids: vec!["org/repo".to_string()], confirm: true };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: DeleteRepositoryParams = serde_json::from_str(&json).expect("deserialize");
        assert!(back.confirm);
    }
}
