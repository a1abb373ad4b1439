//! Handler for the `list_services` tool (spec §6).

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::Service;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ListServicesParams {
    pub repo_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListServicesResponse {
    pub services: Vec<Service>,
}

impl IntoContents for ListServicesResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize ListServicesResponse")]
    }
}

pub async fn list_services_handler(
    state: &AppState,
    params: &ListServicesParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "list_services", repo_id = %params.repo_id);

    if params.repo_id.trim().is_empty() {
        return Err(validation_err("repo_id must not be empty"));
    }

    let services = state.store.list_services(&params.repo_id).await;
    if let Err(e) = &services {
        error!(target = "handler", event = "list_error", tool = "list_services", error = %e);
    }
    let services = services.map_err(|e| domain_err(e, "list_services"))?;

    ListServicesResponse { services }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = ListServicesParams { repo_id: "org/repo".to_string() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: ListServicesParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.repo_id, "org/repo");
    }
}
