//! Handler for the `get_service_context` tool (spec §6): a service's
//! metadata plus the API endpoints it exposes.
//!
//! `search_api_endpoints` always ranks by vector similarity; with no query
//! to embed, this handler passes a zero vector so cosine similarity is
//! uniform and the call degrades to an unranked listing capped at `limit`.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::Service;
use cindex_store::ScoredEndpoint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetServiceContextParams {
    pub repo_id: String,
    pub service_id: String,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GetServiceContextResponse {
    pub service: Option<Service>,
    pub endpoints: Vec<ScoredEndpoint>,
}

impl IntoContents for GetServiceContextResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize GetServiceContextResponse")]
    }
}

pub async fn get_service_context_handler(
    state: &AppState,
    params: &GetServiceContextParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "get_service_context",
        repo_id = %params.repo_id,
        service_id = %params.service_id
    );

    if params.repo_id.trim().is_empty() || params.service_id.trim().is_empty() {
        return Err(validation_err("repo_id and service_id must not be empty"));
    }

    let services = state
        .store
        .list_services(&params.repo_id)
        .await
        .map_err(|e| domain_err(e, "get_service_context:list_services"))?;
    let service = services.into_iter().find(|s| s.service_id == params.service_id);

    let zero_vector = vec![0.0f32; state.config.embedding.dimensions];
    let limit = params.limit.unwrap_or(100);
    let repo_ids = [params.repo_id.clone()];
    let endpoints = state.store.search_api_endpoints(&zero_vector, Some(&repo_ids), None, limit).await;
    if let Err(e) = &endpoints {
        error!(target = "handler", event = "endpoints_error", tool = "get_service_context", error = %e);
    }
    let endpoints = endpoints.map_err(|e| domain_err(e, "get_service_context:search_api_endpoints"))?;
    let endpoints = endpoints.into_iter().filter(|e| e.endpoint.service_id == params.service_id).collect();

    GetServiceContextResponse { service, endpoints }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = GetServiceContextParams { repo_id: "org/repo".to_string(), service_id: "api-gateway".to_string(), limit: None };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: GetServiceContextParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.service_id, "api-gateway");
    }
}
