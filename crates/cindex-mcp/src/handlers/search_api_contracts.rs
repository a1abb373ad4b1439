//! Handler for the `search_api_contracts` tool (spec §6): semantic search
//! over indexed API endpoints.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_store::ScoredEndpoint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct SearchApiContractsParams {
    pub query: String,
    pub repo_ids: Option<Vec<String>>,
    /// One of `rest`, `graphql`, `grpc`, `websocket`.
    pub api_type: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchApiContractsResponse {
    pub endpoints: Vec<ScoredEndpoint>,
}

impl IntoContents for SearchApiContractsResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize SearchApiContractsResponse")]
    }
}

pub async fn search_api_contracts_handler(
    state: &AppState,
    params: &SearchApiContractsParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "search_api_contracts", query = %params.query);

    if params.query.trim().is_empty() {
        return Err(validation_err("query must not be empty"));
    }

    let embedding = state.embeddings.embed_query(&params.query).await.map_err(|e| domain_err(e, "search_api_contracts:embed_query"))?;
    let limit = params.limit.unwrap_or(20);

    let endpoints = state
        .store
        .search_api_endpoints(&embedding, params.repo_ids.as_deref(), params.api_type.as_deref(), limit)
        .await;

    if let Err(e) = &endpoints {
        error!(target = "handler", event = "search_error", tool = "search_api_contracts", error = %e);
    }
    let endpoints = endpoints.map_err(|e| domain_err(e, "search_api_contracts"))?;
    info!(target = "handler", event = "search_ok", tool = "search_api_contracts", result_count = endpoints.len());

    SearchApiContractsResponse { endpoints }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = SearchApiContractsParams { query: "list users".to_string(), ..Default::default() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: SearchApiContractsParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.query, "list users");
    }
}
