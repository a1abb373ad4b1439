//! Handler for the `find_cross_service_calls` tool (spec §6, §4.12): traces
//! outbound call sites detected in a service's own chunks against known API
//! endpoints, reusing the retrieval pipeline's API enrichment stage.

use std::collections::HashSet;

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_retrieval::api::{self, ApiEnrichment};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct FindCrossServiceCallsParams {
    pub repo_id: String,
    pub service_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FindCrossServiceCallsResponse {
    pub enrichment: ApiEnrichment,
}

impl IntoContents for FindCrossServiceCallsResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize FindCrossServiceCallsResponse")]
    }
}

pub async fn find_cross_service_calls_handler(
    state: &AppState,
    params: &FindCrossServiceCallsParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "find_cross_service_calls",
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
        .map_err(|e| domain_err(e, "find_cross_service_calls:list_services"))?;
    let Some(service) = services.into_iter().find(|s| s.service_id == params.service_id) else {
        return Err(validation_err(format!("no service '{}' in repo '{}'", params.service_id, params.repo_id)));
    };

    let zero_vector = vec![0.0f32; state.config.embedding.dimensions];
    let repo_ids = [params.repo_id.clone()];
    let scored = state
        .store
        .search_chunks(&zero_vector, "", Some(&repo_ids), 1.0, 0.0, 500)
        .await
        .map_err(|e| domain_err(e, "find_cross_service_calls:search_chunks"))?;

    let service_files: HashSet<&str> = service.files.iter().map(String::as_str).collect();
    let chunks: Vec<_> = scored.into_iter().filter(|c| service_files.contains(c.chunk.file_path.as_str())).map(|c| c.chunk).collect();
    let chunk_refs: Vec<&cindex_core::Chunk> = chunks.iter().collect();
    let retrieved_chunk_ids: HashSet<uuid::Uuid> = chunks.iter().map(|c| c.chunk_id).collect();

    let enrichment = api::enrich_api_context(
        &state.store,
        &repo_ids,
        Some(&zero_vector),
        &chunk_refs,
        &retrieved_chunk_ids,
        state.config.retrieval.api_endpoint_similarity_threshold,
        state.config.retrieval.api_endpoint_cap,
    )
    .await;

    if let Err(e) = &enrichment {
        error!(target = "handler", event = "enrich_error", tool = "find_cross_service_calls", error = %e);
    }
    let enrichment = enrichment.map_err(|e| domain_err(e, "find_cross_service_calls"))?;

    info!(
        target = "handler",
        event = "find_ok",
        tool = "find_cross_service_calls",
        outbound_calls = enrichment.outbound_calls.len()
    );
    FindCrossServiceCallsResponse { enrichment }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = FindCrossServiceCallsParams { repo_id: "org/repo".to_string(), service_id: "billing".to_string() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: FindCrossServiceCallsParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.service_id, "billing");
    }
}
