//! Handler for the `search_documentation` tool (spec §6): hybrid search over
//! indexed markdown documentation chunks.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::DocumentationChunk;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct SearchDocumentationParams {
    pub query: String,
    /// Restrict to these doc sets.
    pub doc_sets: Option<Vec<String>>,
    /// Maximum number of chunks to return (default 20).
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchDocumentationResponse {
    pub chunks: Vec<DocumentationChunk>,
}

impl IntoContents for SearchDocumentationResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize SearchDocumentationResponse")]
    }
}

pub async fn search_documentation_handler(
    state: &AppState,
    params: &SearchDocumentationParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "search_documentation", query = %params.query);

    if params.query.trim().is_empty() {
        return Err(validation_err("query must not be empty"));
    }

    let embedding = state.embeddings.embed_query(&params.query).await.map_err(|e| domain_err(e, "search_documentation:embed_query"))?;
    let limit = params.limit.unwrap_or(20);

    let chunks = state
        .store
        .search_documentation(&embedding, &params.query, params.doc_sets.as_deref(), limit)
        .await;

    if let Err(e) = &chunks {
        error!(target = "handler", event = "search_error", tool = "search_documentation", error = %e);
    }
    let chunks = chunks.map_err(|e| domain_err(e, "search_documentation"))?;
    info!(target = "handler", event = "search_ok", tool = "search_documentation", result_count = chunks.len());

    SearchDocumentationResponse { chunks }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = SearchDocumentationParams { query: "getting started".to_string(), ..Default::default() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: SearchDocumentationParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.query, "getting started");
    }
}
