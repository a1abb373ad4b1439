//! Handler for the `list_documentation` tool (spec §6).
//!
//! `search_documentation` always ranks by hybrid score; with no `query` this
//! handler passes a zero vector and empty text so the call degrades to an
//! unranked listing capped at `limit`.

use crate::common::domain_err;
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::DocumentationChunk;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ListDocumentationParams {
    pub doc_sets: Option<Vec<String>>,
    pub query: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListDocumentationResponse {
    pub chunks: Vec<DocumentationChunk>,
}

impl IntoContents for ListDocumentationResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize ListDocumentationResponse")]
    }
}

pub async fn list_documentation_handler(
    state: &AppState,
    params: &ListDocumentationParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "list_documentation");

    let limit = params.limit.unwrap_or(50);
    let (embedding, text) = match &params.query {
        Some(q) if !q.trim().is_empty() => {
            let embedding = state.embeddings.embed_query(q).await.map_err(|e| domain_err(e, "list_documentation:embed_query"))?;
            (embedding, q.clone())
        }
        _ => (vec![0.0f32; state.config.embedding.dimensions], String::new()),
    };

    let chunks = state.store.search_documentation(&embedding, &text, params.doc_sets.as_deref(), limit).await;
    if let Err(e) = &chunks {
        error!(target = "handler", event = "list_error", tool = "list_documentation", error = %e);
    }
    let chunks = chunks.map_err(|e| domain_err(e, "list_documentation"))?;

    ListDocumentationResponse { chunks }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = ListDocumentationParams { doc_sets: Some(vec!["guides".to_string()]), ..Default::default() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: ListDocumentationParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.doc_sets.unwrap(), vec!["guides".to_string()]);
    }
}
