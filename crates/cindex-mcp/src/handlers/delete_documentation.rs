//! Handler for the destructive `delete_documentation` tool (spec §6, §7).
//!
//! There is no dedicated delete method on the store; `replace_documentation_chunks`
//! already promises to atomically replace a `doc_set`'s chunks, so deleting
//! is just replacing with an empty set.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct DeleteDocumentationParams {
    pub doc_sets: Vec<String>,
    pub confirm: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeleteDocumentationResponse {
    pub deleted: Vec<String>,
}

impl IntoContents for DeleteDocumentationResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize DeleteDocumentationResponse")]
    }
}

pub async fn delete_documentation_handler(
    state: &AppState,
    params: &DeleteDocumentationParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    warn!(
        target = "handler",
        event = "incoming_request",
        tool = "delete_documentation",
        doc_sets = ?params.doc_sets,
        destructive = true
    );

    if params.doc_sets.is_empty() {
        return Err(validation_err("doc_sets must not be empty"));
    }
    if !params.confirm {
        return Err(validation_err("confirm must be true to delete documentation"));
    }

    let mut deleted = Vec::with_capacity(params.doc_sets.len());
    for doc_set in &params.doc_sets {
        state.store.replace_documentation_chunks(doc_set, Vec::new()).await.map_err(|e| {
            error!(target = "handler", event = "delete_error", tool = "delete_documentation", doc_set = %doc_set, error = %e);
            domain_err(e, "delete_documentation")
        })?;
        deleted.push(doc_set.clone());
    }

    info!(target = "handler", event = "delete_ok", tool = "delete_documentation", deleted_count = deleted.len());
    DeleteDocumentationResponse { deleted }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = DeleteDocumentationParams { doc_sets: vec!["guides".to_string()], confirm: true };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: DeleteDocumentationParams = serde_json::from_str(&json).expect("deserialize");
        assert!(back.confirm);
    }
}
