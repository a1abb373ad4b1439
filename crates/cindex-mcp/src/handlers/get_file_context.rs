//! Handler for the `get_file_context` tool (spec §6): returns a file's
//! indexed summary chunk plus the symbols it defines.
//!
//! The store only exposes symbol lookup by name (`resolve_symbol`), not by
//! file, so this handler resolves each name the file's summary chunk
//! records as a function/class and keeps only the matches whose
//! `file_path` is this file.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::{Chunk, Symbol};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetFileContextParams {
    pub repo_id: String,
    pub file_path: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct GetFileContextResponse {
    pub summary: Option<Chunk>,
    pub symbols: Vec<Symbol>,
}

impl IntoContents for GetFileContextResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize GetFileContextResponse")]
    }
}

pub async fn get_file_context_handler(
    state: &AppState,
    params: &GetFileContextParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "get_file_context",
        repo_id = %params.repo_id,
        file_path = %params.file_path
    );

    if params.repo_id.trim().is_empty() || params.file_path.trim().is_empty() {
        return Err(validation_err("repo_id and file_path must not be empty"));
    }

    let summaries = state
        .store
        .get_file_summaries(&params.repo_id, std::slice::from_ref(&params.file_path))
        .await
        .map_err(|e| domain_err(e, "get_file_context:get_file_summaries"))?;
    let summary = summaries.into_iter().next();

    let mut symbols = Vec::new();
    if let Some(chunk) = &summary {
        let mut names = chunk.metadata.function_names.clone();
        names.extend(chunk.metadata.class_names.clone());
        names.sort();
        names.dedup();
        for name in names {
            let matches = state.store.resolve_symbol(&params.repo_id, &name).await;
            match matches {
                Ok(found) => symbols.extend(found.into_iter().filter(|s| s.file_path == params.file_path)),
                Err(e) => error!(target = "handler", event = "resolve_error", tool = "get_file_context", symbol = %name, error = %e),
            }
        }
    }

    info!(target = "handler", event = "get_file_context_ok", tool = "get_file_context", symbol_count = symbols.len());
    GetFileContextResponse { summary, symbols }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = GetFileContextParams { repo_id: "org/repo".to_string(), file_path: "src/lib.rs".to_string() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: GetFileContextParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.file_path, "src/lib.rs");
    }
}
