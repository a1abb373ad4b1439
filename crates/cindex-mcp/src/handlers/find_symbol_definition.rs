//! Handler for the `find_symbol_definition` tool (spec §6, §4.10).

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::Symbol;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct FindSymbolDefinitionParams {
    pub repo_id: String,
    pub symbol_name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FindSymbolDefinitionResponse {
    pub matches: Vec<Symbol>,
}

impl IntoContents for FindSymbolDefinitionResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize FindSymbolDefinitionResponse")]
    }
}

pub async fn find_symbol_definition_handler(
    state: &AppState,
    params: &FindSymbolDefinitionParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "find_symbol_definition",
        repo_id = %params.repo_id,
        symbol_name = %params.symbol_name
    );

    if params.repo_id.trim().is_empty() || params.symbol_name.trim().is_empty() {
        return Err(validation_err("repo_id and symbol_name must not be empty"));
    }

    let matches = state.store.resolve_symbol(&params.repo_id, &params.symbol_name).await;
    if let Err(e) = &matches {
        error!(target = "handler", event = "resolve_error", tool = "find_symbol_definition", error = %e);
    }
    let matches = matches.map_err(|e| domain_err(e, "find_symbol_definition"))?;
    info!(target = "handler", event = "resolve_ok", tool = "find_symbol_definition", result_count = matches.len());

    FindSymbolDefinitionResponse { matches }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = FindSymbolDefinitionParams { repo_id: "org/repo".to_string(), symbol_name: "parse".to_string() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: FindSymbolDefinitionParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.symbol_name, "parse");
    }
}
