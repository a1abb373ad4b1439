//! Handler for the `search_codebase` tool (spec §6): drives the full
//! nine-stage retrieval pipeline and returns the assembled context.

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::RepoKind;
use cindex_retrieval::{BoundaryConfig, RetrievalRequest, ScopeConfig, ScopeMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Parameters for `search_codebase`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct SearchCodebaseParams {
    /// Natural-language or keyword query.
    pub query: String,
    /// Restrict to these repositories.
    pub repo_ids: Option<Vec<String>>,
    /// Restrict to repositories that host any of these services.
    pub service_ids: Option<Vec<String>>,
    /// Start a boundary-aware walk from this repository.
    pub start_repo: Option<String>,
    /// Max hop count for the boundary-aware walk (default from config).
    pub max_depth: Option<u32>,
    /// Whether the boundary-aware walk follows cross-repo dependency edges.
    pub follow_dependencies: Option<bool>,
    /// When `true` (and no other scope selector is set), search only
    /// `reference`/`documentation`-kind repos instead of the default global
    /// scope (which excludes them).
    pub include_references: Option<bool>,
    pub exclude_repos: Option<Vec<String>>,
    pub exclude_services: Option<Vec<String>>,
    pub exclude_workspaces: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchCodebaseResponse {
    pub context: cindex_retrieval::context::AssembledContext,
}

impl IntoContents for SearchCodebaseResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize SearchCodebaseResponse")]
    }
}

pub async fn search_codebase_handler(
    state: &AppState,
    params: &SearchCodebaseParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(target = "handler", event = "incoming_request", tool = "search_codebase", query = %params.query);

    if params.query.trim().is_empty() {
        return Err(validation_err("query must not be empty"));
    }

    let mode = if let Some(repo_ids) = params.repo_ids.clone().filter(|v| !v.is_empty()) {
        Some(ScopeMode::Repository { repo_ids })
    } else if let Some(service_ids) = params.service_ids.clone().filter(|v| !v.is_empty()) {
        Some(ScopeMode::Service { service_ids })
    } else if let Some(start_repo) = params.start_repo.clone().filter(|s| !s.is_empty()) {
        Some(ScopeMode::BoundaryAware {
            start_repo,
            boundary: BoundaryConfig {
                follow_dependencies: params.follow_dependencies.unwrap_or(true),
                max_depth: params.max_depth.unwrap_or(2),
            },
        })
    } else if params.include_references.unwrap_or(false) {
        let repos = state.store.list_repositories(None).await.map_err(|e| domain_err(e, "search_codebase:list_repositories"))?;
        let repo_ids: Vec<String> = repos
            .into_iter()
            .filter(|r| matches!(r.kind.0, RepoKind::Reference | RepoKind::Documentation))
            .map(|r| r.repo_id)
            .collect();
        Some(ScopeMode::Repository { repo_ids })
    } else {
        None
    };

    let scope = ScopeConfig {
        mode,
        exclude_repos: params.exclude_repos.clone().unwrap_or_default(),
        exclude_services: params.exclude_services.clone().unwrap_or_default(),
        exclude_workspaces: params.exclude_workspaces.clone().unwrap_or_default(),
    };

    let request = RetrievalRequest { query: params.query.clone(), scope };
    debug!(target = "handler", event = "before_retrieve", tool = "search_codebase");

    let context = state.retrieval.retrieve(&request).await;

    match &context {
        Ok(c) => info!(
            target = "handler",
            event = "retrieve_ok",
            tool = "search_codebase",
            total_tokens = c.total_tokens,
            primary_code = c.chunks.primary_code.len(),
        ),
        Err(e) => error!(target = "handler", event = "retrieve_error", tool = "search_codebase", error = %e),
    }

    let context = context.map_err(|e| domain_err(e, "search_codebase"))?;
    SearchCodebaseResponse { context }.into_call_tool_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = SearchCodebaseParams { query: "auth".to_string(), ..Default::default() };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: SearchCodebaseParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.query, "auth");
    }

    #[test]
    fn rejects_blank_query_is_caller_responsibility_not_deserialization() {
        let params = SearchCodebaseParams { query: "   ".to_string(), ..Default::default() };
        assert!(params.query.trim().is_empty());
    }
}
