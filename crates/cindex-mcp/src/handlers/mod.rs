//! Tool router: one wrapper per MCP tool (spec §6), each delegating to its
//! handler module. Resource enumeration exposes each tool's input schema,
//! generated at call time from the `Params` type rather than a static file.

pub mod delete_documentation;
pub mod delete_repository;
pub mod find_cross_service_calls;
pub mod find_cross_workspace_usages;
pub mod find_symbol_definition;
pub mod get_file_context;
pub mod get_service_context;
pub mod get_workspace_context;
pub mod index_documentation;
pub mod index_repository;
pub mod list_documentation;
pub mod list_indexed_repos;
pub mod list_services;
pub mod list_workspaces;
pub mod search_api_contracts;
pub mod search_codebase;
pub mod search_documentation;

// Internal dependencies
use crate::state::AppState;

// External dependencies
use agenterra_rmcp::{
    handler::server::tool::Parameters, model::*, service::*, tool, Error as McpError,
    ServerHandler,
};
use log::debug;

#[derive(Clone)]
pub struct McpServer {
    tool_router: agenterra_rmcp::handler::server::router::tool::ToolRouter<McpServer>,
    state: AppState,
}

impl McpServer {
    /// Create a new MCP server instance wired to `state`.
    pub fn new(state: AppState) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }
}

/// One schema resource per tool, named `schema://<tool_name>`.
const SCHEMA_TOOLS: &[&str] = &[
    "search_codebase",
    "search_documentation",
    "search_api_contracts",
    "find_symbol_definition",
    "get_file_context",
    "get_workspace_context",
    "get_service_context",
    "index_repository",
    "index_documentation",
    "list_indexed_repos",
    "list_workspaces",
    "list_services",
    "list_documentation",
    "find_cross_workspace_usages",
    "find_cross_service_calls",
    "delete_repository",
    "delete_documentation",
];

#[agenterra_rmcp::tool_router]
impl McpServer {
    #[tool(description = "Returns MCP server status for Inspector/health validation")]
    pub async fn ping(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text("The MCP server is alive!")]))
    }

    #[tool(description = "Primary semantic search over indexed code (9-stage retrieval pipeline). Searches file summaries first, then chunks within the best-matching files, expanding with symbol resolution, import-chain context, and API enrichment. Scope defaults to every non-reference, non-documentation repo; pass repo_ids/service_ids/start_repo to narrow it, or scope=\"reference\" to search reference/documentation repos specifically.")]
    pub async fn search_codebase(
        &self,
        Parameters(params): Parameters<search_codebase::SearchCodebaseParams>,
    ) -> Result<CallToolResult, McpError> {
        search_codebase::search_codebase_handler(&self.state, &params).await
    }

    #[tool(description = "Search indexed markdown documentation by meaning. Restrict to one or more doc_sets, or search across all indexed documentation.")]
    pub async fn search_documentation(
        &self,
        Parameters(params): Parameters<search_documentation::SearchDocumentationParams>,
    ) -> Result<CallToolResult, McpError> {
        search_documentation::search_documentation_handler(&self.state, &params).await
    }

    #[tool(description = "Semantic search over indexed API endpoints (REST/GraphQL/gRPC/WebSocket contracts), returning the endpoint plus its implementation link when known.")]
    pub async fn search_api_contracts(
        &self,
        Parameters(params): Parameters<search_api_contracts::SearchApiContractsParams>,
    ) -> Result<CallToolResult, McpError> {
        search_api_contracts::search_api_contracts_handler(&self.state, &params).await
    }

    #[tool(description = "Locate all definitions of a symbol by name within a repository, ordered by (name, file_path). Each result carries its kind, file, line, and export scope.")]
    pub async fn find_symbol_definition(
        &self,
        Parameters(params): Parameters<find_symbol_definition::FindSymbolDefinitionParams>,
    ) -> Result<CallToolResult, McpError> {
        find_symbol_definition::find_symbol_definition_handler(&self.state, &params).await
    }

    #[tool(description = "Fetch a file's indexed summary plus the symbols it exports, for understanding a file in context without re-reading it from disk.")]
    pub async fn get_file_context(
        &self,
        Parameters(params): Parameters<get_file_context::GetFileContextParams>,
    ) -> Result<CallToolResult, McpError> {
        get_file_context::get_file_context_handler(&self.state, &params).await
    }

    #[tool(description = "Fetch a monorepo workspace's metadata (dependencies, dev dependencies, path) plus the cross-repo dependency edges reachable from its repository.")]
    pub async fn get_workspace_context(
        &self,
        Parameters(params): Parameters<get_workspace_context::GetWorkspaceContextParams>,
    ) -> Result<CallToolResult, McpError> {
        get_workspace_context::get_workspace_context_handler(&self.state, &params).await
    }

    #[tool(description = "Fetch a microservice's metadata (its files) plus the API endpoints it exposes, approximately ranked when no query is given.")]
    pub async fn get_service_context(
        &self,
        Parameters(params): Parameters<get_service_context::GetServiceContextParams>,
    ) -> Result<CallToolResult, McpError> {
        get_service_context::get_service_context_handler(&self.state, &params).await
    }

    #[tool(description = "Index or re-index a repository from its root path, emitting structured progress notifications as it runs. Unchanged files are skipped unless force_reindex is set.")]
    pub async fn index_repository(
        &self,
        Parameters(params): Parameters<index_repository::IndexRepositoryParams>,
    ) -> Result<CallToolResult, McpError> {
        index_repository::index_repository_handler(&self.state, &params).await
    }

    #[tool(description = "Index a collection of markdown files under a doc_set name: headings become heading-scoped, embedded documentation chunks.")]
    pub async fn index_documentation(
        &self,
        Parameters(params): Parameters<index_documentation::IndexDocumentationParams>,
    ) -> Result<CallToolResult, McpError> {
        index_documentation::index_documentation_handler(&self.state, &params).await
    }

    #[tool(description = "Enumerate indexed repositories, optionally restricted to a repo_ids subset.")]
    pub async fn list_indexed_repos(
        &self,
        Parameters(params): Parameters<list_indexed_repos::ListIndexedReposParams>,
    ) -> Result<CallToolResult, McpError> {
        list_indexed_repos::list_indexed_repos_handler(&self.state, &params).await
    }

    #[tool(description = "Enumerate the monorepo workspaces detected within a repository.")]
    pub async fn list_workspaces(
        &self,
        Parameters(params): Parameters<list_workspaces::ListWorkspacesParams>,
    ) -> Result<CallToolResult, McpError> {
        list_workspaces::list_workspaces_handler(&self.state, &params).await
    }

    #[tool(description = "Enumerate the microservices detected within a repository.")]
    pub async fn list_services(
        &self,
        Parameters(params): Parameters<list_services::ListServicesParams>,
    ) -> Result<CallToolResult, McpError> {
        list_services::list_services_handler(&self.state, &params).await
    }

    #[tool(description = "Enumerate indexed documentation sets, optionally restricted and matched against a query.")]
    pub async fn list_documentation(
        &self,
        Parameters(params): Parameters<list_documentation::ListDocumentationParams>,
    ) -> Result<CallToolResult, McpError> {
        list_documentation::list_documentation_handler(&self.state, &params).await
    }

    #[tool(description = "Trace usages of a symbol outside the workspace that defines it, approximating cross-workspace package imports within a monorepo.")]
    pub async fn find_cross_workspace_usages(
        &self,
        Parameters(params): Parameters<find_cross_workspace_usages::FindCrossWorkspaceUsagesParams>,
    ) -> Result<CallToolResult, McpError> {
        find_cross_workspace_usages::find_cross_workspace_usages_handler(&self.state, &params).await
    }

    #[tool(description = "Trace inter-service calls: outbound HTTP/gRPC call sites detected in a service's chunks, matched against known API endpoints.")]
    pub async fn find_cross_service_calls(
        &self,
        Parameters(params): Parameters<find_cross_service_calls::FindCrossServiceCallsParams>,
    ) -> Result<CallToolResult, McpError> {
        find_cross_service_calls::find_cross_service_calls_handler(&self.state, &params).await
    }

    #[tool(description = "Destructive: permanently remove a repository and every row that references it (files, chunks, symbols, workspaces, services, endpoints, dependency edges). Requires confirm=true.")]
    pub async fn delete_repository(
        &self,
        Parameters(params): Parameters<delete_repository::DeleteRepositoryParams>,
    ) -> Result<CallToolResult, McpError> {
        delete_repository::delete_repository_handler(&self.state, &params).await
    }

    #[tool(description = "Destructive: permanently remove one or more documentation sets. Requires confirm=true.")]
    pub async fn delete_documentation(
        &self,
        Parameters(params): Parameters<delete_documentation::DeleteDocumentationParams>,
    ) -> Result<CallToolResult, McpError> {
        delete_documentation::delete_documentation_handler(&self.state, &params).await
    }
}

#[agenterra_rmcp::tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        debug!("[MCP] get_info() called");

        let tools_capability = ToolsCapability { list_changed: Some(true) };
        let resources_capability = ResourcesCapability { list_changed: Some(true), ..ResourcesCapability::default() };

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                experimental: None,
                logging: None,
                completions: None,
                prompts: None,
                resources: Some(resources_capability),
                tools: Some(tools_capability),
            },
            server_info: Implementation::from_build_env(),
            instructions: None,
        }
    }

    /// Enumerates one `schema://<tool_name>` resource per tool.
    fn list_resources(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        use agenterra_rmcp::model::{Annotated, RawResource};
        let resources = SCHEMA_TOOLS
            .iter()
            .map(|name| Annotated {
                raw: RawResource {
                    uri: format!("schema://{name}"),
                    name: (*name).to_string(),
                    description: Some(format!("JSON schema for the `{name}` tool's input parameters")),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                },
                annotations: Default::default(),
            })
            .collect();
        std::future::ready(Ok(ListResourcesResult { resources, next_cursor: None }))
    }

    /// Generates each tool's JSON Schema from its `Params` type at request
    /// time via `schemars::schema_for!`, rather than shipping static assets.
    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        use agenterra_rmcp::model::{ReadResourceResult, ResourceContents};
        let uri = request.uri;
        let result = (|| {
            let name = uri.strip_prefix("schema://").ok_or_else(|| {
                McpError::resource_not_found(format!("Unknown resource URI: {uri}"), None)
            })?;
            let schema = match name {
                "search_codebase" => schemars::schema_for!(search_codebase::SearchCodebaseParams),
                "search_documentation" => schemars::schema_for!(search_documentation::SearchDocumentationParams),
                "search_api_contracts" => schemars::schema_for!(search_api_contracts::SearchApiContractsParams),
                "find_symbol_definition" => schemars::schema_for!(find_symbol_definition::FindSymbolDefinitionParams),
                "get_file_context" => schemars::schema_for!(get_file_context::GetFileContextParams),
                "get_workspace_context" => schemars::schema_for!(get_workspace_context::GetWorkspaceContextParams),
                "get_service_context" => schemars::schema_for!(get_service_context::GetServiceContextParams),
                "index_repository" => schemars::schema_for!(index_repository::IndexRepositoryParams),
                "index_documentation" => schemars::schema_for!(index_documentation::IndexDocumentationParams),
                "list_indexed_repos" => schemars::schema_for!(list_indexed_repos::ListIndexedReposParams),
                "list_workspaces" => schemars::schema_for!(list_workspaces::ListWorkspacesParams),
                "list_services" => schemars::schema_for!(list_services::ListServicesParams),
                "list_documentation" => schemars::schema_for!(list_documentation::ListDocumentationParams),
                "find_cross_workspace_usages" => {
                    schemars::schema_for!(find_cross_workspace_usages::FindCrossWorkspaceUsagesParams)
                }
                "find_cross_service_calls" => schemars::schema_for!(find_cross_service_calls::FindCrossServiceCallsParams),
                "delete_repository" => schemars::schema_for!(delete_repository::DeleteRepositoryParams),
                "delete_documentation" => schemars::schema_for!(delete_documentation::DeleteDocumentationParams),
                other => {
                    return Err(McpError::resource_not_found(format!("Schema not found for tool '{other}'"), None));
                }
            };
            let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());
            let resource = ResourceContents::text(schema_json, uri.clone());
            Ok(ReadResourceResult { contents: vec![resource] })
        })();
        std::future::ready(result)
    }
}
