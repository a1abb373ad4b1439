//! `PostgreSQL` implementation of [`StoreRepository`], backed by `pgvector`
//! for similarity search and generated `tsvector` columns for full-text rank.

use async_trait::async_trait;
use cindex_common::CorrelationId;
use cindex_core::{
    ApiEndpoint, ApiImplementation, ApiType, Chunk, ChunkType, CrossRepoDependency,
    DocumentationChunk, File, RepoKind, Repository, Service, ServiceKind, Symbol, SymbolKind,
    SymbolScope, Workspace,
};
use pgvector::Vector;
use sqlx::Row;
use uuid::Uuid;

use crate::error::{StoreResult, map_db_err};
use crate::pool_manager::PoolManager;
use crate::traits::{IndexStats, ScoredChunk, ScoredEndpoint, StoreRepository};

/// `StoreRepository` backed by the pooled `PostgreSQL` connection set.
pub struct PgStoreRepository {
    pools: PoolManager,
}

impl PgStoreRepository {
    #[must_use]
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

fn chunk_type_str(kind: ChunkType) -> &'static str {
    match kind {
        ChunkType::FileSummary => "file_summary",
        ChunkType::Function => "function",
        ChunkType::Class => "class",
        ChunkType::Method => "method",
        ChunkType::Interface => "interface",
        ChunkType::Section => "section",
        ChunkType::CodeBlock => "code_block",
    }
}

fn chunk_type_from_str(value: &str) -> ChunkType {
    match value {
        "file_summary" => ChunkType::FileSummary,
        "function" => ChunkType::Function,
        "class" => ChunkType::Class,
        "method" => ChunkType::Method,
        "interface" => ChunkType::Interface,
        "code_block" => ChunkType::CodeBlock,
        _ => ChunkType::Section,
    }
}

fn repo_kind_str(kind: RepoKind) -> &'static str {
    match kind {
        RepoKind::Monolithic => "monolithic",
        RepoKind::Monorepo => "monorepo",
        RepoKind::Microservice => "microservice",
        RepoKind::Library => "library",
        RepoKind::Reference => "reference",
        RepoKind::Documentation => "documentation",
    }
}

fn symbol_kind_str(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Function => "function",
        SymbolKind::Class => "class",
        SymbolKind::Variable => "variable",
        SymbolKind::Interface => "interface",
        SymbolKind::Type => "type",
        SymbolKind::Constant => "constant",
        SymbolKind::Method => "method",
    }
}

fn symbol_kind_from_str(value: &str) -> SymbolKind {
    match value {
        "class" => SymbolKind::Class,
        "variable" => SymbolKind::Variable,
        "interface" => SymbolKind::Interface,
        "type" => SymbolKind::Type,
        "constant" => SymbolKind::Constant,
        "method" => SymbolKind::Method,
        _ => SymbolKind::Function,
    }
}

fn symbol_scope_str(scope: SymbolScope) -> &'static str {
    match scope {
        SymbolScope::Exported => "exported",
        SymbolScope::Internal => "internal",
    }
}

fn service_kind_str(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Docker => "docker",
        ServiceKind::Serverless => "serverless",
        ServiceKind::Mobile => "mobile",
        ServiceKind::Library => "library",
        ServiceKind::Other => "other",
    }
}

fn service_kind_from_str(value: &str) -> ServiceKind {
    match value {
        "docker" => ServiceKind::Docker,
        "serverless" => ServiceKind::Serverless,
        "mobile" => ServiceKind::Mobile,
        "library" => ServiceKind::Library,
        _ => ServiceKind::Other,
    }
}

fn api_type_str(kind: ApiType) -> &'static str {
    match kind {
        ApiType::Rest => "rest",
        ApiType::GraphQl => "graphql",
        ApiType::Grpc => "grpc",
        ApiType::WebSocket => "websocket",
    }
}

fn api_type_from_str(value: &str) -> ApiType {
    match value {
        "graphql" => ApiType::GraphQl,
        "grpc" => ApiType::Grpc,
        "websocket" => ApiType::WebSocket,
        _ => ApiType::Rest,
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn upsert_repository(&self, repo: &Repository) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        sqlx::query(
            "INSERT INTO repositories (repo_id, name, kind, version, upstream_url, workspace_config, indexed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (repo_id) DO UPDATE SET
                 name = EXCLUDED.name,
                 kind = EXCLUDED.kind,
                 version = EXCLUDED.version,
                 upstream_url = EXCLUDED.upstream_url,
                 workspace_config = EXCLUDED.workspace_config,
                 indexed_at = EXCLUDED.indexed_at",
        )
        .bind(&repo.repo_id)
        .bind(&repo.name)
        .bind(repo_kind_str(repo.kind.0))
        .bind(&repo.version)
        .bind(&repo.upstream_url)
        .bind(&repo.workspace_config)
        .bind(repo.indexed_at)
        .execute(self.pools.write_pool())
        .await
        .map_err(map_db_err("upsert_repository", correlation_id))?;
        Ok(())
    }

    async fn get_repository(&self, repo_id: &str) -> StoreResult<Option<Repository>> {
        let correlation_id = CorrelationId::new();
        let row = sqlx::query_as::<_, Repository>(
            "SELECT repo_id, name, kind, version, upstream_url, workspace_config, indexed_at
             FROM repositories WHERE repo_id = $1",
        )
        .bind(repo_id)
        .fetch_optional(self.pools.read_pool())
        .await
        .map_err(map_db_err("get_repository", correlation_id))?;
        Ok(row)
    }

    async fn list_repositories(&self, repo_ids: Option<&[String]>) -> StoreResult<Vec<Repository>> {
        let correlation_id = CorrelationId::new();
        let rows = match repo_ids {
            Some(ids) => sqlx::query_as::<_, Repository>(
                "SELECT repo_id, name, kind, version, upstream_url, workspace_config, indexed_at
                 FROM repositories WHERE repo_id = ANY($1) ORDER BY repo_id",
            )
            .bind(ids)
            .fetch_all(self.pools.read_pool())
            .await,
            None => sqlx::query_as::<_, Repository>(
                "SELECT repo_id, name, kind, version, upstream_url, workspace_config, indexed_at
                 FROM repositories ORDER BY repo_id",
            )
            .fetch_all(self.pools.read_pool())
            .await,
        };
        rows.map_err(map_db_err("list_repositories", correlation_id))
    }

    async fn get_file_content_hash(
        &self,
        repo_id: &str,
        file_path: &str,
    ) -> StoreResult<Option<String>> {
        let correlation_id = CorrelationId::new();
        let row = sqlx::query("SELECT content_hash FROM files WHERE repo_id = $1 AND file_path = $2")
            .bind(repo_id)
            .bind(file_path)
            .fetch_optional(self.pools.read_pool())
            .await
            .map_err(map_db_err("get_file_content_hash", correlation_id))?;
        Ok(row.map(|r| r.get::<String, _>("content_hash")))
    }

    async fn upsert_file(&self, file: &File) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        let embedding = file.summary_embedding.clone().map(Vector::from);
        sqlx::query(
            "INSERT INTO files (repo_id, file_path, language, total_lines, imports, exports,
                                 summary, summary_embedding, workspace_id, service_id, package_name, content_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (repo_id, file_path) DO UPDATE SET
                 language = EXCLUDED.language,
                 total_lines = EXCLUDED.total_lines,
                 imports = EXCLUDED.imports,
                 exports = EXCLUDED.exports,
                 summary = EXCLUDED.summary,
                 summary_embedding = EXCLUDED.summary_embedding,
                 workspace_id = EXCLUDED.workspace_id,
                 service_id = EXCLUDED.service_id,
                 package_name = EXCLUDED.package_name,
                 content_hash = EXCLUDED.content_hash",
        )
        .bind(&file.repo_id)
        .bind(&file.file_path)
        .bind(&file.language)
        .bind(file.total_lines)
        .bind(&file.imports)
        .bind(&file.exports)
        .bind(&file.summary)
        .bind(embedding)
        .bind(&file.workspace_id)
        .bind(&file.service_id)
        .bind(&file.package_name)
        .bind(&file.content_hash)
        .execute(self.pools.write_pool())
        .await
        .map_err(map_db_err("upsert_file", correlation_id))?;
        Ok(())
    }

    async fn get_file(&self, repo_id: &str, file_path: &str) -> StoreResult<Option<File>> {
        let correlation_id = CorrelationId::new();
        let row = sqlx::query(
            "SELECT repo_id, file_path, language, total_lines, imports, exports, summary,
                    workspace_id, service_id, package_name, content_hash
             FROM files WHERE repo_id = $1 AND file_path = $2",
        )
        .bind(repo_id)
        .bind(file_path)
        .fetch_optional(self.pools.read_pool())
        .await
        .map_err(map_db_err("get_file", correlation_id))?;

        Ok(row.map(|row| File {
            repo_id: row.get("repo_id"),
            file_path: row.get("file_path"),
            language: row.get("language"),
            total_lines: row.get("total_lines"),
            imports: row.get("imports"),
            exports: row.get("exports"),
            summary: row.get("summary"),
            summary_embedding: None,
            workspace_id: row.get("workspace_id"),
            service_id: row.get("service_id"),
            package_name: row.get("package_name"),
            content_hash: row.get("content_hash"),
        }))
    }

    async fn replace_file_chunks(
        &self,
        repo_id: &str,
        file_path: &str,
        chunks: Vec<Chunk>,
    ) -> StoreResult<Vec<Uuid>> {
        let correlation_id = CorrelationId::new();
        let mut tx = self
            .pools
            .write_pool()
            .begin()
            .await
            .map_err(map_db_err("replace_file_chunks:begin", correlation_id))?;

        let deleted: Vec<Uuid> = sqlx::query(
            "DELETE FROM chunks WHERE repo_id = $1 AND file_path = $2 RETURNING chunk_id",
        )
        .bind(repo_id)
        .bind(file_path)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_err("replace_file_chunks:delete", correlation_id))?
        .into_iter()
        .map(|row| row.get::<Uuid, _>("chunk_id"))
        .collect();

        for chunk in &chunks {
            let embedding = chunk.embedding.clone().map(Vector::from);
            let metadata = serde_json::to_value(&chunk.metadata).unwrap_or(serde_json::Value::Null);
            sqlx::query(
                "INSERT INTO chunks (chunk_id, repo_id, file_path, chunk_type, content, start_line,
                                      end_line, token_count, metadata, embedding)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(chunk.chunk_id)
            .bind(&chunk.repo_id)
            .bind(&chunk.file_path)
            .bind(chunk_type_str(chunk.chunk_type))
            .bind(&chunk.content)
            .bind(chunk.start_line)
            .bind(chunk.end_line)
            .bind(chunk.token_count)
            .bind(metadata)
            .bind(embedding)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err("replace_file_chunks:insert", correlation_id))?;
        }

        tx.commit()
            .await
            .map_err(map_db_err("replace_file_chunks:commit", correlation_id))?;
        Ok(deleted)
    }

    async fn delete_repository(&self, repo_id: &str) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        sqlx::query("DELETE FROM repositories WHERE repo_id = $1")
            .bind(repo_id)
            .execute(self.pools.write_pool())
            .await
            .map_err(map_db_err("delete_repository", correlation_id))?;
        Ok(())
    }

    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        repo_ids: Option<&[String]>,
        vector_weight: f64,
        keyword_weight: f64,
        limit: usize,
    ) -> StoreResult<Vec<ScoredChunk>> {
        let correlation_id = CorrelationId::new();
        let vector = Vector::from(query_embedding.to_vec());
        #[allow(clippy::cast_possible_wrap)]
        let limit_i64 = limit as i64;

        let rows = sqlx::query(
            "SELECT chunk_id, repo_id, file_path, chunk_type, content, start_line, end_line,
                    token_count, metadata,
                    1 - (embedding <=> $1) AS vector_score,
                    ts_rank(content_tsv, plainto_tsquery('english', $2)) AS keyword_score
             FROM chunks
             WHERE ($3::text[] IS NULL OR repo_id = ANY($3))
               AND embedding IS NOT NULL
             ORDER BY ($4 * (1 - (embedding <=> $1)) + $5 * ts_rank(content_tsv, plainto_tsquery('english', $2))) DESC,
                      repo_id ASC, file_path ASC, chunk_id ASC
             LIMIT $6",
        )
        .bind(&vector)
        .bind(query_text)
        .bind(repo_ids)
        .bind(vector_weight)
        .bind(keyword_weight)
        .bind(limit_i64)
        .fetch_all(self.pools.analytics_pool())
        .await
        .map_err(map_db_err("search_chunks", correlation_id))?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let metadata: serde_json::Value = row.get("metadata");
            let vector_score: f64 = row.get("vector_score");
            let keyword_score: f64 = row.get("keyword_score");
            let chunk = Chunk {
                chunk_id: row.get("chunk_id"),
                repo_id: row.get("repo_id"),
                file_path: row.get("file_path"),
                chunk_type: chunk_type_from_str(row.get::<String, _>("chunk_type").as_str()),
                content: row.get("content"),
                start_line: row.get("start_line"),
                end_line: row.get("end_line"),
                token_count: row.get("token_count"),
                metadata: serde_json::from_value(metadata).unwrap_or_default(),
                embedding: None,
            };
            results.push(ScoredChunk {
                chunk,
                vector_score,
                keyword_score,
                combined_score: vector_weight * vector_score + keyword_weight * keyword_score,
            });
        }
        Ok(results)
    }

    async fn get_file_summaries(
        &self,
        repo_id: &str,
        file_paths: &[String],
    ) -> StoreResult<Vec<Chunk>> {
        let correlation_id = CorrelationId::new();
        let rows = sqlx::query(
            "SELECT chunk_id, repo_id, file_path, chunk_type, content, start_line, end_line,
                    token_count, metadata
             FROM chunks
             WHERE repo_id = $1 AND file_path = ANY($2) AND chunk_type = 'file_summary'",
        )
        .bind(repo_id)
        .bind(file_paths)
        .fetch_all(self.pools.read_pool())
        .await
        .map_err(map_db_err("get_file_summaries", correlation_id))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let metadata: serde_json::Value = row.get("metadata");
                Chunk {
                    chunk_id: row.get("chunk_id"),
                    repo_id: row.get("repo_id"),
                    file_path: row.get("file_path"),
                    chunk_type: chunk_type_from_str(row.get::<String, _>("chunk_type").as_str()),
                    content: row.get("content"),
                    start_line: row.get("start_line"),
                    end_line: row.get("end_line"),
                    token_count: row.get("token_count"),
                    metadata: serde_json::from_value(metadata).unwrap_or_default(),
                    embedding: None,
                }
            })
            .collect())
    }

    async fn resolve_symbol(&self, repo_id: &str, name: &str) -> StoreResult<Vec<Symbol>> {
        let correlation_id = CorrelationId::new();
        let rows = sqlx::query(
            "SELECT symbol_id, repo_id, name, kind, file_path, line, definition, scope,
                    workspace_id, service_id
             FROM symbols WHERE repo_id = $1 AND name = $2
             ORDER BY name ASC, file_path ASC",
        )
        .bind(repo_id)
        .bind(name)
        .fetch_all(self.pools.read_pool())
        .await
        .map_err(map_db_err("resolve_symbol", correlation_id))?;

        Ok(rows
            .into_iter()
            .map(|row| Symbol {
                symbol_id: row.get("symbol_id"),
                repo_id: row.get("repo_id"),
                name: row.get("name"),
                kind: symbol_kind_from_str(row.get::<String, _>("kind").as_str()),
                file_path: row.get("file_path"),
                line: row.get("line"),
                definition: row.get("definition"),
                scope: if row.get::<String, _>("scope") == "exported" {
                    SymbolScope::Exported
                } else {
                    SymbolScope::Internal
                },
                workspace_id: row.get("workspace_id"),
                service_id: row.get("service_id"),
            })
            .collect())
    }

    async fn replace_file_symbols(
        &self,
        repo_id: &str,
        file_path: &str,
        symbols: Vec<Symbol>,
    ) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        let mut tx = self
            .pools
            .write_pool()
            .begin()
            .await
            .map_err(map_db_err("replace_file_symbols:begin", correlation_id))?;

        sqlx::query("DELETE FROM symbols WHERE repo_id = $1 AND file_path = $2")
            .bind(repo_id)
            .bind(file_path)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err("replace_file_symbols:delete", correlation_id))?;

        for symbol in &symbols {
            sqlx::query(
                "INSERT INTO symbols (symbol_id, repo_id, name, kind, file_path, line, definition,
                                       scope, workspace_id, service_id)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(symbol.symbol_id)
            .bind(&symbol.repo_id)
            .bind(&symbol.name)
            .bind(symbol_kind_str(symbol.kind))
            .bind(&symbol.file_path)
            .bind(symbol.line)
            .bind(&symbol.definition)
            .bind(symbol_scope_str(symbol.scope))
            .bind(&symbol.workspace_id)
            .bind(&symbol.service_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err("replace_file_symbols:insert", correlation_id))?;
        }

        tx.commit()
            .await
            .map_err(map_db_err("replace_file_symbols:commit", correlation_id))?;
        Ok(())
    }

    async fn upsert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        sqlx::query(
            "INSERT INTO workspaces (repo_id, workspace_id, name, abs_path, rel_path,
                                      dependencies, dev_dependencies, private)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (repo_id, workspace_id) DO UPDATE SET
                 name = EXCLUDED.name, abs_path = EXCLUDED.abs_path, rel_path = EXCLUDED.rel_path,
                 dependencies = EXCLUDED.dependencies, dev_dependencies = EXCLUDED.dev_dependencies,
                 private = EXCLUDED.private",
        )
        .bind(&workspace.repo_id)
        .bind(&workspace.workspace_id)
        .bind(&workspace.name)
        .bind(&workspace.abs_path)
        .bind(&workspace.rel_path)
        .bind(&workspace.dependencies)
        .bind(&workspace.dev_dependencies)
        .bind(workspace.private)
        .execute(self.pools.write_pool())
        .await
        .map_err(map_db_err("upsert_workspace", correlation_id))?;
        Ok(())
    }

    async fn list_workspaces(&self, repo_id: &str) -> StoreResult<Vec<Workspace>> {
        let correlation_id = CorrelationId::new();
        let rows = sqlx::query(
            "SELECT workspace_id, repo_id, name, abs_path, rel_path, dependencies,
                    dev_dependencies, private
             FROM workspaces WHERE repo_id = $1 ORDER BY workspace_id",
        )
        .bind(repo_id)
        .fetch_all(self.pools.read_pool())
        .await
        .map_err(map_db_err("list_workspaces", correlation_id))?;

        Ok(rows
            .into_iter()
            .map(|row| Workspace {
                workspace_id: row.get("workspace_id"),
                repo_id: row.get("repo_id"),
                name: row.get("name"),
                abs_path: row.get("abs_path"),
                rel_path: row.get("rel_path"),
                dependencies: row.get("dependencies"),
                dev_dependencies: row.get("dev_dependencies"),
                private: row.get("private"),
            })
            .collect())
    }

    async fn upsert_service(&self, service: &Service) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        sqlx::query(
            "INSERT INTO services (repo_id, service_id, name, kind, files)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (repo_id, service_id) DO UPDATE SET
                 name = EXCLUDED.name, kind = EXCLUDED.kind, files = EXCLUDED.files",
        )
        .bind(&service.repo_id)
        .bind(&service.service_id)
        .bind(&service.name)
        .bind(service_kind_str(service.kind))
        .bind(&service.files)
        .execute(self.pools.write_pool())
        .await
        .map_err(map_db_err("upsert_service", correlation_id))?;
        Ok(())
    }

    async fn list_services(&self, repo_id: &str) -> StoreResult<Vec<Service>> {
        let correlation_id = CorrelationId::new();
        let rows = sqlx::query(
            "SELECT service_id, repo_id, name, kind, files FROM services
             WHERE repo_id = $1 ORDER BY service_id",
        )
        .bind(repo_id)
        .fetch_all(self.pools.read_pool())
        .await
        .map_err(map_db_err("list_services", correlation_id))?;

        Ok(rows
            .into_iter()
            .map(|row| Service {
                service_id: row.get("service_id"),
                repo_id: row.get("repo_id"),
                name: row.get("name"),
                kind: service_kind_from_str(row.get::<String, _>("kind").as_str()),
                files: row.get("files"),
            })
            .collect())
    }

    async fn upsert_api_endpoint(&self, endpoint: &ApiEndpoint) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        let embedding = endpoint.embedding.clone().map(Vector::from);
        let implementation = endpoint.implementation.as_ref();
        sqlx::query(
            "INSERT INTO api_endpoints (endpoint_id, repo_id, service_id, api_type, path, method,
                                         request_schema, response_schema, impl_chunk_id,
                                         impl_file_path, impl_start_line, impl_end_line,
                                         impl_function, deprecated, description, tags, embedding)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             ON CONFLICT (service_id, api_type, path, method) DO UPDATE SET
                 request_schema = EXCLUDED.request_schema,
                 response_schema = EXCLUDED.response_schema,
                 impl_chunk_id = EXCLUDED.impl_chunk_id,
                 impl_file_path = EXCLUDED.impl_file_path,
                 impl_start_line = EXCLUDED.impl_start_line,
                 impl_end_line = EXCLUDED.impl_end_line,
                 impl_function = EXCLUDED.impl_function,
                 deprecated = EXCLUDED.deprecated,
                 description = EXCLUDED.description,
                 tags = EXCLUDED.tags,
                 embedding = EXCLUDED.embedding",
        )
        .bind(endpoint.endpoint_id)
        .bind(&endpoint.repo_id)
        .bind(&endpoint.service_id)
        .bind(api_type_str(endpoint.api_type))
        .bind(&endpoint.path)
        .bind(&endpoint.method)
        .bind(&endpoint.request_schema)
        .bind(&endpoint.response_schema)
        .bind(implementation.map(|i| i.chunk_id))
        .bind(implementation.map(|i| i.file_path.clone()))
        .bind(implementation.map(|i| i.start_line))
        .bind(implementation.map(|i| i.end_line))
        .bind(implementation.and_then(|i| i.function_name.clone()))
        .bind(endpoint.deprecated)
        .bind(&endpoint.description)
        .bind(&endpoint.tags)
        .bind(embedding)
        .execute(self.pools.write_pool())
        .await
        .map_err(map_db_err("upsert_api_endpoint", correlation_id))?;
        Ok(())
    }

    async fn search_api_endpoints(
        &self,
        query_embedding: &[f32],
        repo_ids: Option<&[String]>,
        api_type: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<ScoredEndpoint>> {
        let correlation_id = CorrelationId::new();
        let vector = Vector::from(query_embedding.to_vec());
        #[allow(clippy::cast_possible_wrap)]
        let limit_i64 = limit as i64;

        let rows = sqlx::query(
            "SELECT endpoint_id, repo_id, service_id, api_type, path, method, request_schema,
                    response_schema, impl_chunk_id, impl_file_path, impl_start_line, impl_end_line,
                    impl_function, deprecated, description, tags,
                    1 - (embedding <=> $1) AS score
             FROM api_endpoints
             WHERE ($2::text[] IS NULL OR repo_id = ANY($2))
               AND ($3::text IS NULL OR api_type = $3)
               AND embedding IS NOT NULL
             ORDER BY score DESC, repo_id ASC, path ASC
             LIMIT $4",
        )
        .bind(&vector)
        .bind(repo_ids)
        .bind(api_type)
        .bind(limit_i64)
        .fetch_all(self.pools.analytics_pool())
        .await
        .map_err(map_db_err("search_api_endpoints", correlation_id))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let score: f64 = row.get("score");
                let impl_chunk_id: Option<Uuid> = row.get("impl_chunk_id");
                let implementation = impl_chunk_id.map(|chunk_id| ApiImplementation {
                    chunk_id,
                    file_path: row.get("impl_file_path"),
                    start_line: row.get("impl_start_line"),
                    end_line: row.get("impl_end_line"),
                    function_name: row.get("impl_function"),
                });
                ScoredEndpoint {
                    endpoint: ApiEndpoint {
                        endpoint_id: row.get("endpoint_id"),
                        repo_id: row.get("repo_id"),
                        service_id: row.get("service_id"),
                        api_type: api_type_from_str(row.get::<String, _>("api_type").as_str()),
                        path: row.get("path"),
                        method: row.get("method"),
                        request_schema: row.get("request_schema"),
                        response_schema: row.get("response_schema"),
                        implementation,
                        deprecated: row.get("deprecated"),
                        description: row.get("description"),
                        tags: row.get("tags"),
                        embedding: None,
                    },
                    combined_score: score,
                }
            })
            .collect())
    }

    async fn upsert_cross_repo_dependency(&self, dep: &CrossRepoDependency) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        sqlx::query(
            "INSERT INTO cross_repo_dependencies (source_repo_id, target_repo_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(&dep.source_repo_id)
        .bind(&dep.target_repo_id)
        .execute(self.pools.write_pool())
        .await
        .map_err(map_db_err("upsert_cross_repo_dependency", correlation_id))?;
        Ok(())
    }

    async fn list_cross_repo_dependencies(
        &self,
        repo_id: &str,
        max_depth: u32,
    ) -> StoreResult<Vec<CrossRepoDependency>> {
        let correlation_id = CorrelationId::new();
        // Recursive CTE walks the dependency graph breadth-first up to max_depth hops.
        let rows = sqlx::query_as::<_, CrossRepoDependency>(
            "WITH RECURSIVE reachable AS (
                 SELECT source_repo_id, target_repo_id, 1 AS depth
                 FROM cross_repo_dependencies WHERE source_repo_id = $1 AND $2 > 0
                 UNION
                 SELECT d.source_repo_id, d.target_repo_id, r.depth + 1
                 FROM cross_repo_dependencies d
                 JOIN reachable r ON d.source_repo_id = r.target_repo_id
                 WHERE r.depth < $2
             )
             SELECT DISTINCT source_repo_id, target_repo_id FROM reachable",
        )
        .bind(repo_id)
        .bind(i32::try_from(max_depth).unwrap_or(i32::MAX))
        .fetch_all(self.pools.read_pool())
        .await
        .map_err(map_db_err("list_cross_repo_dependencies", correlation_id))?;
        Ok(rows)
    }

    async fn replace_documentation_chunks(
        &self,
        doc_set: &str,
        chunks: Vec<DocumentationChunk>,
    ) -> StoreResult<()> {
        let correlation_id = CorrelationId::new();
        let mut tx = self
            .pools
            .write_pool()
            .begin()
            .await
            .map_err(map_db_err("replace_documentation_chunks:begin", correlation_id))?;

        sqlx::query("DELETE FROM documentation_chunks WHERE doc_set = $1")
            .bind(doc_set)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err("replace_documentation_chunks:delete", correlation_id))?;

        for chunk in &chunks {
            let embedding = chunk.embedding.clone().map(Vector::from);
            sqlx::query(
                "INSERT INTO documentation_chunks (doc_id, doc_set, file_path, heading_path,
                                                     content, start_line, end_line, code_language, embedding)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(chunk.doc_id)
            .bind(&chunk.doc_set)
            .bind(&chunk.file_path)
            .bind(&chunk.heading_path)
            .bind(&chunk.content)
            .bind(chunk.start_line)
            .bind(chunk.end_line)
            .bind(&chunk.code_language)
            .bind(embedding)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err("replace_documentation_chunks:insert", correlation_id))?;
        }

        tx.commit()
            .await
            .map_err(map_db_err("replace_documentation_chunks:commit", correlation_id))?;
        Ok(())
    }

    async fn search_documentation(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        doc_sets: Option<&[String]>,
        limit: usize,
    ) -> StoreResult<Vec<DocumentationChunk>> {
        let correlation_id = CorrelationId::new();
        let vector = Vector::from(query_embedding.to_vec());
        #[allow(clippy::cast_possible_wrap)]
        let limit_i64 = limit as i64;

        let rows = sqlx::query(
            "SELECT doc_id, doc_set, file_path, heading_path, content, start_line, end_line,
                    code_language
             FROM documentation_chunks
             WHERE ($3::text[] IS NULL OR doc_set = ANY($3))
               AND embedding IS NOT NULL
             ORDER BY (0.7 * (1 - (embedding <=> $1))
                       + 0.3 * ts_rank(content_tsv, plainto_tsquery('english', $2))) DESC
             LIMIT $4",
        )
        .bind(&vector)
        .bind(query_text)
        .bind(doc_sets)
        .bind(limit_i64)
        .fetch_all(self.pools.analytics_pool())
        .await
        .map_err(map_db_err("search_documentation", correlation_id))?;

        Ok(rows
            .into_iter()
            .map(|row| DocumentationChunk {
                doc_id: row.get("doc_id"),
                doc_set: row.get("doc_set"),
                file_path: row.get("file_path"),
                heading_path: row.get("heading_path"),
                content: row.get("content"),
                start_line: row.get("start_line"),
                end_line: row.get("end_line"),
                code_language: row.get("code_language"),
                embedding: None,
            })
            .collect())
    }

    async fn index_stats(&self, repo_id: Option<&str>) -> StoreResult<IndexStats> {
        let correlation_id = CorrelationId::new();
        let row = sqlx::query(
            "SELECT
                 (SELECT count(*) FROM repositories WHERE $1::text IS NULL OR repo_id = $1) AS repository_count,
                 (SELECT count(*) FROM files WHERE $1::text IS NULL OR repo_id = $1) AS file_count,
                 (SELECT count(*) FROM chunks WHERE $1::text IS NULL OR repo_id = $1) AS chunk_count,
                 (SELECT count(*) FROM symbols WHERE $1::text IS NULL OR repo_id = $1) AS symbol_count,
                 (SELECT count(*) FROM api_endpoints WHERE $1::text IS NULL OR repo_id = $1) AS endpoint_count,
                 pg_database_size(current_database()) AS storage_bytes",
        )
        .bind(repo_id)
        .fetch_one(self.pools.analytics_pool())
        .await
        .map_err(map_db_err("index_stats", correlation_id))?;

        Ok(IndexStats {
            repository_count: row.get("repository_count"),
            file_count: row.get("file_count"),
            chunk_count: row.get("chunk_count"),
            symbol_count: row.get("symbol_count"),
            endpoint_count: row.get("endpoint_count"),
            storage_bytes: row.get("storage_bytes"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_type_round_trips() {
        for kind in [
            ChunkType::FileSummary,
            ChunkType::Function,
            ChunkType::Class,
            ChunkType::Method,
            ChunkType::Interface,
            ChunkType::Section,
            ChunkType::CodeBlock,
        ] {
            assert_eq!(chunk_type_from_str(chunk_type_str(kind)), kind);
        }
    }

    #[test]
    fn api_type_round_trips() {
        for kind in [ApiType::Rest, ApiType::GraphQl, ApiType::Grpc, ApiType::WebSocket] {
            assert_eq!(api_type_from_str(api_type_str(kind)), kind);
        }
    }
}
