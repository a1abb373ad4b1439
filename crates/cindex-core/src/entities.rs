//! Core entities from the data model (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repository kind, chosen once at first index and immutable thereafter
/// (changing it requires a full re-index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoKind {
    Monolithic,
    Monorepo,
    Microservice,
    Library,
    Reference,
    Documentation,
}

impl RepoKind {
    /// Repo kinds excluded from `search_codebase`'s default (global) scope.
    #[must_use]
    pub const fn excluded_from_global_scope(self) -> bool {
        matches!(self, Self::Reference | Self::Documentation)
    }

    /// Priority weight applied to similarity during final ranking (spec §4.13).
    #[must_use]
    pub const fn priority_weight(self) -> f64 {
        match self {
            Self::Monolithic | Self::Microservice | Self::Monorepo => 1.0,
            Self::Library => 0.9,
            Self::Reference => 0.6,
            Self::Documentation => 0.5,
        }
    }
}

/// A repository: `repo_id` is a stable string, auto-derived from the root
/// basename when the caller doesn't supply one.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Repository {
    pub repo_id: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub kind: RepoKindColumn,
    pub version: Option<String>,
    pub upstream_url: Option<String>,
    pub workspace_config: Option<serde_json::Value>,
    pub indexed_at: Option<DateTime<Utc>>,
}

/// Newtype so `RepoKind` (which has no natural `sqlx` mapping) can round-trip
/// through a `text` column without the core crate depending on a custom
/// `sqlx::Type` derive for every enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoKindColumn(pub RepoKind);

impl TryFrom<String> for RepoKindColumn {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let kind = match value.as_str() {
            "monolithic" => RepoKind::Monolithic,
            "monorepo" => RepoKind::Monorepo,
            "microservice" => RepoKind::Microservice,
            "library" => RepoKind::Library,
            "reference" => RepoKind::Reference,
            "documentation" => RepoKind::Documentation,
            other => return Err(format!("unknown repo kind: {other}")),
        };
        Ok(Self(kind))
    }
}

/// A source file within a repository. `(repo_id, file_path)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub repo_id: String,
    pub file_path: String,
    pub language: Option<String>,
    pub total_lines: i64,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub summary: Option<String>,
    pub summary_embedding: Option<Vec<f32>>,
    pub workspace_id: Option<String>,
    pub service_id: Option<String>,
    pub package_name: Option<String>,
    pub content_hash: String,
}

impl File {
    /// Invariant: summary embedding present iff the file was included in the
    /// last successful index pass.
    #[must_use]
    pub const fn was_indexed(&self) -> bool {
        self.summary_embedding.is_some()
    }
}

/// The kind of a chunk's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    FileSummary,
    Function,
    Class,
    Method,
    Interface,
    Section,
    CodeBlock,
}

/// Soft-reference metadata carried by a chunk, used by symbol resolution
/// (spec §4.10) and import-chain expansion (§4.11).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub dependencies: Vec<String>,
    pub imported_symbols: Vec<String>,
    pub function_names: Vec<String>,
    pub class_names: Vec<String>,
}

impl ChunkMetadata {
    /// The union of all referenced names, used as symbol-resolution lookup keys.
    #[must_use]
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dependencies
            .iter()
            .chain(self.imported_symbols.iter())
            .chain(self.function_names.iter())
            .chain(self.class_names.iter())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// A contiguous, non-overlapping span of a source file with its own
/// embedding and metadata. `chunk_id` is stable across re-index by content
/// address (see `cindex-store::chunk_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: Uuid,
    pub repo_id: String,
    pub file_path: String,
    pub chunk_type: ChunkType,
    pub content: String,
    pub start_line: i64,
    pub end_line: i64,
    pub token_count: i64,
    pub metadata: ChunkMetadata,
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// `true` if `[start_line, end_line]` of `self` and `other` overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_line <= other.end_line && other.start_line <= self.end_line
    }
}

/// Exported or internal visibility of a symbol definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolScope {
    Exported,
    Internal,
}

/// The syntactic kind of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
    Interface,
    Type,
    Constant,
    Method,
}

/// A named definition. A name may resolve to multiple `Symbol` rows;
/// resolution returns all matches ordered by `(name, file_path)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol_id: Uuid,
    pub repo_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub line: i64,
    pub definition: String,
    pub scope: SymbolScope,
    pub workspace_id: Option<String>,
    pub service_id: Option<String>,
}

/// A monorepo package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub workspace_id: String,
    pub repo_id: String,
    pub name: String,
    pub abs_path: String,
    pub rel_path: String,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub private: bool,
}

/// Kind of microservice boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Docker,
    Serverless,
    Mobile,
    Library,
    Other,
}

/// A microservice boundary. `(repo_id, service_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub service_id: String,
    pub repo_id: String,
    pub name: String,
    pub kind: ServiceKind,
    pub files: Vec<String>,
}

/// The wire protocol an API endpoint is exposed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    Rest,
    GraphQl,
    Grpc,
    WebSocket,
}

/// A pointer from an endpoint to the chunk that implements it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiImplementation {
    pub chunk_id: Uuid,
    pub file_path: String,
    pub start_line: i64,
    pub end_line: i64,
    pub function_name: Option<String>,
}

/// `(service_id, api_type, path, method)` identifies an endpoint. At most
/// one implementation link per endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub endpoint_id: Uuid,
    pub repo_id: String,
    pub service_id: String,
    pub api_type: ApiType,
    pub path: String,
    pub method: String,
    pub request_schema: Option<serde_json::Value>,
    pub response_schema: Option<serde_json::Value>,
    pub implementation: Option<ApiImplementation>,
    pub deprecated: bool,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

/// A directed edge `source_repo_id -> target_repo_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CrossRepoDependency {
    pub source_repo_id: String,
    pub target_repo_id: String,
}

/// A chunk of indexed documentation, parallel to `Chunk` but keyed by `doc_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationChunk {
    pub doc_id: Uuid,
    pub doc_set: String,
    pub file_path: String,
    pub heading_path: Vec<String>,
    pub content: String,
    pub start_line: i64,
    pub end_line: i64,
    pub code_language: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_kind_priority_weights_match_spec() {
        assert_eq!(RepoKind::Monolithic.priority_weight(), 1.0);
        assert_eq!(RepoKind::Library.priority_weight(), 0.9);
        assert_eq!(RepoKind::Reference.priority_weight(), 0.6);
        assert_eq!(RepoKind::Documentation.priority_weight(), 0.5);
    }

    #[test]
    fn global_scope_excludes_reference_and_documentation() {
        assert!(RepoKind::Reference.excluded_from_global_scope());
        assert!(RepoKind::Documentation.excluded_from_global_scope());
        assert!(!RepoKind::Monolithic.excluded_from_global_scope());
    }

    #[test]
    fn chunk_overlap_detects_shared_lines() {
        let base = |start, end| Chunk {
            chunk_id: Uuid::nil(),
            repo_id: "r".into(),
            file_path: "f.rs".into(),
            chunk_type: ChunkType::Function,
            content: String::new(),
            start_line: start,
            end_line: end,
            token_count: 0,
            metadata: ChunkMetadata::default(),
            embedding: None,
        };
        assert!(base(1, 10).overlaps(&base(10, 20)));
        assert!(!base(1, 10).overlaps(&base(11, 20)));
    }

    #[test]
    fn repo_kind_column_rejects_unknown_values() {
        assert!(RepoKindColumn::try_from("bogus".to_string()).is_err());
        assert_eq!(
            RepoKindColumn::try_from("library".to_string()).unwrap().0,
            RepoKind::Library
        );
    }
}
