//! Shared domain model for cindex: the entities and invariants from the
//! data model (repositories, files, chunks, symbols, workspaces, services,
//! API endpoints, cross-repo dependencies, documentation chunks).
//!
//! This crate has no I/O — it only defines types and the invariant checks
//! that every writer (the indexing orchestrator, the store layer) must
//! uphold before data is considered valid.

pub mod entities;
pub mod error;
pub mod invariants;

pub use entities::{
    ApiEndpoint, ApiImplementation, ApiType, Chunk, ChunkMetadata, ChunkType, CrossRepoDependency,
    DocumentationChunk, File, Repository, RepoKind, Service, ServiceKind, Symbol, SymbolKind,
    SymbolScope, Workspace,
};
pub use error::InvariantError;
