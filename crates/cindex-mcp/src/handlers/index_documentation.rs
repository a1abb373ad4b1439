//! Handler for the `index_documentation` tool (spec §6): indexes a
//! collection of markdown files under a `doc_set` name.
//!
//! There is no orchestrator-level documentation pipeline to call into (the
//! nine-stage orchestrator is source-code specific); this handler builds the
//! equivalent Parse/Chunk/Embed flow directly, heading-scoped via
//! [`cindex_parsing::MarkdownParser`] rather than syntax-aware chunking.

use std::path::{Path, PathBuf};

use crate::common::{domain_err, validation_err};
use crate::state::AppState;

use agenterra_rmcp::handler::server::tool::IntoCallToolResult;
use agenterra_rmcp::model::*;
use cindex_core::DocumentationChunk;
use cindex_parsing::parsing::LanguageParser;
use cindex_parsing::parsing::markdown::MarkdownParser;
use cindex_store::generate_chunk_id;
use ignore::WalkBuilder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct IndexDocumentationParams {
    pub doc_set: String,
    /// Directories or files to walk for markdown content.
    pub paths: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndexDocumentationResponse {
    pub doc_set: String,
    pub files_indexed: usize,
    pub chunks_written: usize,
}

impl IntoContents for IndexDocumentationResponse {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::json(self).expect("failed to serialize IndexDocumentationResponse")]
    }
}

pub async fn index_documentation_handler(
    state: &AppState,
    params: &IndexDocumentationParams,
) -> Result<CallToolResult, agenterra_rmcp::Error> {
    info!(
        target = "handler",
        event = "incoming_request",
        tool = "index_documentation",
        doc_set = %params.doc_set,
        path_count = params.paths.len()
    );

    if params.doc_set.trim().is_empty() || params.paths.is_empty() {
        return Err(validation_err("doc_set must be set and paths must not be empty"));
    }

    let parser = MarkdownParser::new();
    let mut files_indexed = 0usize;
    let mut sections: Vec<(String, String, Vec<String>, String, i64, i64)> = Vec::new();

    for root in &params.paths {
        for path in discover_markdown_files(Path::new(root)) {
            let Ok(content) = std::fs::read_to_string(&path) else {
                error!(target = "handler", event = "read_error", tool = "index_documentation", path = %path.display());
                continue;
            };
            let rel_path = path.to_string_lossy().replace('\\', "/");
            let parsed = parser.parse(&content);
            let lines: Vec<&str> = content.lines().collect();

            if parsed.declarations.is_empty() {
                sections.push((rel_path, content, Vec::new(), String::new(), 1, lines.len().max(1) as i64));
            } else {
                for decl in &parsed.declarations {
                    let start = decl.start_line.saturating_sub(1).min(lines.len());
                    let end = decl.end_line.min(lines.len());
                    let text = lines.get(start..end).unwrap_or(&[]).join("\n");
                    if text.trim().is_empty() {
                        continue;
                    }
                    sections.push((rel_path.clone(), text, vec![decl.name.clone()], String::new(), start as i64 + 1, end as i64));
                }
            }
            files_indexed += 1;
        }
    }

    debug!(target = "handler", event = "sections_built", tool = "index_documentation", section_count = sections.len());

    let texts: Vec<&str> = sections.iter().map(|s| s.1.as_str()).collect();
    let embeddings = state
        .embeddings
        .generate_embeddings(texts)
        .await
        .map_err(|e| domain_err(e, "index_documentation:generate_embeddings"))?;

    let chunks: Vec<DocumentationChunk> = sections
        .into_iter()
        .zip(embeddings)
        .map(|((file_path, content, heading_path, code_language, start_line, end_line), embedding)| {
            let doc_id = generate_chunk_id(&params.doc_set, &file_path, "heading", start_line as usize, end_line as usize);
            DocumentationChunk {
                doc_id,
                doc_set: params.doc_set.clone(),
                file_path,
                heading_path,
                content,
                start_line,
                end_line,
                code_language: if code_language.is_empty() { None } else { Some(code_language) },
                embedding: Some(embedding),
            }
        })
        .collect();

    let chunks_written = chunks.len();
    state
        .store
        .replace_documentation_chunks(&params.doc_set, chunks)
        .await
        .map_err(|e| domain_err(e, "index_documentation:replace_documentation_chunks"))?;

    info!(
        target = "handler",
        event = "index_ok",
        tool = "index_documentation",
        doc_set = %params.doc_set,
        files_indexed,
        chunks_written
    );

    IndexDocumentationResponse { doc_set: params.doc_set.clone(), files_indexed, chunks_written }.into_call_tool_result()
}

fn discover_markdown_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build()
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().and_then(|e| e.to_str()).is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_round_trip() {
        let params = IndexDocumentationParams { doc_set: "guides".to_string(), paths: vec!["docs/".to_string()] };
        let json = serde_json::to_string(&params).expect("serialize");
        let back: IndexDocumentationParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.doc_set, "guides");
    }
}
