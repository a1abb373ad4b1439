//! Parse → Chunk → Summarize → Embed → Extract Symbols (spec §4.5 stages
//! 2-6), run per file by the bounded worker pool.

use std::sync::Arc;

use cindex_backend::{EmbeddingService, SummaryProvider};
use cindex_core::entities::{Chunk, ChunkMetadata, File, Symbol, SymbolKind, SymbolScope};
use cindex_parsing::{ChunkingService, Declaration, ParseResult, ParserRegistry};
use cindex_store::{generate_chunk_id, hash_content};

use crate::discover::DiscoveredFile;

pub struct FileProcessors {
    pub parsers: Arc<ParserRegistry>,
    pub chunker: Arc<ChunkingService>,
    pub embeddings: Arc<dyn EmbeddingService>,
    pub summary_primary: Arc<dyn SummaryProvider>,
    pub summary_fallback: Arc<dyn SummaryProvider>,
}

pub struct ProcessedFile {
    pub file: File,
    pub chunks: Vec<Chunk>,
    pub symbols: Vec<Symbol>,
    pub parsed: ParseResult,
}

/// Processes one discovered file through every per-file stage. Never
/// returns early on a partial parse — `ParseResult::partial` just means
/// fewer declarations were recovered, not that the file is dropped.
pub async fn process_file(
    processors: &FileProcessors,
    repo_id: &str,
    file: &DiscoveredFile,
) -> Result<ProcessedFile, cindex_backend::BackendError> {
    let language = cindex_parsing::get_language_from_extension(extension_of(&file.rel_path));
    let parsed = language
        .and_then(|lang| processors.parsers.for_language(lang))
        .map_or_else(ParseResult::default, |parser| parser.parse(&file.content));

    let chunk_drafts = processors.chunker.chunk(&file.content, &parsed, file.strategy);

    let summary = match processors.summary_primary.summarize(&file.rel_path, &file.content).await {
        Ok(summary) => summary,
        Err(err) => {
            tracing::warn!(file = %file.rel_path, error = %err, "summary backend failed, falling back to rule-based");
            processors
                .summary_fallback
                .summarize(&file.rel_path, &file.content)
                .await?
        }
    };

    let mut embed_inputs: Vec<&str> = vec![summary.as_str()];
    embed_inputs.extend(chunk_drafts.iter().map(|c| c.content.as_str()));
    let mut vectors = processors.embeddings.generate_embeddings(embed_inputs).await?;
    let summary_embedding = if vectors.is_empty() { None } else { Some(vectors.remove(0)) };

    let mut chunks: Vec<Chunk> = chunk_drafts
        .into_iter()
        .zip(vectors)
        .map(|(draft, embedding)| Chunk {
            chunk_id: generate_chunk_id(
                repo_id,
                &file.rel_path,
                &format!("{:?}", draft.chunk_type),
                draft.start_line,
                draft.end_line,
            ),
            repo_id: repo_id.to_string(),
            file_path: file.rel_path.clone(),
            chunk_type: draft.chunk_type,
            content: draft.content,
            start_line: draft.start_line as i64,
            end_line: draft.end_line as i64,
            token_count: draft.token_count as i64,
            metadata: ChunkMetadata::default(),
            embedding: Some(embedding),
        })
        .collect();

    let symbols = extract_symbols(repo_id, &file.rel_path, &parsed.declarations);

    // A dedicated file_summary chunk so retrieval stage 2 (spec §4.8) has a
    // vector to search over, and so stage 5's import walk (§4.11) can read
    // this file's imports/exports back via `get_file_summaries` without a
    // separate store method for fetching a `File` by path.
    if let Some(embedding) = &summary_embedding {
        chunks.push(Chunk {
            chunk_id: generate_chunk_id(repo_id, &file.rel_path, "FileSummary", 0, 0),
            repo_id: repo_id.to_string(),
            file_path: file.rel_path.clone(),
            chunk_type: cindex_core::entities::ChunkType::FileSummary,
            content: summary.clone(),
            start_line: 0,
            end_line: file.line_count as i64,
            token_count: 0,
            metadata: ChunkMetadata {
                dependencies: parsed.imports.clone(),
                imported_symbols: Vec::new(),
                function_names: parsed.exports.clone(),
                class_names: Vec::new(),
            },
            embedding: Some(embedding.clone()),
        });
    }

    let record = File {
        repo_id: repo_id.to_string(),
        file_path: file.rel_path.clone(),
        language: language.map(ToString::to_string),
        total_lines: file.line_count as i64,
        imports: parsed.imports.clone(),
        exports: parsed.exports.clone(),
        summary: Some(summary),
        summary_embedding,
        workspace_id: None,
        service_id: None,
        package_name: None,
        content_hash: hash_content(&file.content),
    };

    Ok(ProcessedFile {
        file: record,
        chunks,
        symbols,
        parsed,
    })
}

fn extract_symbols(repo_id: &str, file_path: &str, declarations: &[Declaration]) -> Vec<Symbol> {
    declarations
        .iter()
        .map(|decl| Symbol {
            symbol_id: uuid::Uuid::new_v4(),
            repo_id: repo_id.to_string(),
            name: decl.name.clone(),
            kind: symbol_kind_for(&decl.kind),
            file_path: file_path.to_string(),
            line: decl.start_line as i64,
            definition: decl.name.clone(),
            scope: if decl.exported {
                SymbolScope::Exported
            } else {
                SymbolScope::Internal
            },
            workspace_id: None,
            service_id: None,
        })
        .collect()
}

fn symbol_kind_for(kind: &str) -> SymbolKind {
    match kind {
        "function" | "arrow_function" => SymbolKind::Function,
        "class" | "struct" | "enum" => SymbolKind::Class,
        "method" => SymbolKind::Method,
        "interface" => SymbolKind::Interface,
        "type" => SymbolKind::Type,
        "const" | "constant" => SymbolKind::Constant,
        _ => SymbolKind::Variable,
    }
}

fn extension_of(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or("")
}
