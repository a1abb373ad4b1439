//! File Retrieval (spec §4.8, stage 2) and Chunk Retrieval (spec §4.9,
//! stage 3). Both reuse `StoreRepository::search_chunks`'s hybrid query —
//! file retrieval filters the result to `chunk_type == FileSummary` and
//! chunk retrieval filters it to everything else, then restricts chunks to
//! the file set Stage 2 already chose. The store's `search_chunks` doesn't
//! take a `file_path` filter directly, so that restriction happens
//! client-side here rather than in a second SQL round-trip.

use std::sync::Arc;

use cindex_core::{Chunk, ChunkType};
use cindex_store::{ScoredChunk, StoreRepository};
use serde::Serialize;

use crate::error::RetrievalResult;
use crate::scope::ResolvedScope;

const TSQUERY_SPECIAL_CHARS: &[char] = &['&', '|', '!', '(', ')', ':', '*', '<', '>'];

/// Strips characters `plainto_tsquery` would otherwise choke on and
/// collapses whitespace (spec §4.8 "Inputs for tsquery are sanitized").
#[must_use]
pub fn sanitize_tsquery_input(text: &str) -> String {
    text.chars()
        .filter(|c| !TSQUERY_SPECIAL_CHARS.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredFile {
    pub file_path: String,
    pub repo_id: String,
    pub summary: String,
    pub combined_score: f64,
    pub vector_score: f64,
}

/// Stage 2: ranks files by hybrid score over their summary chunk, keeping
/// only those clearing `similarity_threshold` (vector) or a 0.01 FTS-rank
/// floor, ordered by score desc, then vector distance asc, then
/// `(repo_id, file_path)` lexical order as a final deterministic tie-break.
#[tracing::instrument(skip(store, query_embedding, scope))]
pub async fn retrieve_files(
    store: &Arc<dyn StoreRepository>,
    query_embedding: &[f32],
    query_text: &str,
    scope: &ResolvedScope,
    vector_weight: f64,
    keyword_weight: f64,
    similarity_threshold: f64,
    top_k: usize,
) -> RetrievalResult<Vec<ScoredFile>> {
    let sanitized = sanitize_tsquery_input(query_text);
    let repo_ids = if scope.repo_ids.is_empty() { None } else { Some(scope.repo_ids.as_slice()) };
    let candidates = store
        .search_chunks(query_embedding, &sanitized, repo_ids, vector_weight, keyword_weight, top_k.max(1) * 8)
        .await?;

    let mut files: Vec<ScoredFile> = candidates
        .into_iter()
        .filter(|c| c.chunk.chunk_type == ChunkType::FileSummary)
        .filter(|c| c.vector_score >= similarity_threshold || c.keyword_score > 0.01)
        .map(|c| ScoredFile {
            file_path: c.chunk.file_path,
            repo_id: c.chunk.repo_id,
            summary: c.chunk.content,
            combined_score: c.combined_score,
            vector_score: c.vector_score,
        })
        .collect();

    files.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.vector_score.partial_cmp(&a.vector_score).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| (a.repo_id.as_str(), a.file_path.as_str()).cmp(&(b.repo_id.as_str(), b.file_path.as_str())))
    });
    files.truncate(top_k);
    Ok(files)
}

/// Stage 3: ranks non-summary chunks restricted to the files Stage 2 chose.
#[tracing::instrument(skip(store, query_embedding, top_files))]
pub async fn retrieve_chunks(
    store: &Arc<dyn StoreRepository>,
    query_embedding: &[f32],
    query_text: &str,
    scope: &ResolvedScope,
    top_files: &[ScoredFile],
    vector_weight: f64,
    keyword_weight: f64,
    chunk_similarity_threshold: f64,
    max_chunks: usize,
) -> RetrievalResult<Vec<ScoredChunk>> {
    if top_files.is_empty() {
        return Ok(Vec::new());
    }
    let file_paths: std::collections::HashSet<&str> = top_files.iter().map(|f| f.file_path.as_str()).collect();
    let sanitized = sanitize_tsquery_input(query_text);
    let repo_ids = if scope.repo_ids.is_empty() { None } else { Some(scope.repo_ids.as_slice()) };
    let candidates = store
        .search_chunks(query_embedding, &sanitized, repo_ids, vector_weight, keyword_weight, max_chunks.max(1) * 8)
        .await?;

    let mut chunks: Vec<ScoredChunk> = candidates
        .into_iter()
        .filter(|c| c.chunk.chunk_type != ChunkType::FileSummary)
        .filter(|c| file_paths.contains(c.chunk.file_path.as_str()))
        .filter(|c| c.combined_score >= chunk_similarity_threshold)
        .collect();

    chunks.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap_or(std::cmp::Ordering::Equal));
    chunks.truncate(max_chunks);
    Ok(chunks)
}

#[must_use]
pub fn chunk_contents(chunks: &[ScoredChunk]) -> Vec<&Chunk> {
    chunks.iter().map(|c| &c.chunk).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_tsquery_special_chars() {
        assert_eq!(sanitize_tsquery_input("foo & bar | (baz)"), "foo bar baz");
    }
}
