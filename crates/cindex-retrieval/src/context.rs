//! Context Assembly (spec §4.14, retrieval stage 8): packs everything the
//! earlier stages produced into a token-budgeted, repo-kind-grouped result.

use cindex_core::RepoKind;
use cindex_parsing::TokenCounter;
use serde::Serialize;
use std::sync::Arc;

use crate::api::ApiEnrichment;
use crate::dedup::PrioritizedChunk;
use crate::imports::ImportChainEntry;
use crate::symbols::SymbolResolution;

const REFERENCE_CAP: usize = 5;
const DOCUMENTATION_CAP: usize = 3;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedChunks {
    pub primary_code: Vec<PrioritizedChunk>,
    pub libraries: Vec<PrioritizedChunk>,
    pub references: Vec<PrioritizedChunk>,
    pub documentation: Vec<PrioritizedChunk>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssembledContext {
    pub chunks: GroupedChunks,
    pub symbol_resolutions: Vec<SymbolResolution>,
    pub import_chain: Vec<ImportChainEntry>,
    pub api: ApiEnrichment,
    pub total_tokens: usize,
    pub warnings: Vec<String>,
}

impl GroupedChunks {
    fn push(&mut self, kind: RepoKind, chunk: PrioritizedChunk) -> bool {
        match kind {
            RepoKind::Monolithic | RepoKind::Microservice | RepoKind::Monorepo => {
                self.primary_code.push(chunk);
                true
            }
            RepoKind::Library => {
                self.libraries.push(chunk);
                true
            }
            RepoKind::Reference => {
                if self.references.len() < REFERENCE_CAP {
                    self.references.push(chunk);
                    true
                } else {
                    false
                }
            }
            RepoKind::Documentation => {
                if self.documentation.len() < DOCUMENTATION_CAP {
                    self.documentation.push(chunk);
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Adds `chunks` (already sorted by final score descending) into their
/// repo-kind group until `max_context_tokens` is reached; `warn_context_tokens`
/// only adds a warning, it doesn't stop assembly.
#[tracing::instrument(skip(chunks, symbol_resolutions, import_chain, api, token_counter))]
pub fn assemble_context(
    chunks: Vec<PrioritizedChunk>,
    symbol_resolutions: Vec<SymbolResolution>,
    import_chain: Vec<ImportChainEntry>,
    api: ApiEnrichment,
    token_counter: &Arc<dyn TokenCounter>,
    warn_context_tokens: usize,
    max_context_tokens: usize,
) -> AssembledContext {
    let mut grouped = GroupedChunks::default();
    let mut total_tokens = 0usize;
    let mut warnings = api.warnings.clone();
    let mut partial = false;

    for chunk in chunks {
        let tokens = token_counter.count(&chunk.chunk.chunk.content);
        if total_tokens + tokens > max_context_tokens {
            partial = true;
            continue;
        }
        let kind = chunk.repo_kind;
        if grouped.push(kind, chunk) {
            total_tokens += tokens;
        } else {
            partial = true;
        }
    }

    if partial {
        warnings.push("partial_results: context cap reached before all retrieved chunks were included".to_string());
    }
    if total_tokens > warn_context_tokens {
        warnings.push(format!("context size {total_tokens} tokens exceeds warn threshold {warn_context_tokens}"));
    }

    AssembledContext { chunks: grouped, symbol_resolutions, import_chain, api, total_tokens, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cindex_core::entities::{ChunkMetadata, ChunkType};
    use cindex_parsing::chunking::TiktokenCounter;
    use cindex_store::ScoredChunk;

    fn prioritized(repo_kind: RepoKind, content: &str, score: f64) -> PrioritizedChunk {
        PrioritizedChunk {
            chunk: ScoredChunk {
                chunk: cindex_core::Chunk {
                    chunk_id: uuid::Uuid::new_v4(),
                    repo_id: "a".to_string(),
                    file_path: "a.rs".to_string(),
                    chunk_type: ChunkType::Function,
                    content: content.to_string(),
                    start_line: 1,
                    end_line: 1,
                    token_count: 1,
                    metadata: ChunkMetadata::default(),
                    embedding: None,
                },
                vector_score: score,
                keyword_score: 0.0,
                combined_score: score,
            },
            repo_kind,
            similar_to_main_code: false,
            final_score: score,
        }
    }

    #[test]
    fn caps_reference_group_at_five() {
        let counter: Arc<dyn TokenCounter> = Arc::new(TiktokenCounter::new("gpt-4", 8192).unwrap());
        let chunks = (0..8).map(|i| prioritized(RepoKind::Reference, &format!("chunk {i}"), 1.0 - f64::from(i) * 0.01)).collect();
        let assembled = assemble_context(chunks, vec![], vec![], ApiEnrichment::default(), &counter, 1_000_000, 1_000_000);
        assert_eq!(assembled.chunks.references.len(), 5);
        assert!(assembled.warnings.iter().any(|w| w.starts_with("partial_results")));
    }
}
