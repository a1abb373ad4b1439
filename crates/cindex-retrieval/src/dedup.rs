//! Deduplication & Prioritization (spec §4.13, retrieval stage 7): drops
//! near-duplicate chunks per policy, then orders what remains by
//! `similarity × repo-kind priority`.

use cindex_core::RepoKind;
use cindex_store::ScoredChunk;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PrioritizedChunk {
    pub chunk: ScoredChunk,
    pub repo_kind: RepoKind,
    pub similar_to_main_code: bool,
    pub final_score: f64,
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        f64::from(dot / (norm_a * norm_b))
    }
}

/// `repo_kind_of` maps a chunk's `repo_id` to its `RepoKind` (the retrieved
/// chunks span multiple repos; this stage needs each one's kind for both
/// the dedup policy and the priority weight).
#[must_use]
pub fn dedup_and_prioritize(
    chunks: Vec<ScoredChunk>,
    repo_kind_of: impl Fn(&str) -> RepoKind,
    dedup_threshold: f64,
) -> Vec<PrioritizedChunk> {
    let mut kept: Vec<PrioritizedChunk> = Vec::with_capacity(chunks.len());

    'outer: for candidate in chunks {
        let candidate_kind = repo_kind_of(&candidate.chunk.repo_id);
        let candidate_embedding = candidate.chunk.embedding.clone().unwrap_or_default();

        for existing in &mut kept {
            let existing_embedding = existing.chunk.chunk.embedding.clone().unwrap_or_default();
            let similarity = cosine_similarity(&candidate_embedding, &existing_embedding);
            if similarity <= dedup_threshold {
                continue;
            }

            let same_repo = existing.chunk.chunk.repo_id == candidate.chunk.repo_id;
            if same_repo {
                if candidate.combined_score > existing.chunk.combined_score {
                    *existing = PrioritizedChunk {
                        final_score: candidate.combined_score * candidate_kind.priority_weight(),
                        repo_kind: candidate_kind,
                        similar_to_main_code: existing.similar_to_main_code,
                        chunk: candidate,
                    };
                }
                continue 'outer;
            }

            let existing_is_reference = existing.repo_kind == RepoKind::Reference;
            let candidate_is_reference = candidate_kind == RepoKind::Reference;
            if existing_is_reference && !candidate_is_reference {
                *existing = PrioritizedChunk {
                    final_score: candidate.combined_score * candidate_kind.priority_weight(),
                    repo_kind: candidate_kind,
                    similar_to_main_code: true,
                    chunk: candidate,
                };
                continue 'outer;
            }
            if candidate_is_reference && !existing_is_reference {
                existing.similar_to_main_code = true;
                continue 'outer;
            }
            // neither side is a reference repo: keep both, fall through.
        }

        kept.push(PrioritizedChunk {
            final_score: candidate.combined_score * candidate_kind.priority_weight(),
            repo_kind: candidate_kind,
            similar_to_main_code: false,
            chunk: candidate,
        });
    }

    kept.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                (a.chunk.chunk.repo_id.as_str(), a.chunk.chunk.file_path.as_str(), a.chunk.chunk.chunk_id)
                    .cmp(&(b.chunk.chunk.repo_id.as_str(), b.chunk.chunk.file_path.as_str(), b.chunk.chunk.chunk_id))
            })
    });
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use cindex_core::entities::{ChunkMetadata, ChunkType};

    fn chunk(repo_id: &str, score: f64, embedding: Vec<f32>) -> ScoredChunk {
        ScoredChunk {
            chunk: cindex_core::Chunk {
                chunk_id: uuid::Uuid::new_v4(),
                repo_id: repo_id.to_string(),
                file_path: "a.rs".to_string(),
                chunk_type: ChunkType::Function,
                content: String::new(),
                start_line: 1,
                end_line: 1,
                token_count: 1,
                metadata: ChunkMetadata::default(),
                embedding: Some(embedding),
            },
            vector_score: score,
            keyword_score: 0.0,
            combined_score: score,
        }
    }

    #[test]
    fn same_repo_keeps_higher_scored() {
        let chunks = vec![chunk("a", 0.5, vec![1.0, 0.0]), chunk("a", 0.9, vec![1.0, 0.0])];
        let result = dedup_and_prioritize(chunks, |_| RepoKind::Monolithic, 0.92);
        assert_eq!(result.len(), 1);
        assert!((result[0].chunk.combined_score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn cross_repo_prefers_non_reference() {
        let chunks = vec![chunk("ref", 0.95, vec![1.0, 0.0]), chunk("main", 0.5, vec![1.0, 0.0])];
        let result = dedup_and_prioritize(chunks, |id| if id == "ref" { RepoKind::Reference } else { RepoKind::Monolithic }, 0.92);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].chunk.chunk.repo_id, "main");
        assert!(result[0].similar_to_main_code);
    }

    #[test]
    fn dissimilar_chunks_both_kept() {
        let chunks = vec![chunk("a", 0.5, vec![1.0, 0.0]), chunk("b", 0.9, vec![0.0, 1.0])];
        let result = dedup_and_prioritize(chunks, |_| RepoKind::Monolithic, 0.92);
        assert_eq!(result.len(), 2);
    }
}
