//! Invariant checks shared by every writer of the domain model (spec §8).

use crate::entities::{ChunkType, File};
use crate::error::InvariantError;
use crate::{ApiEndpoint, Chunk};

/// Check that every chunk in `chunks` has `start_line <= end_line`, that
/// chunks covering the same file have pairwise-disjoint ranges, and that at
/// most one `file_summary` chunk exists per file.
///
/// # Errors
/// Returns the first violated invariant found.
pub fn check_chunk_set(chunks: &[Chunk]) -> Result<(), InvariantError> {
    for chunk in chunks {
        if chunk.start_line > chunk.end_line {
            return Err(InvariantError::InvertedRange {
                chunk_id: chunk.chunk_id.to_string(),
                start: chunk.start_line,
                end: chunk.end_line,
            });
        }
    }

    let mut by_file: std::collections::HashMap<&str, Vec<&Chunk>> =
        std::collections::HashMap::new();
    for chunk in chunks {
        by_file.entry(chunk.file_path.as_str()).or_default().push(chunk);
    }

    for (file_path, file_chunks) in &by_file {
        let summary_count = file_chunks
            .iter()
            .filter(|c| c.chunk_type == ChunkType::FileSummary)
            .count();
        if summary_count > 1 {
            return Err(InvariantError::MultipleFileSummaries {
                file_path: (*file_path).to_string(),
                count: summary_count,
            });
        }

        let non_summary: Vec<&&Chunk> = file_chunks
            .iter()
            .filter(|c| c.chunk_type != ChunkType::FileSummary)
            .collect();
        for i in 0..non_summary.len() {
            for j in (i + 1)..non_summary.len() {
                let (Some(a), Some(b)) = (non_summary.get(i), non_summary.get(j)) else {
                    continue;
                };
                if a.overlaps(b) {
                    return Err(InvariantError::OverlappingRanges {
                        file_path: (*file_path).to_string(),
                        first: a.chunk_id.to_string(),
                        second: b.chunk_id.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Check `summary_embedding.len() == expected_dimensions` when present.
///
/// # Errors
/// Returns [`InvariantError::DimensionMismatch`] on mismatch.
pub fn check_file_embedding_dimensions(
    file: &File,
    expected_dimensions: usize,
) -> Result<(), InvariantError> {
    if let Some(embedding) = &file.summary_embedding {
        if embedding.len() != expected_dimensions {
            return Err(InvariantError::DimensionMismatch {
                expected: expected_dimensions,
                actual: embedding.len(),
            });
        }
    }
    Ok(())
}

/// Check that an endpoint has at most one implementation link (the type
/// system already enforces `Option`, so this exists for symmetry with the
/// multi-row case that the store layer must also defend against).
///
/// # Errors
/// Returns [`InvariantError::MultipleImplementationLinks`] if `links` has
/// more than one entry for the same endpoint.
pub fn check_single_implementation_link(
    endpoint: &ApiEndpoint,
    links: &[crate::ApiImplementation],
) -> Result<(), InvariantError> {
    if links.len() > 1 {
        return Err(InvariantError::MultipleImplementationLinks {
            endpoint_id: endpoint.endpoint_id.to_string(),
            count: links.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ChunkMetadata;
    use uuid::Uuid;

    fn chunk(chunk_type: ChunkType, start: i64, end: i64) -> Chunk {
        Chunk {
            chunk_id: Uuid::new_v4(),
            repo_id: "r".into(),
            file_path: "f.rs".into(),
            chunk_type,
            content: String::new(),
            start_line: start,
            end_line: end,
            token_count: 0,
            metadata: ChunkMetadata::default(),
            embedding: None,
        }
    }

    #[test]
    fn disjoint_chunks_pass() {
        let chunks = vec![chunk(ChunkType::Function, 1, 10), chunk(ChunkType::Function, 11, 20)];
        assert!(check_chunk_set(&chunks).is_ok());
    }

    #[test]
    fn overlapping_chunks_fail() {
        let chunks = vec![chunk(ChunkType::Function, 1, 10), chunk(ChunkType::Function, 5, 15)];
        assert!(matches!(
            check_chunk_set(&chunks),
            Err(InvariantError::OverlappingRanges { .. })
        ));
    }

    #[test]
    fn two_file_summaries_fail() {
        let chunks = vec![
            chunk(ChunkType::FileSummary, 1, 1),
            chunk(ChunkType::FileSummary, 1, 1),
        ];
        assert!(matches!(
            check_chunk_set(&chunks),
            Err(InvariantError::MultipleFileSummaries { .. })
        ));
    }

    #[test]
    fn inverted_range_fails() {
        let chunks = vec![chunk(ChunkType::Function, 10, 5)];
        assert!(matches!(
            check_chunk_set(&chunks),
            Err(InvariantError::InvertedRange { .. })
        ));
    }
}
