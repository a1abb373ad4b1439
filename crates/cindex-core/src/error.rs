//! Invariant-violation errors for the shared domain model.

use thiserror::Error;

/// An invariant from the data model (spec §3 / §8) was violated.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvariantError {
    #[error("chunk {chunk_id} has start_line {start} > end_line {end}")]
    InvertedRange {
        chunk_id: String,
        start: i64,
        end: i64,
    },

    #[error("chunks {first} and {second} have overlapping line ranges in {file_path}")]
    OverlappingRanges {
        file_path: String,
        first: String,
        second: String,
    },

    #[error("file {file_path} has {count} file_summary chunks, at most one is allowed")]
    MultipleFileSummaries { file_path: String, count: usize },

    #[error("embedding length {actual} does not match configured dimensions {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("endpoint {endpoint_id} has {count} implementation links, at most one is allowed")]
    MultipleImplementationLinks { endpoint_id: String, count: usize },
}
