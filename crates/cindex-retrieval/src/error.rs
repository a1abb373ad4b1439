use cindex_common::CorrelationId;
use thiserror::Error;

pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Errors raised by the nine-stage retrieval pipeline, each carrying a
/// correlation id for cross-stage log correlation (spec §4.6-§4.14).
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("scope error: repository mode requires at least one repo_id (correlation: {correlation_id})")]
    MissingRepoIds { correlation_id: CorrelationId },

    #[error("scope error: service mode requires at least one service_id (correlation: {correlation_id})")]
    MissingServiceIds { correlation_id: CorrelationId },

    #[error("scope error: boundary-aware mode requires start_repo (correlation: {correlation_id})")]
    MissingStartRepo { correlation_id: CorrelationId },

    #[error("search timed out after {timeout_ms}ms (correlation: {correlation_id})")]
    Timeout {
        timeout_ms: u64,
        correlation_id: CorrelationId,
    },

    #[error("store error: {0}")]
    Store(#[from] cindex_store::StoreError),

    #[error("backend error: {0}")]
    Backend(#[from] cindex_backend::BackendError),
}
