//! Store error taxonomy (spec §7, "Store" category).

use cindex_common::CorrelationId;
use thiserror::Error;

/// Errors raised by the data store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not connected to the database: {message}")]
    NotConnected { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("schema error: {message}")]
    Schema { message: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("query failed ({correlation_id}): {message}")]
    Query {
        message: String,
        correlation_id: CorrelationId,
    },

    #[error(transparent)]
    Invariant(#[from] cindex_core::InvariantError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map a `sqlx::Error` into a [`StoreError`], attaching a correlation ID and
/// logging the full detail at the point of failure (spec §7: sanitize before
/// it crosses the tool boundary, never before that).
pub fn map_db_err(operation: &str, correlation_id: CorrelationId) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |err| {
        tracing::error!(operation, %correlation_id, error = %err, "database operation failed");
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: operation.to_string(),
                id: String::new(),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::NotConnected {
                message: err.to_string(),
            },
            other => StoreError::Query {
                message: other.to_string(),
                correlation_id,
            },
        }
    }
}
