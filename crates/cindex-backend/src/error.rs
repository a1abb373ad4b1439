//! Error types for the embedding/summary backend client (spec §7, "Backend"
//! category).

use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised talking to the external embedding/summary backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned an unexpected response: {message}")]
    Response { message: String },

    #[error("backend timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl BackendError {
    #[must_use]
    pub fn config_error(msg: &str) -> Self {
        Self::Config(msg.to_string())
    }
}
