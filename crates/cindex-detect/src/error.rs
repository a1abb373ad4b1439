use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid glob pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("failed to parse manifest {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
