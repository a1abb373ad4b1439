use thiserror::Error;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("repository root not found: {path}")]
    RootNotFound { path: String },

    #[error(transparent)]
    Store(#[from] cindex_store::StoreError),

    #[error(transparent)]
    Backend(#[from] cindex_backend::BackendError),

    #[error(transparent)]
    Detect(#[from] cindex_detect::DetectError),

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
