//! HTTP clients for the external embedding and summary backends (spec §4.1,
//! §4.2): request batching, retry with backoff, and a query-embedding cache.

pub mod cache;
pub mod embedding;
pub mod error;
pub mod summary;

pub use embedding::{DefaultEmbeddingService, EmbeddingProvider, EmbeddingService, EmbeddingStats, HttpEmbeddingProvider};
pub use error::{BackendError, BackendResult};
pub use summary::{HttpSummaryProvider, RuleBasedSummaryProvider, SummaryProvider};
