//! Trait abstractions for embedding generation (spec §4.1).

use async_trait::async_trait;

use crate::BackendResult;

/// A provider of raw embedding vectors, pluggable so the HTTP backend can be
/// swapped for a test double.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per input.
    async fn embed_batch(&self, texts: &[&str]) -> BackendResult<Vec<Vec<f32>>>;

    /// Dimensionality of embeddings produced by this provider.
    fn embedding_dimension(&self) -> usize;

    /// Name of the underlying model, used in logs and `get_index_stats`.
    fn model_name(&self) -> &str;
}

/// Coordinates batching and caching on top of an [`EmbeddingProvider`].
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate embeddings for a batch of texts, batching internally
    /// according to the configured batch size.
    async fn generate_embeddings(&self, texts: Vec<&str>) -> BackendResult<Vec<Vec<f32>>>;

    /// Generate (and cache) the embedding for a single search query
    /// (spec §4.6 stage 1, cache per §6 `CINDEX_QUERY_CACHE_*`).
    async fn embed_query(&self, query: &str) -> BackendResult<Vec<f32>>;

    fn provider(&self) -> &dyn EmbeddingProvider;

    async fn stats(&self) -> EmbeddingStats;
}

/// Statistics about embedding generation (surfaced by `get_index_stats`).
#[derive(Debug, Clone, Default)]
pub struct EmbeddingStats {
    pub total_embeddings: usize,
    pub total_batches: usize,
    pub avg_batch_time_ms: f64,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub model_name: String,
    pub embedding_dimension: usize,
}
