//! HTTP-backed [`EmbeddingProvider`] and [`EmbeddingService`] (spec §4.1: the
//! embedding backend is an external HTTP service, not an in-process model).

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cindex_config::{BackendConfig, EmbeddingConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::traits::{EmbeddingProvider, EmbeddingService, EmbeddingStats};
use crate::cache::QueryEmbeddingCache;
use crate::{BackendError, BackendResult};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDatum>,
}

#[derive(Deserialize)]
struct EmbedDatum {
    embedding: Vec<f32>,
}

/// Calls an OpenAI-embeddings-compatible HTTP endpoint, retrying transient
/// failures with exponential backoff.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    backend: BackendConfig,
    model: String,
    dimensions: usize,
}

impl HttpEmbeddingProvider {
    /// # Errors
    /// Returns [`BackendError::Config`] if the client cannot be built.
    pub fn new(backend: BackendConfig, embedding: &EmbeddingConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(backend.timeout_secs))
            .build()
            .map_err(BackendError::Request)?;
        Ok(Self {
            client,
            backend,
            model: embedding.model.clone(),
            dimensions: embedding.dimensions,
        })
    }

    async fn post_embed(&self, texts: &[&str]) -> BackendResult<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.backend.host.trim_end_matches('/'));
        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.client.post(&url).json(&body).send().await;
            match result {
                Ok(response) if response.status().is_success() => {
                    let parsed: EmbedResponse = response.json().await?;
                    return Ok(parsed.data.into_iter().map(|d| d.embedding).collect());
                }
                Ok(response) => {
                    let status = response.status();
                    if attempt >= self.backend.retry_count || !status.is_server_error() {
                        return Err(BackendError::Response {
                            message: format!("backend responded with {status}"),
                        });
                    }
                }
                Err(err) => {
                    if attempt >= self.backend.retry_count {
                        return Err(BackendError::Request(err));
                    }
                }
            }
            let delay = self.backend.retry_base_delay_ms.saturating_mul(2u64.pow(attempt - 1));
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> BackendResult<Vec<Vec<f32>>> {
        self.post_embed(texts).await
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Batches calls to an [`EmbeddingProvider`] and caches per-query embeddings
/// (spec §4.6 stage 1, §6 `CINDEX_QUERY_CACHE_*`).
pub struct DefaultEmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    stats: Arc<RwLock<EmbeddingStats>>,
    query_cache: Arc<Mutex<QueryEmbeddingCache>>,
}

impl DefaultEmbeddingService {
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize, cache_capacity: usize) -> Self {
        let stats = EmbeddingStats {
            model_name: provider.model_name().to_string(),
            embedding_dimension: provider.embedding_dimension(),
            ..Default::default()
        };
        Self {
            provider,
            batch_size,
            stats: Arc::new(RwLock::new(stats)),
            query_cache: Arc::new(Mutex::new(QueryEmbeddingCache::new(cache_capacity))),
        }
    }
}

#[async_trait]
impl EmbeddingService for DefaultEmbeddingService {
    async fn generate_embeddings(&self, texts: Vec<&str>) -> BackendResult<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size.max(1)) {
            let start = Instant::now();
            let embeddings = self.provider.embed_batch(batch).await?;
            all_embeddings.extend(embeddings);

            let elapsed_ms = start.elapsed().as_millis() as f64;
            let mut stats = self.stats.write().await;
            stats.total_embeddings += batch.len();
            stats.total_batches += 1;
            let count = stats.total_batches as f64;
            stats.avg_batch_time_ms = (stats.avg_batch_time_ms * (count - 1.0) + elapsed_ms) / count;
        }
        Ok(all_embeddings)
    }

    async fn embed_query(&self, query: &str) -> BackendResult<Vec<f32>> {
        if let Some(hit) = self.query_cache.lock().await.get(query) {
            self.stats.write().await.cache_hits += 1;
            return Ok(hit);
        }
        self.stats.write().await.cache_misses += 1;
        let mut embeddings = self.provider.embed_batch(&[query]).await?;
        let embedding = embeddings.pop().ok_or_else(|| BackendError::Response {
            message: "backend returned no embedding for query".to_string(),
        })?;
        self.query_cache.lock().await.put(query, embedding.clone());
        Ok(embedding)
    }

    fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    async fn stats(&self) -> EmbeddingStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProvider {
        dimension: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for StubProvider {
        async fn embed_batch(&self, texts: &[&str]) -> BackendResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.1; self.dimension]).collect())
        }

        fn embedding_dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn batches_and_tracks_stats() {
        let service = DefaultEmbeddingService::new(Arc::new(StubProvider { dimension: 8 }), 2, 16);
        let texts = vec!["a", "b", "c", "d", "e"];
        let embeddings = service.generate_embeddings(texts).await.unwrap();
        assert_eq!(embeddings.len(), 5);
        let stats = service.stats().await;
        assert_eq!(stats.total_embeddings, 5);
        assert_eq!(stats.total_batches, 3);
    }

    #[tokio::test]
    async fn query_embeddings_are_cached() {
        let service = DefaultEmbeddingService::new(Arc::new(StubProvider { dimension: 4 }), 1, 16);
        let first = service.embed_query("hello").await.unwrap();
        let second = service.embed_query("hello").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(service.stats().await.cache_hits, 1);
    }
}
