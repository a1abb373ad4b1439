//! Deterministic embedding and summary test doubles. The fake embedder
//! hashes each text into a fixed-size vector so cosine similarity stays
//! stable across runs without calling out to a real model.

use async_trait::async_trait;
use cindex_backend::{BackendResult, EmbeddingProvider, EmbeddingService, EmbeddingStats, SummaryProvider};

pub const FAKE_EMBEDDING_DIMENSION: usize = 16;

#[derive(Debug, Default)]
pub struct FakeEmbeddingService;

fn hash_embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; FAKE_EMBEDDING_DIMENSION];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % FAKE_EMBEDDING_DIMENSION] += f32::from(byte) / 255.0;
    }
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingService {
    async fn embed_batch(&self, texts: &[&str]) -> BackendResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_embed(t)).collect())
    }

    fn embedding_dimension(&self) -> usize {
        FAKE_EMBEDDING_DIMENSION
    }

    fn model_name(&self) -> &str {
        "fake-embedder"
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbeddingService {
    async fn generate_embeddings(&self, texts: Vec<&str>) -> BackendResult<Vec<Vec<f32>>> {
        self.embed_batch(&texts).await
    }

    async fn embed_query(&self, query: &str) -> BackendResult<Vec<f32>> {
        Ok(hash_embed(query))
    }

    fn provider(&self) -> &dyn EmbeddingProvider {
        self
    }

    async fn stats(&self) -> EmbeddingStats {
        EmbeddingStats {
            model_name: self.model_name().to_string(),
            embedding_dimension: FAKE_EMBEDDING_DIMENSION,
            ..EmbeddingStats::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeSummaryProvider;

#[async_trait]
impl SummaryProvider for FakeSummaryProvider {
    async fn summarize(&self, file_path: &str, content: &str) -> BackendResult<String> {
        Ok(format!("{file_path}: {} lines", content.lines().count()))
    }

    fn method_name(&self) -> &'static str {
        "fake"
    }
}
