//! LRU query-embedding cache (spec §6 `CINDEX_QUERY_CACHE_TTL_MINUTES`,
//! `CINDEX_QUERY_CACHE_CAPACITY`).

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

struct Entry {
    embedding: Vec<f32>,
    inserted_at: Instant,
}

/// Capacity-bounded, TTL-respecting cache from query text to its embedding.
pub struct QueryEmbeddingCache {
    inner: LruCache<String, Entry>,
    ttl: Duration,
}

impl QueryEmbeddingCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, Duration::from_secs(30 * 60))
    }

    #[must_use]
    pub fn with_ttl(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn get(&mut self, query: &str) -> Option<Vec<f32>> {
        let expired = self
            .inner
            .peek(query)
            .is_some_and(|entry| entry.inserted_at.elapsed() > self.ttl);
        if expired {
            self.inner.pop(query);
            return None;
        }
        self.inner.get(query).map(|entry| entry.embedding.clone())
    }

    pub fn put(&mut self, query: &str, embedding: Vec<f32>) {
        self.inner.put(
            query.to_string(),
            Entry {
                embedding,
                inserted_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_expired_entries() {
        let mut cache = QueryEmbeddingCache::with_ttl(4, Duration::from_millis(0));
        cache.put("q", vec![1.0]);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("q"), None);
    }

    #[test]
    fn returns_cached_value_within_ttl() {
        let mut cache = QueryEmbeddingCache::new(4);
        cache.put("q", vec![1.0, 2.0]);
        assert_eq!(cache.get("q"), Some(vec![1.0, 2.0]));
    }
}
