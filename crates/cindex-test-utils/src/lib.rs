//! Shared test utilities: a persistent Tokio runtime for integration tests
//! plus in-memory fakes for `StoreRepository`, `EmbeddingService`, and
//! `SummaryProvider` so the indexing and retrieval pipelines can be
//! exercised without a database or a real embedding backend.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod fake_backend;
pub mod fake_store;

pub use fake_backend::{FAKE_EMBEDDING_DIMENSION, FakeEmbeddingService, FakeSummaryProvider};
pub use fake_store::FakeStoreRepository;

static TEST_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
static COLLECTION_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Shared Tokio runtime across all integration tests, so spawned tasks
/// outliving one test's own runtime don't get killed mid-flight.
///
/// # Panics
/// Panics if the runtime cannot be created.
#[allow(clippy::expect_used)]
pub fn get_test_runtime() -> &'static tokio::runtime::Runtime {
    TEST_RUNTIME.get_or_init(|| {
        let workers = std::env::var("TEST_RUNTIME_WORKERS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or_else(|| std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(4));

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("test-runtime")
            .worker_threads(workers)
            .build()
            .expect("failed to create test runtime")
    })
}

/// Monotonically increasing counter for unique repo/collection ids across
/// tests running in parallel.
pub fn next_collection_counter() -> usize {
    COLLECTION_COUNTER.fetch_add(1, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_is_reusable() {
        let rt1 = get_test_runtime();
        let rt2 = get_test_runtime();
        assert!(std::ptr::eq(rt1, rt2));
    }

    #[test]
    fn test_counter_increments() {
        let start = next_collection_counter();
        let next = next_collection_counter();
        assert_eq!(next, start + 1);
    }
}
