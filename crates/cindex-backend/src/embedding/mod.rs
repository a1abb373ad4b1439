pub mod http;
pub mod traits;

pub use http::{DefaultEmbeddingService, HttpEmbeddingProvider};
pub use traits::{EmbeddingProvider, EmbeddingService, EmbeddingStats};
