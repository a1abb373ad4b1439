pub mod chunker;
pub mod registry;
pub mod span;
pub mod tiktoken_counter;
pub mod traits;

pub use chunker::{ChunkDraft, ChunkingService};
pub use registry::TokenCounterRegistry;
pub use span::CodeSpan;
pub use tiktoken_counter::TiktokenCounter;
pub use traits::{TokenBudget, TokenCounter};
