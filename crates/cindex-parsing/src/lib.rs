//! Parser registry, chunker, and token counters (spec §4.3): turns file
//! content into parsed declarations and then into embeddable chunks.

pub mod chunking;
pub mod error;
pub mod parsing;

pub use chunking::{ChunkDraft, ChunkingService, CodeSpan, TokenBudget, TokenCounter, TokenCounterRegistry};
pub use error::{ParsingError, ParsingResult};
pub use parsing::{Declaration, LanguageParser, ParseResult, ParserRegistry, get_language_from_extension};
