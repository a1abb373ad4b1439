//! Indexing pipeline (spec §4.5): discovers files in a repository root,
//! parses/chunks/summarizes/embeds each one, extracts symbols, detects
//! workspace and service boundaries, and persists the result.

pub mod discover;
pub mod encoding;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod stats;
pub mod workspace_service;

pub use discover::{DiscoverStats, DiscoveredFile, discover};
pub use error::{IndexError, IndexResult};
pub use orchestrator::IndexingOrchestrator;
pub use pipeline::{FileProcessors, ProcessedFile, process_file};
pub use progress::{ProgressEvent, ProgressReporter};
pub use stats::{FileFailure, IndexRunStats};
