//! Trait abstraction for file-summary generation.

use async_trait::async_trait;

use crate::BackendResult;

/// Produces a short natural-language summary of a file's content, used to
/// build the file-summary chunk (spec §3 `File::summary`, §4.2).
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Summarize `content` (the full text of one source file).
    async fn summarize(&self, file_path: &str, content: &str) -> BackendResult<String>;

    fn method_name(&self) -> &'static str;
}
