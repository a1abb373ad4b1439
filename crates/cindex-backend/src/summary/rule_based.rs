//! Deterministic, LLM-free summary provider (spec §6
//! `CINDEX_SUMMARY_METHOD=rule_based`): extracts the file's leading comment
//! block, falling back to its first non-blank line.

use async_trait::async_trait;

use super::traits::SummaryProvider;
use crate::BackendResult;

pub struct RuleBasedSummaryProvider;

impl RuleBasedSummaryProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for RuleBasedSummaryProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_comment_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("///")
        .or_else(|| trimmed.strip_prefix("//!"))
        .or_else(|| trimmed.strip_prefix("//"))
        .or_else(|| trimmed.strip_prefix('#'))
        .map(str::trim)
}

#[async_trait]
impl SummaryProvider for RuleBasedSummaryProvider {
    async fn summarize(&self, _file_path: &str, content: &str) -> BackendResult<String> {
        let mut leading_comment = Vec::new();
        for line in content.lines() {
            match strip_comment_marker(line) {
                Some(text) if !text.is_empty() => leading_comment.push(text.to_string()),
                Some(_) => {}
                None if leading_comment.is_empty() && line.trim().is_empty() => {}
                None => break,
            }
        }

        if !leading_comment.is_empty() {
            return Ok(leading_comment.join(" "));
        }

        let first_line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        Ok(first_line.trim().to_string())
    }

    fn method_name(&self) -> &'static str {
        "rule_based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_leading_doc_comment() {
        let provider = RuleBasedSummaryProvider::new();
        let content = "//! Parses widgets from YAML.\n//! Second line.\n\nfn main() {}\n";
        let summary = provider.summarize("widgets.rs", content).await.unwrap();
        assert_eq!(summary, "Parses widgets from YAML. Second line.");
    }

    #[tokio::test]
    async fn falls_back_to_first_line() {
        let provider = RuleBasedSummaryProvider::new();
        let content = "fn main() {}\n";
        let summary = provider.summarize("main.rs", content).await.unwrap();
        assert_eq!(summary, "fn main() {}");
    }
}
