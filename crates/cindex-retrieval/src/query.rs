//! Query Processor (spec §4.6, retrieval stage 1): classifies, normalizes,
//! and embeds a raw query string. Caching lives in
//! `cindex_backend::EmbeddingService::embed_query`, so this stage just
//! calls through to it with the normalized text.

use std::sync::Arc;
use std::time::Instant;

use cindex_backend::EmbeddingService;

use crate::error::RetrievalResult;

const CODE_KEYWORDS: &[&str] = &[
    "function", "const", "let", "var", "class", "interface", "type", "import", "export",
    "return", "async", "await", "def", "public", "private", "static",
];

const CODE_SYMBOLS: &[&str] = &["=>", "===", "!==", "++", "--", "&&", "||", "::"];

const NATURAL_LANGUAGE_PATTERNS: &[&str] = &[
    "how to", "how do", "where is", "find", "search", "show me", "what is", "when", "why", "explain",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    CodeSnippet,
    NaturalLanguage,
}

#[derive(Debug, Clone)]
pub struct ProcessedQuery {
    pub normalized_text: String,
    pub query_type: QueryType,
    pub embedding: Vec<f32>,
    pub elapsed_ms: u64,
}

/// Classifies `query` per spec §4.6's ordered heuristic.
#[must_use]
pub fn classify(query: &str) -> QueryType {
    let lower = query.to_lowercase();

    let keyword_hits = CODE_KEYWORDS.iter().filter(|kw| contains_word(&lower, kw)).count();
    let symbol_hits = CODE_SYMBOLS.iter().filter(|sym| query.contains(*sym)).count();
    let special_chars = query.chars().filter(|c| "{}()[]=<>".contains(*c)).count();
    #[allow(clippy::cast_precision_loss)]
    let density = if query.is_empty() { 0.0 } else { special_chars as f64 / query.len() as f64 };

    if keyword_hits >= 2 || symbol_hits >= 1 || density > 0.10 {
        return QueryType::CodeSnippet;
    }

    if NATURAL_LANGUAGE_PATTERNS.iter().any(|p| lower.contains(p)) || query.contains('?') {
        return QueryType::NaturalLanguage;
    }

    QueryType::NaturalLanguage
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.split(|c: char| !c.is_alphanumeric()).any(|token| token == word)
}

/// Trims and collapses whitespace; strips trailing `.!?` for natural-language
/// queries only — code queries are preserved verbatim (punctuation matters).
#[must_use]
pub fn normalize(query: &str, query_type: QueryType) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    match query_type {
        QueryType::CodeSnippet => collapsed,
        QueryType::NaturalLanguage => collapsed.trim_end_matches(['.', '!', '?']).to_string(),
    }
}

pub struct QueryProcessor {
    embeddings: Arc<dyn EmbeddingService>,
}

impl QueryProcessor {
    #[must_use]
    pub fn new(embeddings: Arc<dyn EmbeddingService>) -> Self {
        Self { embeddings }
    }

    #[tracing::instrument(skip(self))]
    pub async fn process(&self, query: &str) -> RetrievalResult<ProcessedQuery> {
        let start = Instant::now();
        let query_type = classify(query);
        let normalized_text = normalize(query, query_type);
        let embedding = self.embeddings.embed_query(&normalized_text).await?;
        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(ProcessedQuery { normalized_text, query_type, embedding, elapsed_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_code_snippet_by_keywords() {
        assert_eq!(classify("function foo() { const x = 1; }"), QueryType::CodeSnippet);
    }

    #[test]
    fn classifies_code_snippet_by_symbols() {
        assert_eq!(classify("x => y.map(f)"), QueryType::CodeSnippet);
    }

    #[test]
    fn classifies_natural_language_question() {
        assert_eq!(classify("how do I connect to the database?"), QueryType::NaturalLanguage);
    }

    #[test]
    fn natural_language_strips_trailing_punctuation() {
        assert_eq!(normalize("where is the config file?", QueryType::NaturalLanguage), "where is the config file");
    }

    #[test]
    fn code_snippet_preserves_punctuation() {
        assert_eq!(normalize("arr.map(x => x + 1)", QueryType::CodeSnippet), "arr.map(x => x + 1)");
    }
}
