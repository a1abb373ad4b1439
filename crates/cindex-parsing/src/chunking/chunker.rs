//! Chunking service (spec §4.3): turns a parsed file into ordered,
//! non-overlapping chunks obeying a target token window, with the
//! strategy-dependent shape the large-file gate selected.

use std::sync::Arc;

use cindex_core::entities::ChunkType;
use cindex_detect::LargeFileStrategy;

use super::span::CodeSpan;
use super::traits::{TokenBudget, TokenCounter};
use crate::parsing::{Declaration, ParseResult};

#[derive(Debug, Clone)]
pub struct ChunkDraft {
    pub chunk_type: ChunkType,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub token_count: usize,
}

pub struct ChunkingService {
    token_counter: Arc<dyn TokenCounter>,
    budget: TokenBudget,
}

impl ChunkingService {
    #[must_use]
    pub const fn new(token_counter: Arc<dyn TokenCounter>, budget: TokenBudget) -> Self {
        Self { token_counter, budget }
    }

    #[must_use]
    pub fn chunk(
        &self,
        content: &str,
        parsed: &ParseResult,
        strategy: LargeFileStrategy,
    ) -> Vec<ChunkDraft> {
        match strategy {
            LargeFileStrategy::Skip => Vec::new(),
            LargeFileStrategy::StructureOnly => self.structure_only(content, parsed),
            LargeFileStrategy::SectionChunking => self.section_chunks(content),
            LargeFileStrategy::Normal => self.syntactic_chunks(content, parsed),
        }
    }

    /// Imports, exports, and top-level declaration signatures only — no
    /// bodies — for files beyond the very-large threshold.
    fn structure_only(&self, content: &str, parsed: &ParseResult) -> Vec<ChunkDraft> {
        let lines: Vec<&str> = content.lines().collect();
        let mut signature = String::new();
        for import in &parsed.imports {
            signature.push_str(import);
            signature.push('\n');
        }
        for decl in &parsed.declarations {
            if let Some(first_line) = lines.get(decl.start_line.saturating_sub(1)) {
                signature.push_str(first_line.trim());
                signature.push('\n');
            }
        }
        if signature.is_empty() {
            return Vec::new();
        }
        let token_count = self.token_counter.count(&signature);
        vec![ChunkDraft {
            chunk_type: ChunkType::Section,
            content: signature,
            start_line: 1,
            end_line: lines.len().max(1),
            token_count,
        }]
    }

    /// Coarse, syntax-unaware sections sized to the token budget, for files
    /// in the large-but-not-huge range.
    fn section_chunks(&self, content: &str) -> Vec<ChunkDraft> {
        let lines: Vec<&str> = content.lines().collect();
        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < lines.len() {
            let mut end = start;
            let mut text = String::new();
            while end < lines.len() {
                let candidate = format!("{text}{}\n", lines[end]);
                if !text.is_empty() && self.token_counter.count(&candidate) > self.budget.max {
                    break;
                }
                text = candidate;
                end += 1;
            }
            if end == start {
                end = start + 1;
                text = format!("{}\n", lines[start]);
            }
            let token_count = self.token_counter.count(&text);
            chunks.push(ChunkDraft {
                chunk_type: ChunkType::Section,
                content: text,
                start_line: start + 1,
                end_line: end,
                token_count,
            });
            start = end;
        }
        chunks
    }

    /// One chunk per top-level declaration, oversized declarations split on
    /// line boundaries to respect the token budget; declaration kinds map to
    /// [`ChunkType`], non-declaration preamble (imports, module doc) becomes
    /// a `Section` chunk.
    fn syntactic_chunks(&self, content: &str, parsed: &ParseResult) -> Vec<ChunkDraft> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return Vec::new();
        }
        let mut chunks = Vec::new();
        let mut cursor = 0usize;
        let mut decls = parsed.declarations.clone();
        decls.sort_by_key(|d| d.start_line);

        for decl in &decls {
            let decl_start = decl.start_line.saturating_sub(1).min(lines.len());
            if decl_start > cursor {
                if let Some(chunk) = self.span_chunk(&lines, cursor, decl_start, ChunkType::Section) {
                    chunks.push(chunk);
                }
            }
            let decl_end = decl.end_line.min(lines.len());
            let chunk_type = chunk_type_for(decl);
            chunks.extend(self.declaration_chunks(&lines, decl_start, decl_end, chunk_type));
            cursor = decl_end.max(decl_start);
        }
        if cursor < lines.len() {
            if let Some(chunk) = self.span_chunk(&lines, cursor, lines.len(), ChunkType::Section) {
                chunks.push(chunk);
            }
        }
        chunks
    }

    fn declaration_chunks(
        &self,
        lines: &[&str],
        start: usize,
        end: usize,
        chunk_type: ChunkType,
    ) -> Vec<ChunkDraft> {
        let Some(whole) = self.span_chunk(lines, start, end, chunk_type) else {
            return Vec::new();
        };
        if whole.token_count <= self.budget.max {
            return vec![whole];
        }
        // Oversized declaration: split into budget-sized line windows.
        let span_lines = end.saturating_sub(start).max(1);
        let windows = whole.token_count.div_ceil(self.budget.target).max(1);
        let window_size = span_lines.div_ceil(windows).max(1);
        let mut out = Vec::new();
        let mut cursor = start;
        while cursor < end {
            let window_end = (cursor + window_size).min(end);
            if let Some(chunk) = self.span_chunk(lines, cursor, window_end, chunk_type) {
                out.push(chunk);
            }
            cursor = window_end;
        }
        out
    }

    fn span_chunk(
        &self,
        lines: &[&str],
        start: usize,
        end: usize,
        chunk_type: ChunkType,
    ) -> Option<ChunkDraft> {
        if start >= end || start >= lines.len() {
            return None;
        }
        let end = end.min(lines.len());
        let text = lines[start..end].join("\n");
        if text.trim().is_empty() {
            return None;
        }
        let token_count = self.token_counter.count(&text);
        Some(ChunkDraft {
            chunk_type,
            content: text,
            start_line: start + 1,
            end_line: end,
            token_count,
        })
    }

    #[must_use]
    pub fn to_span(content: &str, start_line: usize, end_line: usize) -> CodeSpan {
        let lines: Vec<&str> = content.lines().collect();
        let start = start_line.saturating_sub(1).min(lines.len());
        let end = end_line.min(lines.len());
        let text = lines.get(start..end).unwrap_or(&[]).join("\n");
        CodeSpan {
            start_line,
            end_line,
            byte_start: 0,
            byte_end: text.len(),
            text,
        }
    }
}

fn chunk_type_for(decl: &Declaration) -> ChunkType {
    match decl.kind.as_str() {
        "function" | "arrow_function" => ChunkType::Function,
        "class" | "struct" | "enum" | "type" => ChunkType::Class,
        "method" => ChunkType::Method,
        "interface" => ChunkType::Interface,
        _ => ChunkType::Section,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::registry::TokenCounterRegistry;

    fn service() -> ChunkingService {
        let registry = TokenCounterRegistry::with_defaults();
        ChunkingService::new(registry.default_counter(), TokenBudget::new(200, 400))
    }

    #[test]
    fn syntactic_chunks_split_by_declaration() {
        let svc = service();
        let content = "use std::fmt;\n\nfn one() {\n    println!(\"one\");\n}\n\nfn two() {\n    println!(\"two\");\n}\n";
        let parsed = ParseResult {
            imports: vec!["std::fmt".to_string()],
            exports: Vec::new(),
            declarations: vec![
                Declaration {
                    name: "one".to_string(),
                    kind: "function".to_string(),
                    start_line: 3,
                    end_line: 5,
                    exported: false,
                },
                Declaration {
                    name: "two".to_string(),
                    kind: "function".to_string(),
                    start_line: 7,
                    end_line: 9,
                    exported: false,
                },
            ],
            partial: false,
        };
        let chunks = svc.chunk(content, &parsed, LargeFileStrategy::Normal);
        assert!(chunks.iter().any(|c| c.chunk_type == ChunkType::Function && c.content.contains("one")));
        assert!(chunks.iter().any(|c| c.chunk_type == ChunkType::Function && c.content.contains("two")));
    }

    #[test]
    fn skip_strategy_produces_no_chunks() {
        let svc = service();
        let parsed = ParseResult::default();
        let chunks = svc.chunk("anything", &parsed, LargeFileStrategy::Skip);
        assert!(chunks.is_empty());
    }

    #[test]
    fn structure_only_keeps_signatures_not_bodies() {
        let svc = service();
        let content = "fn one() {\n    body();\n}\n";
        let parsed = ParseResult {
            declarations: vec![Declaration {
                name: "one".to_string(),
                kind: "function".to_string(),
                start_line: 1,
                end_line: 3,
                exported: false,
            }],
            ..ParseResult::default()
        };
        let chunks = svc.chunk(content, &parsed, LargeFileStrategy::StructureOnly);
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].content.contains("body()"));
    }
}
