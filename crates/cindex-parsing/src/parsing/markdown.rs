//! Markdown-as-documentation parser (spec §4.3 ambient detail): headings
//! stand in for declarations so the chunker can produce heading-scoped
//! documentation chunks.

use super::traits::{Declaration, LanguageParser, ParseResult};

pub struct MarkdownParser;

impl MarkdownParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for MarkdownParser {
    fn language_id(&self) -> &'static str {
        "markdown"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["md", "mdx", "markdown"]
    }

    fn parse(&self, content: &str) -> ParseResult {
        let lines: Vec<&str> = content.lines().collect();
        let mut declarations = Vec::new();
        let mut open: Option<(usize, String)> = None;

        for (idx, line) in lines.iter().enumerate() {
            if heading_level(line).is_none() {
                continue;
            }
            if let Some((start, name)) = open.take() {
                declarations.push(Declaration {
                    name,
                    kind: "heading".to_string(),
                    start_line: start + 1,
                    end_line: idx,
                    exported: true,
                });
            }
            open = Some((idx, line.trim_start_matches('#').trim().to_string()));
        }
        if let Some((start, name)) = open {
            declarations.push(Declaration {
                name,
                kind: "heading".to_string(),
                start_line: start + 1,
                end_line: lines.len(),
                exported: true,
            });
        }

        ParseResult {
            imports: Vec::new(),
            exports: declarations.iter().map(|d| d.name.clone()).collect(),
            declarations,
            partial: false,
        }
    }
}

fn heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes > 0 && hashes <= 6 && trimmed.as_bytes().get(hashes) == Some(&b' ') {
        Some(hashes)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sections_by_heading() {
        let parser = MarkdownParser::new();
        let content = "# Title\n\nIntro text\n\n## Usage\n\nDo the thing\n";
        let result = parser.parse(content);
        assert_eq!(result.declarations.len(), 2);
        assert_eq!(result.declarations[0].name, "Title");
        assert_eq!(result.declarations[1].name, "Usage");
    }
}
