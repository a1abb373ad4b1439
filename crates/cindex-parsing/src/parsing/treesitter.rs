//! Generic tree-sitter-backed [`LanguageParser`] (spec §4.3): drives any
//! registered [`LanguageConfig`] through the same parse → query → declaration
//! extraction pipeline. Malformed input never panics — tree-sitter produces
//! a best-effort tree with ERROR nodes, and the query walk simply yields
//! fewer declarations with `partial = true`.

use std::sync::Mutex;

use regex::Regex;
use tree_sitter::{Query, QueryCursor, StreamingIterator};

use super::languages::LanguageConfig;
use super::traits::{Declaration, LanguageParser, ParseResult};

static IMPORT_PATTERNS: &[(&str, &str)] = &[
    ("rust", r"^\s*use\s+([\w:{}, ]+);"),
    ("python", r"^\s*(?:from\s+[\w.]+\s+)?import\s+([\w., ]+)"),
    ("javascript", r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#),
    ("typescript", r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#),
    ("tsx", r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#),
    ("go", r#"^\s*"([^"]+)"\s*$"#),
];

static EXPORT_PATTERNS: &[(&str, &str)] = &[
    ("rust", r"^\s*pub\s+(?:fn|struct|enum|trait|mod|const|static)\s+(\w+)"),
    ("javascript", r"^\s*export\s+(?:default\s+)?(?:function|class|const|let)\s+(\w+)"),
    ("typescript", r"^\s*export\s+(?:default\s+)?(?:function|class|const|let|interface|type)\s+(\w+)"),
    ("tsx", r"^\s*export\s+(?:default\s+)?(?:function|class|const|let)\s+(\w+)"),
    ("go", r"^\s*func\s+([A-Z]\w*)"),
];

pub struct TreeSitterParser {
    config: &'static LanguageConfig,
    query: Query,
    import_re: Option<Regex>,
    export_re: Option<Regex>,
    parser: Mutex<tree_sitter::Parser>,
}

impl TreeSitterParser {
    /// # Panics
    /// Panics if `config`'s query string fails to compile against its
    /// language — this indicates a bug in [`super::languages::LANGUAGE_REGISTRY`],
    /// not a runtime condition.
    #[must_use]
    pub fn new(config: &'static LanguageConfig) -> Self {
        let query = Query::new(&config.tree_sitter_language, config.tree_sitter_query)
            .expect("registry query must compile against its own language");
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&config.tree_sitter_language)
            .expect("registry language must load");
        Self {
            config,
            query,
            import_re: find_pattern(IMPORT_PATTERNS, config.id),
            export_re: find_pattern(EXPORT_PATTERNS, config.id),
            parser: Mutex::new(parser),
        }
    }
}

fn find_pattern(table: &[(&str, &str)], id: &str) -> Option<Regex> {
    table
        .iter()
        .find(|(lang, _)| *lang == id)
        .map(|(_, pattern)| Regex::new(pattern).expect("built-in import/export pattern is valid"))
}

impl LanguageParser for TreeSitterParser {
    fn language_id(&self) -> &'static str {
        self.config.id
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.config.extensions
    }

    fn parse(&self, content: &str) -> ParseResult {
        let mut parser = self.parser.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(tree) = parser.parse(content, None) else {
            return ParseResult {
                partial: true,
                ..ParseResult::default()
            };
        };

        let mut cursor = QueryCursor::new();
        let mut declarations = Vec::new();
        let source = content.as_bytes();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source);
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let kind_name = self.query.capture_names()[capture.index as usize].to_string();
                let name = node
                    .utf8_text(source)
                    .ok()
                    .and_then(|text| text.split_whitespace().nth(1))
                    .unwrap_or("<anonymous>")
                    .trim_end_matches(['{', '(', ':'])
                    .to_string();
                declarations.push(Declaration {
                    name,
                    kind: kind_name,
                    start_line: node.start_position().row + 1,
                    end_line: node.end_position().row + 1,
                    exported: false,
                });
            }
        }

        let imports = self.import_re.as_ref().map_or_else(Vec::new, |re| {
            content
                .lines()
                .filter_map(|l| re.captures(l).map(|c| c[1].trim().to_string()))
                .collect()
        });

        let exported_names: std::collections::HashSet<String> = self
            .export_re
            .as_ref()
            .map(|re| {
                content
                    .lines()
                    .filter_map(|l| re.captures(l).map(|c| c[1].to_string()))
                    .collect()
            })
            .unwrap_or_default();
        for decl in &mut declarations {
            if exported_names.contains(&decl.name) {
                decl.exported = true;
            }
        }
        let exports = exported_names.into_iter().collect();

        ParseResult {
            imports,
            exports,
            declarations,
            partial: tree.root_node().has_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::languages::get_language_config;

    #[test]
    fn parses_rust_function_and_export() {
        let config = get_language_config("rust").unwrap();
        let parser = TreeSitterParser::new(config);
        let result = parser.parse("use std::fmt;\n\npub fn hello() {}\n");
        assert!(result.imports.iter().any(|i| i.contains("fmt")));
        assert!(result.declarations.iter().any(|d| d.name == "hello"));
        assert!(result.exports.contains(&"hello".to_string()));
    }

    #[test]
    fn malformed_input_is_marked_partial_not_thrown() {
        let config = get_language_config("rust").unwrap();
        let parser = TreeSitterParser::new(config);
        let result = parser.parse("fn broken( {{{ ???");
        assert!(result.partial);
    }
}
