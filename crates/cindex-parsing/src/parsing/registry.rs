//! Parser registry (spec §4.3 ambient detail, §9 capability interface):
//! built once at process start, one [`LanguageParser`] per supported
//! extension set.

use super::languages::LANGUAGE_REGISTRY;
use super::markdown::MarkdownParser;
use super::traits::LanguageParser;
use super::treesitter::TreeSitterParser;

pub struct ParserRegistry {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    /// Builds the default registry: one tree-sitter parser per entry in
    /// [`LANGUAGE_REGISTRY`], plus the heuristic Markdown parser.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut parsers: Vec<Box<dyn LanguageParser>> = LANGUAGE_REGISTRY
            .values()
            .map(|config| Box::new(TreeSitterParser::new(config)) as Box<dyn LanguageParser>)
            .collect();
        parsers.push(Box::new(MarkdownParser::new()));
        Self { parsers }
    }

    /// Add-on languages register by pushing onto the registry before
    /// orchestrator construction.
    pub fn register(&mut self, parser: Box<dyn LanguageParser>) {
        self.parsers.push(parser);
    }

    #[must_use]
    pub fn for_extension(&self, extension: &str) -> Option<&dyn LanguageParser> {
        let ext = extension.trim_start_matches('.');
        self.parsers
            .iter()
            .find(|p| p.extensions().contains(&ext))
            .map(std::convert::AsRef::as_ref)
    }

    #[must_use]
    pub fn for_language(&self, language_id: &str) -> Option<&dyn LanguageParser> {
        self.parsers
            .iter()
            .find(|p| p.language_id() == language_id)
            .map(std::convert::AsRef::as_ref)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_parser_by_extension() {
        let registry = ParserRegistry::with_defaults();
        assert!(registry.for_extension("rs").is_some());
        assert!(registry.for_extension("md").is_some());
        assert!(registry.for_extension("lock").is_none());
    }
}
