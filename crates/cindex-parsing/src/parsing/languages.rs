//! Per-language tree-sitter configuration (spec §4.3): one entry per
//! supported extension set, each carrying the query used to pull top-level
//! declarations out of its syntax tree.

use std::collections::HashMap;
use std::sync::LazyLock;
use tree_sitter::Language;

#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub id: &'static str,
    pub extensions: &'static [&'static str],
    pub tree_sitter_language: Language,
    pub tree_sitter_query: &'static str,
}

pub static LANGUAGE_REGISTRY: LazyLock<HashMap<&'static str, LanguageConfig>> = LazyLock::new(|| {
    let mut registry = HashMap::new();

    registry.insert(
        "rust",
        LanguageConfig {
            id: "rust",
            extensions: &["rs"],
            tree_sitter_language: tree_sitter_rust::LANGUAGE.into(),
            tree_sitter_query: r"
                (function_item) @function
                (impl_item) @impl
                (struct_item) @struct
                (enum_item) @enum
                (trait_item) @trait
                (mod_item) @module
            ",
        },
    );

    registry.insert(
        "python",
        LanguageConfig {
            id: "python",
            extensions: &["py", "pyi"],
            tree_sitter_language: tree_sitter_python::LANGUAGE.into(),
            tree_sitter_query: r"
                (function_definition) @function
                (class_definition) @class
            ",
        },
    );

    registry.insert(
        "javascript",
        LanguageConfig {
            id: "javascript",
            extensions: &["js", "mjs", "cjs", "jsx"],
            tree_sitter_language: tree_sitter_javascript::LANGUAGE.into(),
            tree_sitter_query: r"
                (function_declaration) @function
                (arrow_function) @arrow_function
                (class_declaration) @class
                (method_definition) @method
            ",
        },
    );

    registry.insert(
        "typescript",
        LanguageConfig {
            id: "typescript",
            extensions: &["ts", "mts", "cts"],
            tree_sitter_language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tree_sitter_query: r"
                (function_declaration) @function
                (arrow_function) @arrow_function
                (class_declaration) @class
                (method_definition) @method
                (interface_declaration) @interface
            ",
        },
    );

    registry.insert(
        "tsx",
        LanguageConfig {
            id: "tsx",
            extensions: &["tsx"],
            tree_sitter_language: tree_sitter_typescript::LANGUAGE_TSX.into(),
            tree_sitter_query: r"
                (function_declaration) @function
                (arrow_function) @arrow_function
                (class_declaration) @class
                (method_definition) @method
            ",
        },
    );

    registry.insert(
        "go",
        LanguageConfig {
            id: "go",
            extensions: &["go"],
            tree_sitter_language: tree_sitter_go::LANGUAGE.into(),
            tree_sitter_query: r"
                (function_declaration) @function
                (method_declaration) @method
                (type_declaration) @type
            ",
        },
    );

    registry
});

#[must_use]
pub fn get_language_config(language_id: &str) -> Option<&'static LanguageConfig> {
    LANGUAGE_REGISTRY.get(language_id)
}

#[must_use]
pub fn get_language_from_extension(extension: &str) -> Option<&'static str> {
    let ext = extension.trim_start_matches('.');
    LANGUAGE_REGISTRY
        .values()
        .find(|cfg| cfg.extensions.contains(&ext))
        .map(|cfg| cfg.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_extensions() {
        assert_eq!(get_language_from_extension("rs"), Some("rust"));
        assert_eq!(get_language_from_extension(".tsx"), Some("tsx"));
        assert_eq!(get_language_from_extension("lock"), None);
    }
}
