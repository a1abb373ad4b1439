//! Error types for code parsing and chunking.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("tree-sitter error: {0}")]
    TreeSitter(String),

    #[error("chunking error: {0}")]
    Chunking(String),

    #[error("language not supported: {0}")]
    LanguageUnsupported(String),

    #[error("token counting error: {0}")]
    TokenCounting(String),
}

pub type ParsingResult<T> = Result<T, ParsingError>;
