//! Large-file strategy selection (spec §4.4): decides how much of a file's
//! body, if any, gets chunked and embedded.

use globset::{Glob, GlobSet, GlobSetBuilder};

const MINIFIED_LINE_THRESHOLD: usize = 500;
const MINIFIED_LINE_COUNT_GATE: usize = 10;
const MINIFIED_LONG_LINE_GATE: usize = 5;
const MINIFIED_VARIANCE_GATE: f64 = 10.0;
const MINIFIED_SPACE_RATIO_GATE: f64 = 0.05;

const VERY_LARGE_LINE_COUNT: usize = 5_000;
const LARGE_LINE_COUNT: usize = 1_000;

const GENERATED_GLOBS: &[&str] = &[
    "*.min.js",
    "*.bundle.js",
    "*.map",
    "*.d.ts",
    "*_generated.*",
    "*generated.*",
    "*-lock.json",
    "*-lock.yaml",
    "Cargo.lock",
    "**/dist/**",
    "**/build/**",
    "**/target/**",
    "**/node_modules/**",
    "**/vendor/**",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LargeFileStrategy {
    /// File is not indexed at all (generated or unreadable as source).
    Skip,
    /// Only imports, exports, and top-level declarations are chunked.
    StructureOnly,
    /// The file is split into coarse sections rather than syntactic chunks.
    SectionChunking,
    /// Ordinary syntactic chunking.
    Normal,
}

pub struct LargeFileDetector {
    generated: GlobSet,
}

impl LargeFileDetector {
    #[must_use]
    pub fn new() -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in GENERATED_GLOBS {
            // Patterns are fixed and known-valid; a compile failure here
            // would be a programming error, not a runtime condition.
            builder.add(Glob::new(pattern).expect("built-in generated-path glob is valid"));
        }
        Self {
            generated: builder.build().expect("built-in generated-path globset is valid"),
        }
    }

    #[must_use]
    pub fn is_generated_path(&self, path: &str) -> bool {
        self.generated.is_match(path)
    }

    /// Selects a strategy for `path` given its full `content` and line count.
    #[must_use]
    pub fn classify(&self, path: &str, content: &str, line_count: usize) -> LargeFileStrategy {
        if self.is_generated_path(path) || is_minified(content, line_count) {
            return LargeFileStrategy::Skip;
        }
        if line_count > VERY_LARGE_LINE_COUNT {
            LargeFileStrategy::StructureOnly
        } else if line_count >= LARGE_LINE_COUNT {
            LargeFileStrategy::SectionChunking
        } else {
            LargeFileStrategy::Normal
        }
    }
}

impl Default for LargeFileDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_minified(content: &str, line_count: usize) -> bool {
    if line_count < MINIFIED_LINE_COUNT_GATE {
        return false;
    }
    let lines: Vec<&str> = content.lines().collect();
    let long_lines = lines.iter().filter(|l| l.len() > MINIFIED_LINE_THRESHOLD).count();
    if long_lines > MINIFIED_LONG_LINE_GATE {
        return true;
    }

    let lengths: Vec<f64> = lines.iter().map(|l| l.len() as f64).collect();
    if lengths.len() > 1 {
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let variance =
            lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
        if variance < MINIFIED_VARIANCE_GATE {
            return true;
        }
    }

    let total_chars: usize = content.chars().filter(|c| !c.is_whitespace()).count() + content.chars().filter(|c| c.is_whitespace()).count();
    if total_chars == 0 {
        return false;
    }
    let space_count = content.chars().filter(|c| *c == ' ').count();
    let space_ratio = space_count as f64 / total_chars as f64;
    space_ratio < MINIFIED_SPACE_RATIO_GATE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat_lines(line: &str, n: usize) -> String {
        std::iter::repeat_n(line, n).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn small_file_is_normal() {
        let detector = LargeFileDetector::new();
        let content = repeat_lines("fn main() {}", 20);
        assert_eq!(
            detector.classify("src/main.rs", &content, 20),
            LargeFileStrategy::Normal
        );
    }

    #[test]
    fn large_file_uses_section_chunking() {
        let detector = LargeFileDetector::new();
        let content = repeat_lines("let x = 1;", 1_500);
        assert_eq!(
            detector.classify("src/big.rs", &content, 1_500),
            LargeFileStrategy::SectionChunking
        );
    }

    #[test]
    fn very_large_file_is_structure_only() {
        let detector = LargeFileDetector::new();
        let content = repeat_lines("let x = 1;", 6_000);
        assert_eq!(
            detector.classify("src/huge.rs", &content, 6_000),
            LargeFileStrategy::StructureOnly
        );
    }

    #[test]
    fn generated_path_is_skipped() {
        let detector = LargeFileDetector::new();
        assert_eq!(
            detector.classify("dist/app.min.js", "x", 5),
            LargeFileStrategy::Skip
        );
    }

    #[test]
    fn minified_content_is_skipped() {
        let detector = LargeFileDetector::new();
        let long_line = "a".repeat(600);
        let content = repeat_lines(&long_line, 12);
        assert_eq!(
            detector.classify("src/weird.js", &content, 12),
            LargeFileStrategy::Skip
        );
    }
}
