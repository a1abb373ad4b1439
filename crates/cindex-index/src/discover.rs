//! Discover stage (spec §4.5 stage 1): walks a repository root respecting
//! `.gitignore`, gating out secret files and classifying every remaining
//! file's large-file strategy.

use std::path::Path;

use cindex_detect::{LargeFileDetector, LargeFileStrategy, SecretFilter};
use ignore::WalkBuilder;

use crate::encoding::detect_and_convert_to_utf8;

#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub rel_path: String,
    pub abs_path: std::path::PathBuf,
    pub content: String,
    pub line_count: usize,
    pub size_bytes: u64,
    pub strategy: LargeFileStrategy,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoverStats {
    pub total_entries: usize,
    pub secret_skipped: usize,
    pub binary_skipped: usize,
    pub large_file_skipped: usize,
}

/// Walks `root`, returning every non-secret, non-binary file along with its
/// discovery metadata. `.gitignore` and `.ignore` rules are honored the same
/// way a plain `git status` would see them.
pub fn discover(
    root: &Path,
    secret_filter: &SecretFilter,
    large_file: &LargeFileDetector,
) -> (Vec<DiscoveredFile>, DiscoverStats) {
    let mut files = Vec::new();
    let mut stats = DiscoverStats::default();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();

    for entry in walker.flatten() {
        let Some(file_type) = entry.file_type() else { continue };
        if !file_type.is_file() {
            continue;
        }
        stats.total_entries += 1;

        let abs_path = entry.path().to_path_buf();
        let Ok(rel_path) = abs_path.strip_prefix(root) else { continue };
        let rel_path = rel_path.to_string_lossy().replace('\\', "/");

        if secret_filter.is_secret(&rel_path) {
            stats.secret_skipped += 1;
            continue;
        }

        let Ok(bytes) = std::fs::read(&abs_path) else { continue };
        let size_bytes = bytes.len() as u64;
        let Some(decoded) = detect_and_convert_to_utf8(&bytes) else {
            stats.binary_skipped += 1;
            continue;
        };
        let line_count = decoded.content.lines().count();
        let strategy = large_file.classify(&rel_path, &decoded.content, line_count);
        if strategy == LargeFileStrategy::Skip {
            stats.large_file_skipped += 1;
            continue;
        }

        files.push(DiscoveredFile {
            rel_path,
            abs_path,
            content: decoded.content,
            line_count,
            size_bytes,
            strategy,
        });
    }

    (files, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn discovers_files_and_skips_secrets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        let mut env_file = std::fs::File::create(dir.path().join(".env")).unwrap();
        writeln!(env_file, "SECRET=1").unwrap();

        let secret_filter = SecretFilter::with_defaults().unwrap();
        let large_file = LargeFileDetector::new();
        let (files, stats) = discover(dir.path(), &secret_filter, &large_file);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].rel_path, "main.rs");
        assert_eq!(stats.secret_skipped, 1);
    }
}
