//! Secret-file gate (spec §4.4): glob matching against paths that commonly
//! carry credentials, so the indexer never embeds their contents.

use std::sync::atomic::{AtomicUsize, Ordering};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{DetectError, DetectResult};

/// Default patterns. `.env.example`/`.sample`/`.template`/`.dist`/`.tmpl`
/// variants are intentionally excluded by listing the bare `.env` and
/// `.env.*` negation below, handled in [`SecretFilter::is_secret`].
const DEFAULT_PATTERNS: &[&str] = &[
    ".env",
    ".env.*",
    "*credentials*",
    "*secret*",
    "*password*",
    "id_rsa",
    "id_rsa.*",
    "id_dsa",
    "id_ecdsa",
    "id_ed25519",
    "*.pem",
    "*.key",
    "*.crt",
    "*.cer",
    "*.p12",
    "*.pfx",
    "*.jks",
    "*.keystore",
    ".npmrc",
    ".pypirc",
    ".netrc",
    ".dockercfg",
    ".docker/config.json",
];

/// File suffixes that make an `.env.*` match a safe template, not a secret.
const ENV_EXAMPLE_SUFFIXES: &[&str] = &["example", "sample", "template", "dist", "tmpl"];

struct PatternEntry {
    pattern: String,
    hits: AtomicUsize,
}

/// Matches candidate file paths against a set of glob patterns, tracking how
/// often each pattern fires.
pub struct SecretFilter {
    set: GlobSet,
    entries: Vec<PatternEntry>,
}

impl SecretFilter {
    /// Builds a filter from the built-in default patterns.
    ///
    /// # Errors
    /// Returns [`DetectError::Pattern`] if a default pattern somehow fails to
    /// compile (this would indicate a bug in `DEFAULT_PATTERNS`).
    pub fn with_defaults() -> DetectResult<Self> {
        Self::new(DEFAULT_PATTERNS.iter().map(|s| (*s).to_string()))
    }

    /// Builds a filter from a caller-supplied pattern list, replacing the
    /// defaults entirely. Use [`Self::with_defaults_and_extra`] to extend
    /// instead of replace.
    ///
    /// # Errors
    /// Returns [`DetectError::Pattern`] if any pattern is not valid glob
    /// syntax.
    pub fn new(patterns: impl IntoIterator<Item = String>) -> DetectResult<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut entries = Vec::new();
        for pattern in patterns {
            let glob = Glob::new(&pattern).map_err(|e| DetectError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
            entries.push(PatternEntry {
                pattern,
                hits: AtomicUsize::new(0),
            });
        }
        let set = builder.build().map_err(|e| DetectError::Pattern {
            pattern: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self { set, entries })
    }

    /// Builds a filter from the defaults plus additional custom patterns.
    ///
    /// # Errors
    /// Returns [`DetectError::Pattern`] if any custom pattern is invalid.
    pub fn with_defaults_and_extra(extra: impl IntoIterator<Item = String>) -> DetectResult<Self> {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .map(|s| (*s).to_string())
            .chain(extra);
        Self::new(patterns)
    }

    /// Returns true if `path` matches any configured secret pattern, and
    /// records per-pattern hit counts for the matching patterns.
    #[must_use]
    pub fn is_secret(&self, path: &str) -> bool {
        if is_env_template(path) {
            return false;
        }
        let matches = self.set.matches(path);
        if matches.is_empty() {
            return false;
        }
        for idx in &matches {
            self.entries[*idx].hits.fetch_add(1, Ordering::Relaxed);
        }
        true
    }

    /// Snapshot of per-pattern match counts, most-matched first.
    #[must_use]
    pub fn stats(&self) -> Vec<(String, usize)> {
        let mut stats: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.pattern.clone(), e.hits.load(Ordering::Relaxed)))
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }
}

fn is_env_template(path: &str) -> bool {
    let Some(file_name) = path.rsplit('/').next() else {
        return false;
    };
    let Some(suffix) = file_name.strip_prefix(".env.") else {
        return false;
    };
    ENV_EXAMPLE_SUFFIXES.contains(&suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_secret_patterns() {
        let filter = SecretFilter::with_defaults().unwrap();
        assert!(filter.is_secret(".env"));
        assert!(filter.is_secret("config/credentials.yml"));
        assert!(filter.is_secret("keys/id_rsa"));
        assert!(filter.is_secret("certs/server.pem"));
        assert!(!filter.is_secret("src/main.rs"));
    }

    #[test]
    fn env_example_variants_are_not_secret() {
        let filter = SecretFilter::with_defaults().unwrap();
        assert!(!filter.is_secret(".env.example"));
        assert!(!filter.is_secret(".env.sample"));
        assert!(!filter.is_secret(".env.template"));
        assert!(filter.is_secret(".env.production"));
    }

    #[test]
    fn tracks_per_pattern_hit_counts() {
        let filter = SecretFilter::with_defaults().unwrap();
        filter.is_secret(".env");
        filter.is_secret(".env");
        let stats = filter.stats();
        let env_hits = stats.iter().find(|(p, _)| p == ".env").unwrap().1;
        assert_eq!(env_hits, 2);
    }

    #[test]
    fn custom_patterns_extend_defaults() {
        let filter =
            SecretFilter::with_defaults_and_extra(["*.vault".to_string()]).unwrap();
        assert!(filter.is_secret("app.vault"));
        assert!(filter.is_secret(".env"));
    }
}
