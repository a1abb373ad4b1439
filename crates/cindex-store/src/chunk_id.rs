//! Deterministic, content-addressed chunk ID generation (spec §3: "chunk_id
//! stable across re-index by content address").

use sha2::{Digest, Sha256};
use uuid::{Uuid, uuid};

/// Namespace UUID for cindex chunk IDs (randomly generated once, fixed
/// forever so existing IDs stay stable across upgrades).
const CINDEX_NAMESPACE: Uuid = uuid!("a8f5c3e2-7b9d-4f2a-9e1c-3d5a7b9f1e3c");

/// Derive a stable chunk ID from everything that defines "the same chunk"
/// across a re-index: repository, file, the chunk's own kind, and its byte
/// range. Byte ranges (rather than an ordinal index) keep the ID stable even
/// if the chunker's internal splitting logic changes but the content at that
/// span doesn't.
#[must_use]
pub fn generate_chunk_id(
    repo_id: &str,
    file_path: &str,
    chunk_type: &str,
    byte_start: usize,
    byte_end: usize,
) -> Uuid {
    let data = format!("{repo_id}:{file_path}:{chunk_type}:{byte_start}:{byte_end}");
    Uuid::new_v5(&CINDEX_NAMESPACE, data.as_bytes())
}

/// SHA-256 content hash used for incremental-index skip decisions.
#[must_use]
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_is_deterministic() {
        let id1 = generate_chunk_id("org/repo", "src/main.rs", "function", 0, 100);
        let id2 = generate_chunk_id("org/repo", "src/main.rs", "function", 0, 100);
        assert_eq!(id1, id2);
        assert_eq!(id1.get_version(), Some(uuid::Version::Sha1));
    }

    #[test]
    fn chunk_id_varies_with_inputs() {
        let base = generate_chunk_id("org/repo", "src/main.rs", "function", 0, 100);
        assert_ne!(base, generate_chunk_id("org/repo", "src/main.rs", "function", 100, 200));
        assert_ne!(base, generate_chunk_id("org/repo", "src/other.rs", "function", 0, 100));
        assert_ne!(base, generate_chunk_id("org/repo", "src/main.rs", "class", 0, 100));
    }

    #[test]
    fn content_hash_is_stable_and_sensitive() {
        let content = "fn main() {}";
        assert_eq!(hash_content(content), hash_content(content));
        assert_ne!(hash_content(content), hash_content("fn main() { }"));
    }
}
