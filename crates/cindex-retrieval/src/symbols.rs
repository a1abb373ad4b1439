//! Symbol Resolution (spec §4.10, retrieval stage 4): for every chunk Stage
//! 3 retrieved, looks up definitions for each referenced name and attaches
//! them as resolution candidates for Stage 5 to walk.

use std::collections::HashMap;
use std::sync::Arc;

use cindex_core::{Chunk, Symbol};
use cindex_store::StoreRepository;
use serde::Serialize;

use crate::error::RetrievalResult;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolResolution {
    pub chunk_id: uuid::Uuid,
    pub name: String,
    pub matches: Vec<Symbol>,
}

/// Resolves `ChunkMetadata::referenced_names()` for every chunk against
/// `repo_id`'s symbol table. Names with no match are dropped rather than
/// carried forward as empty resolutions.
#[tracing::instrument(skip(store, chunks))]
pub async fn resolve_symbols(
    store: &Arc<dyn StoreRepository>,
    repo_id: &str,
    chunks: &[&Chunk],
) -> RetrievalResult<Vec<SymbolResolution>> {
    let mut cache: HashMap<String, Vec<Symbol>> = HashMap::new();
    let mut resolutions = Vec::new();

    for chunk in chunks {
        for name in chunk.metadata.referenced_names() {
            let matches = match cache.get(&name) {
                Some(cached) => cached.clone(),
                None => {
                    let found = store.resolve_symbol(repo_id, &name).await?;
                    cache.insert(name.clone(), found.clone());
                    found
                }
            };
            if !matches.is_empty() {
                resolutions.push(SymbolResolution { chunk_id: chunk.chunk_id, name, matches });
            }
        }
    }
    Ok(resolutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cindex_core::entities::{ChunkMetadata, ChunkType};
    use cindex_test_utils::FakeStoreRepository;

    fn chunk_with_refs(names: &[&str]) -> Chunk {
        Chunk {
            chunk_id: uuid::Uuid::new_v4(),
            repo_id: "a".to_string(),
            file_path: "src/lib.rs".to_string(),
            chunk_type: ChunkType::Function,
            content: "fn f() {}".to_string(),
            start_line: 1,
            end_line: 1,
            token_count: 3,
            metadata: ChunkMetadata { function_names: names.iter().map(|s| s.to_string()).collect(), ..ChunkMetadata::default() },
            embedding: None,
        }
    }

    #[tokio::test]
    async fn drops_names_with_no_match() {
        let store: Arc<dyn StoreRepository> = Arc::new(FakeStoreRepository::new());
        let chunk = chunk_with_refs(&["nonexistent_fn"]);
        let resolved = resolve_symbols(&store, "a", &[&chunk]).await.unwrap();
        assert!(resolved.is_empty());
    }
}
