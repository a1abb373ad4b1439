//! API Enrichment (spec §4.12, retrieval stage 6): finds API endpoints
//! touching the retrieved services, scans retrieved chunks for outbound
//! calls, and links endpoints whose implementation chunk was retrieved.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use cindex_core::{ApiEndpoint, Chunk};
use cindex_store::{ScoredEndpoint, StoreRepository};
use regex::Regex;
use serde::Serialize;

use crate::error::RetrievalResult;

static OUTBOUND_CALL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("fetch", Regex::new(r#"\bfetch\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap()),
        ("axios", Regex::new(r#"\baxios\.\w+\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap()),
        ("node-http", Regex::new(r#"\b(?:got|superagent|http|https)\.\w+\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap()),
        ("requests", Regex::new(r#"\brequests\.\w+\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap()),
        ("httpx", Regex::new(r#"\b(?:httpx|aiohttp)\.\w+\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap()),
        ("go-http", Regex::new(r#"\bhttp\.(?:Get|Post|NewRequest)\s*\(\s*"([^"]+)"#).unwrap()),
        ("reqwest", Regex::new(r#"\breqwest::\w+\s*\(\s*"([^"]+)"#).unwrap()),
        ("grpc", Regex::new(r"\b(\w+Client)::new\s*\(").unwrap()),
        ("graphql", Regex::new(r"\b(?:query|mutation)\s+(\w+)\s*[({]").unwrap()),
    ]
});

#[derive(Debug, Clone, Serialize)]
pub struct OutboundCall {
    pub source_chunk_id: uuid::Uuid,
    pub source_file: String,
    pub source_service_id: Option<String>,
    pub target_service_id: Option<String>,
    pub endpoint_path: String,
    pub method: Option<String>,
    pub call_type: &'static str,
    pub endpoint_found: bool,
    pub matched_endpoint: Option<ApiEndpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractLink {
    pub endpoint_id: uuid::Uuid,
    pub chunk_id: uuid::Uuid,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiEnrichment {
    pub endpoints: Vec<ScoredEndpoint>,
    pub outbound_calls: Vec<OutboundCall>,
    pub contract_links: Vec<ContractLink>,
    pub warnings: Vec<String>,
}

/// Finds endpoints for `service_ids`, either by vector search (when
/// `query_embedding` is available) or a plain listing, scans `chunks` for
/// outbound calls, and links endpoints whose implementation chunk appears
/// in `retrieved_chunk_ids`.
#[tracing::instrument(skip(store, query_embedding, chunks, retrieved_chunk_ids))]
pub async fn enrich_api_context(
    store: &Arc<dyn StoreRepository>,
    repo_ids: &[String],
    query_embedding: Option<&[f32]>,
    chunks: &[&Chunk],
    retrieved_chunk_ids: &HashSet<uuid::Uuid>,
    similarity_threshold: f64,
    cap: usize,
) -> RetrievalResult<ApiEnrichment> {
    let repo_filter = if repo_ids.is_empty() { None } else { Some(repo_ids) };
    let mut warnings = Vec::new();
    let endpoints: Vec<ScoredEndpoint> = match query_embedding {
        Some(embedding) => {
            let scored = store.search_api_endpoints(embedding, repo_filter, None, cap).await?;
            scored.into_iter().filter(|e| e.combined_score >= similarity_threshold).collect()
        }
        None => {
            warnings.push("no query embedding available, api enrichment skipped vector search".to_string());
            Vec::new()
        }
    };

    let mut contract_links = Vec::new();
    for scored in &endpoints {
        if scored.endpoint.deprecated {
            warnings.push(format!("endpoint {} {} is deprecated", scored.endpoint.method, scored.endpoint.path));
        }
        match &scored.endpoint.implementation {
            Some(implementation) if retrieved_chunk_ids.contains(&implementation.chunk_id) => {
                contract_links.push(ContractLink {
                    endpoint_id: scored.endpoint.endpoint_id,
                    chunk_id: implementation.chunk_id,
                    confidence: 1.0,
                });
            }
            None => warnings.push(format!("endpoint {} {} has no implementation link", scored.endpoint.method, scored.endpoint.path)),
            _ => {}
        }
    }

    let mut outbound_calls = Vec::new();
    for chunk in chunks {
        for (call_type, pattern) in OUTBOUND_CALL_PATTERNS.iter() {
            for capture in pattern.captures_iter(&chunk.content) {
                let target = capture.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
                let matched = endpoints.iter().find(|e| e.endpoint.path == target).map(|e| e.endpoint.clone());
                let endpoint_found = matched.is_some();
                if !endpoint_found {
                    warnings.push(format!("unresolved outbound call to {target} in {}", chunk.file_path));
                }
                outbound_calls.push(OutboundCall {
                    source_chunk_id: chunk.chunk_id,
                    source_file: chunk.file_path.clone(),
                    source_service_id: None,
                    target_service_id: matched.as_ref().map(|e| e.service_id.clone()),
                    endpoint_path: target,
                    method: matched.as_ref().map(|e| e.method.clone()),
                    call_type,
                    endpoint_found,
                    matched_endpoint: matched,
                });
            }
        }
    }

    Ok(ApiEnrichment { endpoints, outbound_calls, contract_links, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_fetch_call() {
        let body = r#"await fetch("https://api.example.com/v1/users")"#;
        let hits: Vec<_> = OUTBOUND_CALL_PATTERNS[0].1.captures_iter(body).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(&hits[0][1], "https://api.example.com/v1/users");
    }

    #[test]
    fn detects_grpc_client_construction() {
        let body = "let client = UserServiceClient::new(channel);";
        let hits: Vec<_> = OUTBOUND_CALL_PATTERNS.iter().find(|(name, _)| *name == "grpc").unwrap().1.captures_iter(body).collect();
        assert_eq!(hits.len(), 1);
    }
}
