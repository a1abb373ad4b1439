//! Scope Filter (spec §4.7, retrieval stage 0): resolves a `ScopeConfig`
//! into the concrete repo/service/workspace id sets later stages filter on.

use std::collections::HashSet;
use std::sync::Arc;

use cindex_common::CorrelationId;
use cindex_core::RepoKind;
use cindex_store::StoreRepository;

use crate::error::{RetrievalError, RetrievalResult};

#[derive(Debug, Clone, Default)]
pub struct BoundaryConfig {
    pub follow_dependencies: bool,
    pub max_depth: u32,
}

impl BoundaryConfig {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self { follow_dependencies: true, max_depth: 2 }
    }
}

#[derive(Debug, Clone)]
pub enum ScopeMode {
    Global,
    Repository { repo_ids: Vec<String> },
    Service { service_ids: Vec<String> },
    BoundaryAware { start_repo: String, boundary: BoundaryConfig },
}

#[derive(Debug, Clone, Default)]
pub struct ScopeConfig {
    pub mode: Option<ScopeMode>,
    pub exclude_repos: Vec<String>,
    pub exclude_services: Vec<String>,
    pub exclude_workspaces: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedScope {
    pub repo_ids: Vec<String>,
    pub service_ids: Vec<String>,
    pub workspace_ids: Vec<String>,
    pub package_names: Vec<String>,
}

/// Repo kinds excluded from `search_codebase`'s global scope; reachable only
/// through `search_references`.
const GLOBAL_EXCLUDED_KINDS: &[RepoKind] = &[RepoKind::Reference, RepoKind::Documentation];

#[tracing::instrument(skip(store, config))]
pub async fn resolve(
    store: &Arc<dyn StoreRepository>,
    config: &ScopeConfig,
) -> RetrievalResult<ResolvedScope> {
    let correlation_id = CorrelationId::new();
    let mut scope = match config.mode.as_ref().unwrap_or(&ScopeMode::Global) {
        ScopeMode::Global => {
            let repos = store.list_repositories(None).await?;
            let repo_ids = repos
                .into_iter()
                .filter(|r| !GLOBAL_EXCLUDED_KINDS.contains(&r.kind.0))
                .map(|r| r.repo_id)
                .collect();
            ResolvedScope { repo_ids, ..ResolvedScope::default() }
        }
        ScopeMode::Repository { repo_ids } => {
            if repo_ids.is_empty() {
                return Err(RetrievalError::MissingRepoIds { correlation_id });
            }
            ResolvedScope { repo_ids: repo_ids.clone(), ..ResolvedScope::default() }
        }
        ScopeMode::Service { service_ids } => {
            if service_ids.is_empty() {
                return Err(RetrievalError::MissingServiceIds { correlation_id });
            }
            let repos = store.list_repositories(None).await?;
            let mut repo_ids = HashSet::new();
            for repo in &repos {
                let services = store.list_services(&repo.repo_id).await?;
                if services.iter().any(|s| service_ids.contains(&s.service_id)) {
                    repo_ids.insert(repo.repo_id.clone());
                }
            }
            ResolvedScope {
                repo_ids: repo_ids.into_iter().collect(),
                service_ids: service_ids.clone(),
                ..ResolvedScope::default()
            }
        }
        ScopeMode::BoundaryAware { start_repo, boundary } => {
            if start_repo.is_empty() {
                return Err(RetrievalError::MissingStartRepo { correlation_id });
            }
            ResolvedScope { repo_ids: boundary_walk(store, start_repo, boundary).await?, ..ResolvedScope::default() }
        }
    };

    scope.repo_ids.retain(|id| !config.exclude_repos.contains(id));
    scope.service_ids.retain(|id| !config.exclude_services.contains(id));
    scope.workspace_ids.retain(|id| !config.exclude_workspaces.contains(id));
    Ok(scope)
}

async fn boundary_walk(
    store: &Arc<dyn StoreRepository>,
    start_repo: &str,
    boundary: &BoundaryConfig,
) -> RetrievalResult<Vec<String>> {
    let mut visited = HashSet::new();
    visited.insert(start_repo.to_string());
    if !boundary.follow_dependencies {
        return Ok(visited.into_iter().collect());
    }

    let deps = store.list_cross_repo_dependencies(start_repo, boundary.max_depth).await?;
    for dep in deps {
        if let Some(repo) = store.get_repository(&dep.target_repo_id).await? {
            if !GLOBAL_EXCLUDED_KINDS.contains(&repo.kind.0) {
                visited.insert(dep.target_repo_id);
            }
        }
    }
    Ok(visited.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cindex_test_utils::FakeStoreRepository;

    #[tokio::test]
    async fn repository_mode_requires_repo_ids() {
        let store: Arc<dyn StoreRepository> = Arc::new(FakeStoreRepository::new());
        let config = ScopeConfig { mode: Some(ScopeMode::Repository { repo_ids: vec![] }), ..ScopeConfig::default() };
        assert!(resolve(&store, &config).await.is_err());
    }

    #[tokio::test]
    async fn global_mode_excludes_reference_and_documentation_repos() {
        let store = Arc::new(FakeStoreRepository::new());
        for (id, kind) in [("a", RepoKind::Monolithic), ("b", RepoKind::Reference), ("c", RepoKind::Documentation)] {
            store
                .upsert_repository(&cindex_core::Repository {
                    repo_id: id.to_string(),
                    name: id.to_string(),
                    kind: cindex_core::entities::RepoKindColumn(kind),
                    version: None,
                    upstream_url: None,
                    workspace_config: None,
                    indexed_at: None,
                })
                .await
                .unwrap();
        }
        let store: Arc<dyn StoreRepository> = store;
        let scope = resolve(&store, &ScopeConfig::default()).await.unwrap();
        assert_eq!(scope.repo_ids, vec!["a".to_string()]);
    }
}
