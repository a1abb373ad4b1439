//! Detect Workspaces / Detect Services & API Endpoints (spec §4.5 stages 7
//! and 8): runs over the already-discovered file set, so no second
//! filesystem walk is needed.

use std::collections::HashMap;

use cindex_core::entities::{ApiEndpoint, ApiImplementation, RepoKind, Service, Workspace};
use globset::Glob;

use crate::discover::DiscoveredFile;

const WORKSPACE_MANIFESTS: &[&str] = &[
    "pnpm-workspace.yaml",
    "package.json",
    "nx.json",
    "lerna.json",
    "turbo.json",
    "rush.json",
];

const SERVICE_MANIFESTS: &[&str] = &["package.json", "Cargo.toml", "go.mod", "pyproject.toml", "serverless.yml"];

/// Runs workspace detection if `kind` is a repo shape that can plausibly
/// contain one (monorepos only — a single-package repo has nothing to
/// resolve glob patterns against).
#[must_use]
pub fn detect_workspaces(repo_id: &str, kind: RepoKind, files: &[DiscoveredFile]) -> Vec<Workspace> {
    if kind != RepoKind::Monorepo {
        return Vec::new();
    }

    let root_manifests: HashMap<String, String> = files
        .iter()
        .filter(|f| !f.rel_path.contains('/') && WORKSPACE_MANIFESTS.contains(&f.rel_path.as_str()))
        .map(|f| (f.rel_path.clone(), f.content.clone()))
        .collect();

    let Ok(Some(manifest)) = cindex_detect::workspace::detect_workspace_manifest(&root_manifests) else {
        return Vec::new();
    };

    let mut workspaces = Vec::new();
    for glob_pattern in &manifest.package_globs {
        let Ok(glob) = Glob::new(&format!("{}/package.json", glob_pattern.trim_end_matches('/'))) else {
            continue;
        };
        let matcher = glob.compile_matcher();
        for file in files {
            if file.rel_path.ends_with("package.json") && matcher.is_match(&file.rel_path) {
                let rel_dir = file.rel_path.trim_end_matches("package.json").trim_end_matches('/').to_string();
                let package_json: Option<serde_json::Value> = serde_json::from_str(&file.content).ok();
                workspaces.push(cindex_detect::workspace::build_workspace(
                    repo_id,
                    file.abs_path.to_string_lossy().trim_end_matches("package.json"),
                    &rel_dir,
                    package_json.as_ref(),
                ));
            }
        }
    }
    workspaces
}

/// Runs service-boundary detection for repo kinds that name service
/// boundaries explicitly.
#[must_use]
pub fn detect_services(repo_id: &str, kind: RepoKind, files: &[DiscoveredFile]) -> Vec<Service> {
    if !matches!(kind, RepoKind::Monorepo | RepoKind::Microservice) {
        return Vec::new();
    }

    if let Some(compose) = files.iter().find(|f| {
        f.rel_path == "docker-compose.yml" || f.rel_path == "docker-compose.yaml"
    }) {
        let candidates = cindex_detect::service::detect_from_docker_compose(&compose.content);
        return candidates
            .iter()
            .map(|c| {
                let service_files: Vec<String> = files
                    .iter()
                    .filter(|f| f.rel_path.starts_with(&format!("{}/", c.root_rel_path)))
                    .map(|f| f.rel_path.clone())
                    .collect();
                cindex_detect::service::build_service(repo_id, c, service_files)
            })
            .collect();
    }

    let dirs_with_manifests: Vec<(String, String)> = files
        .iter()
        .filter_map(|f| {
            let file_name = f.rel_path.rsplit('/').next()?;
            if SERVICE_MANIFESTS.contains(&file_name) && f.rel_path.contains('/') {
                let dir = f.rel_path.trim_end_matches(file_name).trim_end_matches('/').to_string();
                Some((dir, file_name.to_string()))
            } else {
                None
            }
        })
        .collect();

    let candidates = cindex_detect::service::detect_from_directory_manifests(&dirs_with_manifests);
    candidates
        .iter()
        .map(|c| {
            let service_files: Vec<String> = files
                .iter()
                .filter(|f| f.rel_path.starts_with(&format!("{}/", c.root_rel_path)))
                .map(|f| f.rel_path.clone())
                .collect();
            cindex_detect::service::build_service(repo_id, c, service_files)
        })
        .collect()
}

/// Scans source files for framework route-registration patterns, linking
/// each detected endpoint to the chunk whose line span contains it, if any.
#[must_use]
pub fn detect_api_endpoints(
    repo_id: &str,
    files: &[DiscoveredFile],
    chunk_lookup: impl Fn(&str, usize) -> Option<(uuid::Uuid, Option<String>)>,
) -> Vec<ApiEndpoint> {
    let mut endpoints = Vec::new();
    for file in files {
        if !matches!(
            file.rel_path.rsplit('.').next(),
            Some("js" | "ts" | "jsx" | "tsx" | "py" | "java" | "go" | "proto")
        ) {
            continue;
        }
        for detected in cindex_detect::api_contract::detect_in_source(&file.content) {
            let implementation = chunk_lookup(&file.rel_path, detected.line).map(|(chunk_id, function_name)| {
                ApiImplementation {
                    chunk_id,
                    file_path: file.rel_path.clone(),
                    start_line: detected.line as i64,
                    end_line: detected.line as i64,
                    function_name,
                }
            });
            endpoints.push(ApiEndpoint {
                endpoint_id: uuid::Uuid::new_v4(),
                repo_id: repo_id.to_string(),
                service_id: String::new(),
                api_type: detected.api_type,
                path: detected.path,
                method: detected.method,
                request_schema: None,
                response_schema: None,
                implementation,
                deprecated: false,
                description: None,
                tags: Vec::new(),
            });
        }
    }
    endpoints
}
