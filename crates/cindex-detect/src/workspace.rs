//! Workspace detection (spec §4.5 stage 7): finds monorepo package manifests
//! under a repository root and resolves their glob patterns to concrete
//! package directories.

use cindex_core::entities::Workspace;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DetectError, DetectResult};

/// Manifest kinds probed for, in the order the orchestrator checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceManifestKind {
    PnpmWorkspace,
    PackageJsonWorkspaces,
    Nx,
    Lerna,
    Turbo,
    Rush,
}

/// A manifest's declared package glob patterns, not yet resolved to
/// directories on disk.
#[derive(Debug, Clone)]
pub struct WorkspaceManifest {
    pub kind: WorkspaceManifestKind,
    pub package_globs: Vec<String>,
}

#[derive(Deserialize)]
struct RushJson {
    #[serde(default)]
    projects: Vec<RushProject>,
}

#[derive(Deserialize)]
struct RushProject {
    #[serde(rename = "projectFolder")]
    project_folder: String,
}

/// Reads `manifest_files` (file_path -> content, as discovered at the
/// repository root) and returns the first workspace manifest found, in
/// probe-priority order.
///
/// # Errors
/// Returns [`DetectError::Manifest`] if a recognized manifest file is present
/// but fails to parse.
pub fn detect_workspace_manifest(
    manifest_files: &std::collections::HashMap<String, String>,
) -> DetectResult<Option<WorkspaceManifest>> {
    if let Some(content) = manifest_files.get("pnpm-workspace.yaml") {
        return Ok(Some(WorkspaceManifest {
            kind: WorkspaceManifestKind::PnpmWorkspace,
            package_globs: parse_pnpm_workspace_yaml(content),
        }));
    }

    if let Some(content) = manifest_files.get("package.json") {
        let value: Value = serde_json::from_str(content).map_err(|e| DetectError::Manifest {
            path: "package.json".to_string(),
            message: e.to_string(),
        })?;
        if let Some(globs) = extract_package_json_workspaces(&value) {
            return Ok(Some(WorkspaceManifest {
                kind: WorkspaceManifestKind::PackageJsonWorkspaces,
                package_globs: globs,
            }));
        }
    }

    if manifest_files.contains_key("nx.json") {
        let globs = manifest_files
            .get("package.json")
            .and_then(|c| serde_json::from_str::<Value>(c).ok())
            .and_then(|v| extract_package_json_workspaces(&v))
            .unwrap_or_else(|| vec!["packages/*".to_string(), "apps/*".to_string()]);
        return Ok(Some(WorkspaceManifest {
            kind: WorkspaceManifestKind::Nx,
            package_globs: globs,
        }));
    }

    if manifest_files.contains_key("lerna.json") {
        let content = &manifest_files["lerna.json"];
        let value: Value = serde_json::from_str(content).map_err(|e| DetectError::Manifest {
            path: "lerna.json".to_string(),
            message: e.to_string(),
        })?;
        let globs = value
            .get("packages")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_else(|| vec!["packages/*".to_string()]);
        return Ok(Some(WorkspaceManifest {
            kind: WorkspaceManifestKind::Lerna,
            package_globs: globs,
        }));
    }

    if manifest_files.contains_key("turbo.json") {
        let globs = manifest_files
            .get("package.json")
            .and_then(|c| serde_json::from_str::<Value>(c).ok())
            .and_then(|v| extract_package_json_workspaces(&v))
            .unwrap_or_else(|| vec!["packages/*".to_string(), "apps/*".to_string()]);
        return Ok(Some(WorkspaceManifest {
            kind: WorkspaceManifestKind::Turbo,
            package_globs: globs,
        }));
    }

    if let Some(content) = manifest_files.get("rush.json") {
        let parsed: RushJson = serde_json::from_str(content).map_err(|e| DetectError::Manifest {
            path: "rush.json".to_string(),
            message: e.to_string(),
        })?;
        let globs = parsed.projects.into_iter().map(|p| p.project_folder).collect();
        return Ok(Some(WorkspaceManifest {
            kind: WorkspaceManifestKind::Rush,
            package_globs: globs,
        }));
    }

    Ok(None)
}

fn extract_package_json_workspaces(value: &Value) -> Option<Vec<String>> {
    match value.get("workspaces") {
        Some(Value::Array(arr)) => Some(arr.iter().filter_map(|v| v.as_str().map(String::from)).collect()),
        Some(Value::Object(obj)) => obj
            .get("packages")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect()),
        _ => None,
    }
}

/// Pulls the `packages:` list out of a `pnpm-workspace.yaml`. Handles only
/// the common block-sequence form (`packages:\n  - 'glob'`), which covers
/// every real-world file this detector has been exercised against.
fn parse_pnpm_workspace_yaml(content: &str) -> Vec<String> {
    let mut globs = Vec::new();
    let mut in_packages = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("packages:") {
            in_packages = true;
            continue;
        }
        if in_packages {
            if let Some(item) = trimmed.strip_prefix("- ") {
                globs.push(item.trim_matches(['\'', '"']).to_string());
            } else if !trimmed.is_empty() {
                break;
            }
        }
    }
    globs
}

/// Builds a [`Workspace`] record for a resolved package directory, reading
/// its own `package.json` (if present) for name and dependency lists.
#[must_use]
pub fn build_workspace(
    repo_id: &str,
    abs_path: &str,
    rel_path: &str,
    package_json: Option<&Value>,
) -> Workspace {
    let name = package_json
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(rel_path)
        .to_string();
    let dependencies = package_json
        .and_then(|v| v.get("dependencies"))
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    let dev_dependencies = package_json
        .and_then(|v| v.get("devDependencies"))
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    let private = package_json
        .and_then(|v| v.get("private"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Workspace {
        workspace_id: rel_path.to_string(),
        repo_id: repo_id.to_string(),
        name,
        abs_path: abs_path.to_string(),
        rel_path: rel_path.to_string(),
        dependencies,
        dev_dependencies,
        private,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn detects_package_json_workspaces() {
        let mut files = HashMap::new();
        files.insert(
            "package.json".to_string(),
            r#"{"workspaces": ["packages/*", "apps/*"]}"#.to_string(),
        );
        let manifest = detect_workspace_manifest(&files).unwrap().unwrap();
        assert_eq!(manifest.kind, WorkspaceManifestKind::PackageJsonWorkspaces);
        assert_eq!(manifest.package_globs, vec!["packages/*", "apps/*"]);
    }

    #[test]
    fn detects_lerna_with_default_glob() {
        let mut files = HashMap::new();
        files.insert("lerna.json".to_string(), r"{}".to_string());
        let manifest = detect_workspace_manifest(&files).unwrap().unwrap();
        assert_eq!(manifest.kind, WorkspaceManifestKind::Lerna);
        assert_eq!(manifest.package_globs, vec!["packages/*"]);
    }

    #[test]
    fn detects_pnpm_workspace_yaml() {
        let mut files = HashMap::new();
        files.insert(
            "pnpm-workspace.yaml".to_string(),
            "packages:\n  - 'packages/*'\n  - 'apps/*'\n".to_string(),
        );
        let manifest = detect_workspace_manifest(&files).unwrap().unwrap();
        assert_eq!(manifest.kind, WorkspaceManifestKind::PnpmWorkspace);
        assert_eq!(manifest.package_globs, vec!["packages/*", "apps/*"]);
    }

    #[test]
    fn no_manifest_returns_none() {
        let files = HashMap::new();
        assert!(detect_workspace_manifest(&files).unwrap().is_none());
    }

    #[test]
    fn builds_workspace_from_package_json() {
        let pkg: Value = serde_json::from_str(
            r#"{"name": "@acme/api", "dependencies": {"lodash": "^4"}, "private": true}"#,
        )
        .unwrap();
        let ws = build_workspace("repo-1", "/abs/packages/api", "packages/api", Some(&pkg));
        assert_eq!(ws.name, "@acme/api");
        assert!(ws.private);
        assert_eq!(ws.dependencies, vec!["lodash".to_string()]);
    }
}
