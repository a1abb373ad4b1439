//! Import-Chain Expansion (spec §4.11, retrieval stage 5): walks import
//! edges from the top-N retrieved files, resolving internal imports via
//! workspace aliases and filesystem probing, detecting cycles with a
//! process-wide visited set, and shrinking the depth budget after crossing
//! workspace and service boundaries.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use cindex_core::File;
use cindex_store::StoreRepository;
use serde::Serialize;

use crate::error::RetrievalResult;

const RESOLUTION_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    DepthLimit,
    ExternalDependency,
    BoundaryCrossed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportChainEntry {
    pub file_path: String,
    pub imported_from: String,
    pub depth: u32,
    pub file_summary: Option<String>,
    pub exports: Vec<String>,
    pub circular: bool,
    pub truncated: bool,
    pub truncation_reason: Option<TruncationReason>,
    pub cross_workspace: bool,
    pub cross_service: bool,
    pub workspace_id: Option<String>,
    pub service_id: Option<String>,
}

/// `true` if `import` is external per spec §4.11: `node:*`, a URL, or a bare
/// package name with no path separator.
#[must_use]
pub fn is_external_import(import: &str) -> bool {
    if import.starts_with("node:") || import.contains("://") {
        return true;
    }
    if import.starts_with("./") || import.starts_with("../") || import.starts_with('/') || import.starts_with('@') {
        return false;
    }
    !import.contains('/')
}

/// Resolves an internal import specifier against `from_file`'s directory
/// using workspace alias substitutions first, then filesystem-style
/// extension probing, returning the best-guess target path.
#[must_use]
pub fn resolve_internal_import(from_file: &str, import: &str, aliases: &[(String, String)]) -> String {
    let substituted = aliases
        .iter()
        .find(|(prefix, _)| import.starts_with(prefix.as_str()))
        .map_or_else(|| import.to_string(), |(prefix, target)| import.replacen(prefix, target, 1));

    let joined = if substituted.starts_with("./") || substituted.starts_with("../") {
        let base = Path::new(from_file).parent().unwrap_or_else(|| Path::new(""));
        base.join(&substituted).to_string_lossy().replace('\\', "/")
    } else {
        substituted.trim_start_matches('/').to_string()
    };
    normalize_path_segments(&joined)
}

fn normalize_path_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn has_known_extension(path: &str) -> bool {
    RESOLUTION_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Extracts `(alias_prefix, target_dir)` pairs from a repository's stored
/// `workspace_config` JSON (tsconfig-style `compilerOptions.paths` plus
/// package-name-to-directory entries), sorted longest-prefix-first.
#[must_use]
pub fn extract_aliases(workspace_config: Option<&serde_json::Value>) -> Vec<(String, String)> {
    let Some(config) = workspace_config else { return Vec::new() };
    let mut aliases = Vec::new();
    if let Some(paths) = config.pointer("/compilerOptions/paths").and_then(|v| v.as_object()) {
        for (alias, targets) in paths {
            let prefix = alias.trim_end_matches('*').to_string();
            if let Some(first) = targets.as_array().and_then(|a| a.first()).and_then(|v| v.as_str()) {
                aliases.push((prefix, first.trim_end_matches('*').to_string()));
            }
        }
    }
    if let Some(packages) = config.get("packages").and_then(|v| v.as_object()) {
        for (name, dir) in packages {
            if let Some(dir) = dir.as_str() {
                aliases.push((name.clone(), dir.to_string()));
            }
        }
    }
    aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    aliases
}

struct WalkState {
    visited: HashSet<(String, String)>,
    entries: Vec<ImportChainEntry>,
}

/// Walks import edges from `seed_files` up to `import_depth` hops,
/// shrinking the remaining budget to `workspace_depth`/`service_depth` once
/// those boundaries are crossed, per spec §4.11.
#[tracing::instrument(skip(store, seed_files, aliases))]
pub async fn expand_import_chain(
    store: &Arc<dyn StoreRepository>,
    repo_id: &str,
    seed_files: &[String],
    aliases: &[(String, String)],
    import_depth: u32,
    workspace_depth: u32,
    service_depth: u32,
) -> RetrievalResult<Vec<ImportChainEntry>> {
    let mut state = WalkState { visited: HashSet::new(), entries: Vec::new() };
    for seed in seed_files {
        state.visited.insert((repo_id.to_string(), seed.clone()));
    }

    let mut frontier: Vec<(String, u32, Option<String>, Option<String>)> =
        seed_files.iter().map(|f| (f.clone(), import_depth, None, None)).collect();

    while let Some((file_path, budget, workspace_id, service_id)) = frontier.pop() {
        if budget == 0 {
            continue;
        }
        let Ok(Some(file)) = get_file(store, repo_id, &file_path).await else { continue };

        for import in &file.imports {
            if is_external_import(import) {
                continue;
            }
            let target = resolve_internal_import(&file_path, import, aliases);
            let target = if has_known_extension(&target) { target } else { format!("{target}.ts") };

            let key = (repo_id.to_string(), target.clone());
            let circular = state.visited.contains(&key);

            let target_file = get_file(store, repo_id, &target).await.ok().flatten();
            let cross_workspace = target_file.as_ref().is_some_and(|f| f.workspace_id != workspace_id);
            let cross_service = target_file.as_ref().is_some_and(|f| f.service_id != service_id);

            let mut next_budget = budget.saturating_sub(1);
            let mut truncation_reason = None;
            if cross_service {
                next_budget = next_budget.min(service_depth);
                truncation_reason = Some(TruncationReason::BoundaryCrossed);
            } else if cross_workspace {
                next_budget = next_budget.min(workspace_depth);
                truncation_reason = Some(TruncationReason::BoundaryCrossed);
            }
            let truncated = circular || next_budget == 0;
            if !circular && next_budget > 0 {
                truncation_reason = None;
            } else if truncated && truncation_reason.is_none() {
                truncation_reason = Some(TruncationReason::DepthLimit);
            }

            state.entries.push(ImportChainEntry {
                file_path: target.clone(),
                imported_from: file_path.clone(),
                depth: import_depth - budget,
                file_summary: target_file.as_ref().and_then(|f| f.summary.clone()),
                exports: target_file.as_ref().map(|f| f.exports.clone()).unwrap_or_default(),
                circular,
                truncated,
                truncation_reason,
                cross_workspace,
                cross_service,
                workspace_id: target_file.as_ref().and_then(|f| f.workspace_id.clone()),
                service_id: target_file.as_ref().and_then(|f| f.service_id.clone()),
            });

            if !circular && target_file.is_some() {
                state.visited.insert(key);
                frontier.push((
                    target,
                    next_budget,
                    target_file.as_ref().and_then(|f| f.workspace_id.clone()),
                    target_file.as_ref().and_then(|f| f.service_id.clone()),
                ));
            }
        }
    }
    Ok(state.entries)
}

async fn get_file(store: &Arc<dyn StoreRepository>, repo_id: &str, file_path: &str) -> RetrievalResult<Option<File>> {
    if let Some(file) = store.get_file(repo_id, file_path).await? {
        return Ok(Some(file));
    }
    // Fall back to the file-summary chunk for files indexed before a `files`
    // row existed for them; workspace/service linkage is unknown either way.
    let summaries = store.get_file_summaries(repo_id, std::slice::from_ref(&file_path.to_string())).await?;
    Ok(summaries.first().map(|chunk| File {
        repo_id: repo_id.to_string(),
        file_path: file_path.to_string(),
        language: None,
        total_lines: 0,
        imports: chunk.metadata.dependencies.clone(),
        exports: chunk.metadata.function_names.iter().chain(chunk.metadata.class_names.iter()).cloned().collect(),
        summary: Some(chunk.content.clone()),
        summary_embedding: None,
        workspace_id: None,
        service_id: None,
        package_name: None,
        content_hash: String::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_external_imports() {
        assert!(is_external_import("node:fs"));
        assert!(is_external_import("react"));
        assert!(is_external_import("https://example.com/mod.js"));
    }

    #[test]
    fn classifies_internal_imports() {
        assert!(!is_external_import("./utils"));
        assert!(!is_external_import("../lib/helpers"));
        assert!(!is_external_import("@app/shared"));
        assert!(!is_external_import("/abs/path"));
    }

    #[test]
    fn resolves_relative_import() {
        let resolved = resolve_internal_import("src/a/b.ts", "../c", &[]);
        assert_eq!(resolved, "src/c");
    }

    #[test]
    fn resolves_alias_import() {
        let aliases = vec![("@app/".to_string(), "src/app/".to_string())];
        let resolved = resolve_internal_import("src/index.ts", "@app/widgets/button", &aliases);
        assert_eq!(resolved, "src/app/widgets/button");
    }
}
