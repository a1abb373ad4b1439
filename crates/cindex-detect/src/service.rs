//! Service-boundary detection (spec §4.5 stage 8): infers microservice
//! boundaries from directory layout, `docker-compose.yml`, or manifests.

use cindex_core::entities::{Service, ServiceKind};
use serde_json::Value;

/// A service boundary candidate discovered before its member files are
/// attached.
#[derive(Debug, Clone)]
pub struct ServiceCandidate {
    pub service_id: String,
    pub name: String,
    pub kind: ServiceKind,
    pub root_rel_path: String,
}

/// Scans a docker-compose file's top-level `services:` map for named
/// services, classifying each by its `build`/`image` shape.
#[must_use]
pub fn detect_from_docker_compose(content: &str) -> Vec<ServiceCandidate> {
    let mut candidates = Vec::new();
    let mut in_services = false;
    let mut current_indent: Option<usize> = None;
    for line in content.lines() {
        if line.trim_start().starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if trimmed == "services:" {
            in_services = true;
            current_indent = None;
            continue;
        }
        if !in_services {
            continue;
        }
        if indent == 0 {
            break;
        }
        if let Some(base) = current_indent {
            if indent > base {
                continue;
            }
        } else {
            current_indent = Some(indent);
        }
        if indent == current_indent.unwrap_or(indent) {
            if let Some(name) = trimmed.strip_suffix(':') {
                candidates.push(ServiceCandidate {
                    service_id: name.to_string(),
                    name: name.to_string(),
                    kind: ServiceKind::Docker,
                    root_rel_path: name.to_string(),
                });
            }
        }
    }
    candidates
}

/// Infers services from top-level directories that each carry their own
/// manifest (`package.json`, `Cargo.toml`, `go.mod`, `pyproject.toml`), a
/// common layout for repos without an explicit compose file.
#[must_use]
pub fn detect_from_directory_manifests(dirs_with_manifests: &[(String, String)]) -> Vec<ServiceCandidate> {
    dirs_with_manifests
        .iter()
        .map(|(dir, manifest_name)| {
            let kind = match manifest_name.as_str() {
                "serverless.yml" | "serverless.yaml" => ServiceKind::Serverless,
                "pubspec.yaml" => ServiceKind::Mobile,
                "Cargo.toml" if dir.contains("lib") => ServiceKind::Library,
                _ => ServiceKind::Other,
            };
            ServiceCandidate {
                service_id: dir.clone(),
                name: dir.rsplit('/').next().unwrap_or(dir).to_string(),
                kind,
                root_rel_path: dir.clone(),
            }
        })
        .collect()
}

#[must_use]
pub fn build_service(repo_id: &str, candidate: &ServiceCandidate, files: Vec<String>) -> Service {
    Service {
        service_id: candidate.service_id.clone(),
        repo_id: repo_id.to_string(),
        name: candidate.name.clone(),
        kind: candidate.kind,
        files,
    }
}

/// Classifies a manifest's declared dependencies to override the default
/// [`ServiceKind::Other`] guess, e.g. React Native / Expo manifests imply
/// [`ServiceKind::Mobile`].
#[must_use]
pub fn refine_kind_from_package_json(package_json: &Value, default: ServiceKind) -> ServiceKind {
    let deps = package_json
        .get("dependencies")
        .and_then(Value::as_object);
    if let Some(deps) = deps {
        if deps.contains_key("react-native") || deps.contains_key("expo") {
            return ServiceKind::Mobile;
        }
        if deps.contains_key("aws-lambda") || deps.contains_key("serverless-http") {
            return ServiceKind::Serverless;
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_docker_compose_service_names() {
        let compose = "version: '3'\nservices:\n  api:\n    build: .\n  worker:\n    image: redis\n";
        let candidates = detect_from_docker_compose(compose);
        let names: Vec<_> = candidates.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["api", "worker"]);
        assert_eq!(candidates[0].kind, ServiceKind::Docker);
    }

    #[test]
    fn classifies_serverless_manifest() {
        let candidates = detect_from_directory_manifests(&[(
            "services/checkout".to_string(),
            "serverless.yml".to_string(),
        )]);
        assert_eq!(candidates[0].kind, ServiceKind::Serverless);
        assert_eq!(candidates[0].name, "checkout");
    }

    #[test]
    fn refines_kind_from_react_native_deps() {
        let pkg: Value =
            serde_json::from_str(r#"{"dependencies": {"react-native": "0.74.0"}}"#).unwrap();
        assert_eq!(
            refine_kind_from_package_json(&pkg, ServiceKind::Other),
            ServiceKind::Mobile
        );
    }
}
