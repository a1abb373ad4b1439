//! API-endpoint detection (spec §4.5 stage 8): pulls endpoint descriptors out
//! of framework-specific route-registration code, and out of standalone
//! OpenAPI/GraphQL-SDL/proto spec files.

use cindex_core::entities::ApiType;
use regex::Regex;
use std::sync::LazyLock;

/// An endpoint found in source code or a spec file, before it is linked to
/// an implementation chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedEndpoint {
    pub api_type: ApiType,
    pub method: String,
    pub path: String,
    pub line: usize,
}

struct FrameworkPattern {
    regex: &'static LazyLock<Regex>,
    api_type: ApiType,
}

// Express/NestJS/Fastify: app.get('/path', ...) / router.post("/path", ...)
static JS_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:app|router)\.(get|post|put|patch|delete|options)\s*\(\s*['"]([^'"]+)['"]"#).unwrap()
});

// NestJS decorators: @Get('/path')
static NEST_DECORATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@(Get|Post|Put|Patch|Delete|Options)\s*\(\s*['"]?([^'")]*)['"]?\s*\)"#).unwrap()
});

// Spring: @GetMapping("/path"), @RequestMapping(value = "/path", method = RequestMethod.GET)
static SPRING_MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@(Get|Post|Put|Patch|Delete)Mapping\s*\(\s*(?:value\s*=\s*)?"([^"]*)""#).unwrap()
});

// Django: path('route/', views.handler) / re_path(r'^route/$', ...)
static DJANGO_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:path|re_path)\s*\(\s*r?['"]([^'"]*)['"]"#).unwrap()
});

// FastAPI: @app.get("/path") / @router.post("/path")
static FASTAPI_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@(?:app|router)\.(get|post|put|patch|delete)\s*\(\s*['"]([^'"]+)['"]"#).unwrap()
});

// gRPC proto service method: rpc MethodName (Request) returns (Response)
static GRPC_RPC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\brpc\s+(\w+)\s*\(").unwrap()
});

// Apollo/GraphQL resolver map keys under Query/Mutation: `fieldName: async (parent,`
static GRAPHQL_RESOLVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*:\s*(?:async\s*)?\(").unwrap()
});

/// Scans `content` line by line for framework route-registration patterns,
/// returning every match found. A file may match more than one framework's
/// pattern; callers should already know which framework a file belongs to
/// from its surrounding package manifest and can filter accordingly.
#[must_use]
pub fn detect_in_source(content: &str) -> Vec<DetectedEndpoint> {
    let mut found = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        if let Some(caps) = JS_ROUTE.captures(line) {
            found.push(DetectedEndpoint {
                api_type: ApiType::Rest,
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                line: line_no,
            });
        } else if let Some(caps) = NEST_DECORATOR.captures(line) {
            found.push(DetectedEndpoint {
                api_type: ApiType::Rest,
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                line: line_no,
            });
        } else if let Some(caps) = SPRING_MAPPING.captures(line) {
            found.push(DetectedEndpoint {
                api_type: ApiType::Rest,
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                line: line_no,
            });
        } else if let Some(caps) = FASTAPI_ROUTE.captures(line) {
            found.push(DetectedEndpoint {
                api_type: ApiType::Rest,
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                line: line_no,
            });
        } else if let Some(caps) = DJANGO_PATH.captures(line) {
            found.push(DetectedEndpoint {
                api_type: ApiType::Rest,
                method: "GET".to_string(),
                path: caps[1].to_string(),
                line: line_no,
            });
        } else if let Some(caps) = GRPC_RPC.captures(line) {
            found.push(DetectedEndpoint {
                api_type: ApiType::Grpc,
                method: "RPC".to_string(),
                path: caps[1].to_string(),
                line: line_no,
            });
        }
    }
    found
}

/// Scans a GraphQL resolver-map file for top-level field names under a
/// `Query`/`Mutation` block. Caller passes just the block's body lines.
#[must_use]
pub fn detect_graphql_resolvers(block_body: &str) -> Vec<DetectedEndpoint> {
    block_body
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            GRAPHQL_RESOLVER.captures(line).map(|caps| DetectedEndpoint {
                api_type: ApiType::GraphQl,
                method: "RESOLVE".to_string(),
                path: caps[1].to_string(),
                line: idx + 1,
            })
        })
        .collect()
}

/// Parses an OpenAPI/Swagger document's `paths` object (already decoded from
/// YAML/JSON into [`serde_json::Value`]) into detected endpoints.
#[must_use]
pub fn detect_from_openapi(document: &serde_json::Value) -> Vec<DetectedEndpoint> {
    let Some(paths) = document.get("paths").and_then(serde_json::Value::as_object) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for (path, methods) in paths {
        let Some(methods) = methods.as_object() else { continue };
        for method in methods.keys() {
            if matches!(
                method.to_lowercase().as_str(),
                "get" | "post" | "put" | "patch" | "delete" | "options"
            ) {
                found.push(DetectedEndpoint {
                    api_type: ApiType::Rest,
                    method: method.to_uppercase(),
                    path: path.clone(),
                    line: 0,
                });
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_express_routes() {
        let src = "app.get('/users', handler);\nrouter.post(\"/users/:id\", other);\n";
        let found = detect_in_source(src);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].method, "GET");
        assert_eq!(found[0].path, "/users");
        assert_eq!(found[1].method, "POST");
    }

    #[test]
    fn detects_nestjs_decorators() {
        let src = "@Get('/health')\nasync health() {}\n";
        let found = detect_in_source(src);
        assert_eq!(found[0].api_type, ApiType::Rest);
        assert_eq!(found[0].path, "/health");
    }

    #[test]
    fn detects_spring_mapping() {
        let src = r#"@GetMapping("/api/orders")"#;
        let found = detect_in_source(src);
        assert_eq!(found[0].method, "GET");
        assert_eq!(found[0].path, "/api/orders");
    }

    #[test]
    fn detects_grpc_rpc() {
        let src = "service Orders {\n  rpc CreateOrder (CreateOrderRequest) returns (Order);\n}\n";
        let found = detect_in_source(src);
        assert_eq!(found[0].api_type, ApiType::Grpc);
        assert_eq!(found[0].path, "CreateOrder");
    }

    #[test]
    fn parses_openapi_paths() {
        let doc: serde_json::Value = serde_json::from_str(
            r#"{"paths": {"/pets": {"get": {}, "post": {}}}}"#,
        )
        .unwrap();
        let found = detect_from_openapi(&doc);
        assert_eq!(found.len(), 2);
    }
}
