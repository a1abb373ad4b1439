//! Centralized configuration management for cindex.
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Environment variable overrides
//! 3. Runtime validation
//!
//! All `CINDEX_*` environment variables are documented alongside the field
//! they populate. Ranges noted in doc comments are enforced by [`Validate`].

pub mod error;
pub mod profile;
pub mod source;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use profile::Profile;
pub use validation::{Validate, validate_non_empty, validate_port, validate_range, validate_url};

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::time::Duration;

// =============================================================================
// SAFE DEFAULTS - Work for any environment (dev, staging, prod, test)
// =============================================================================

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_NAME: &str = "cindex";
const DEFAULT_DB_USER: &str = "cindex";
const DEFAULT_DB_PASSWORD: &str = "localdev123";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 2;
const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_DB_IDLE_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_AUTO_MIGRATE: bool = true;
const DEFAULT_HNSW_EF_SEARCH: u32 = 100;
const DEFAULT_HNSW_EF_CONSTRUCTION: u32 = 128;

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
const DEFAULT_EMBEDDING_CONTEXT_WINDOW: usize = 8192;
const VALID_EMBEDDING_DIMENSIONS: [usize; 5] = [384, 768, 1024, 1536, 3072];

const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SUMMARY_CONTEXT_WINDOW: usize = 8192;

const DEFAULT_BACKEND_HOST: &str = "http://localhost:11434";
const DEFAULT_BACKEND_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_BACKEND_RETRY_COUNT: u32 = 3;
const DEFAULT_BACKEND_RETRY_BASE_DELAY_MS: u64 = 200;

const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.70;
const DEFAULT_CHUNK_SIMILARITY_THRESHOLD: f64 = 0.30;
const DEFAULT_DEDUP_THRESHOLD: f64 = 0.92;
const DEFAULT_HYBRID_VECTOR_WEIGHT: f64 = 0.7;
const DEFAULT_HYBRID_KEYWORD_WEIGHT: f64 = 0.3;
const DEFAULT_HYBRID_SEARCH_ENABLED: bool = true;
const DEFAULT_API_ENDPOINT_SIMILARITY_THRESHOLD: f64 = 0.75;
const DEFAULT_API_ENDPOINT_CAP: usize = 50;
const DEFAULT_MAX_CHUNKS: usize = 100;
const DEFAULT_TOP_K_FILES: usize = 10;
const DEFAULT_IMPORT_DEPTH: u32 = 3;
const DEFAULT_WORKSPACE_DEPTH: u32 = 3;
const DEFAULT_SERVICE_DEPTH: u32 = 2;
const DEFAULT_BOUNDARY_MAX_DEPTH: u32 = 2;
const DEFAULT_MAX_CONTEXT_TOKENS: usize = 16_000;
const DEFAULT_WARN_CONTEXT_TOKENS: usize = 12_000;

const DEFAULT_INDEXING_BATCH_SIZE: usize = 8;
const DEFAULT_MAX_FILE_SIZE_LINES: usize = 5_000;
const DEFAULT_PROTECT_SECRETS: bool = true;
const DEFAULT_SECRET_PATTERNS: &str =
    ".env,.env.*,*credentials*,*secret*,*password*,id_rsa,*.pem,*.key,*.p12,*.pfx,*.jks,.npmrc,.pypirc,.netrc,.dockercfg";

const DEFAULT_QUERY_CACHE_TTL_MINUTES: u64 = 30;
const DEFAULT_QUERY_CACHE_CAPACITY: usize = 1_000;
const DEFAULT_API_CACHE_TTL_MINUTES: u64 = 30;
const DEFAULT_API_CACHE_CAPACITY: usize = 500;

/// Core configuration for the entire cindex application.
///
/// All settings have safe defaults and can be overridden via environment
/// variables (see each nested struct's doc comments) or a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Active deployment profile (development/staging/production/test).
    pub profile: Profile,
    /// Relational + vector + full-text data store.
    pub store: StoreConfig,
    /// Embedding model configuration.
    pub embedding: EmbeddingConfig,
    /// Summary model configuration.
    pub summary: SummaryConfig,
    /// Embedding/summary backend HTTP client configuration.
    pub backend: BackendConfig,
    /// Retrieval pipeline thresholds and budgets.
    pub retrieval: RetrievalConfig,
    /// Indexing orchestrator configuration.
    pub indexing: IndexingConfig,
    /// In-memory cache configuration.
    pub cache: CacheConfig,
}

impl ApplicationConfig {
    /// Build a configuration from profile-appropriate defaults, then apply
    /// environment variable overrides.
    #[must_use]
    pub fn with_profile(profile: Profile) -> Self {
        let mut config = Self {
            profile,
            store: StoreConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            summary: SummaryConfig::from_env(),
            backend: BackendConfig::from_env(),
            retrieval: RetrievalConfig::from_env(),
            indexing: IndexingConfig::from_env(),
            cache: CacheConfig::from_env(),
        };
        if profile == Profile::Test {
            config.store.max_connections = config.store.max_connections.min(3);
        }
        config
    }

    /// Load configuration purely from environment variables (profile
    /// defaults to `development` unless `CINDEX_PROFILE` is set).
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `CINDEX_PROFILE` is set to an unknown value.
    pub fn from_env() -> ConfigResult<Self> {
        let profile = std::env::var("CINDEX_PROFILE")
            .ok()
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();
        Ok(Self::with_profile(profile))
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self::with_profile(Profile::Development)
    }
}

impl Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.store.validate()?;
        self.embedding.validate()?;
        self.summary.validate()?;
        self.backend.validate()?;
        self.retrieval.validate()?;
        self.indexing.validate()?;
        self.cache.validate()?;

        if self.retrieval.similarity_threshold > self.retrieval.dedup_threshold {
            return Err(ConfigError::CrossField {
                message: format!(
                    "similarity_threshold ({}) must be <= dedup_threshold ({})",
                    self.retrieval.similarity_threshold, self.retrieval.dedup_threshold
                ),
            });
        }
        if self.store.hnsw_ef_search < self.store.hnsw_ef_construction {
            tracing::warn!(
                ef_search = self.store.hnsw_ef_search,
                ef_construction = self.store.hnsw_ef_construction,
                "hnsw_ef_search is smaller than hnsw_ef_construction; recall may suffer"
            );
        }
        let weight_sum = self.retrieval.hybrid_vector_weight + self.retrieval.hybrid_keyword_weight;
        if (weight_sum - 1.0).abs() > 0.05 {
            tracing::warn!(
                weight_sum,
                "hybrid_vector_weight + hybrid_keyword_weight should sum to ~1.0"
            );
        }
        if !VALID_EMBEDDING_DIMENSIONS.contains(&self.embedding.dimensions) {
            tracing::warn!(
                dimensions = self.embedding.dimensions,
                "embedding dimensions outside the common set {384, 768, 1024, 1536, 3072}"
            );
        }
        Ok(())
    }
}

/// Relational + vector + full-text data store configuration.
///
/// Env vars: `CINDEX_DB_HOST`, `CINDEX_DB_PORT`, `CINDEX_DB_NAME`,
/// `CINDEX_DB_USER`, `CINDEX_DB_PASSWORD` (falls back to `DB_PASSWORD`,
/// required in production), `CINDEX_DB_MAX_CONNECTIONS` (1-100),
/// `CINDEX_DB_MIN_CONNECTIONS`, `CINDEX_DB_TIMEOUT_SECONDS`,
/// `CINDEX_DB_SSL_MODE`, `CINDEX_AUTO_MIGRATE`,
/// `CINDEX_HNSW_EF_SEARCH`/`CINDEX_HNSW_EF_CONSTRUCTION` (10-1000).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub auto_migrate: bool,
    /// HNSW `ef_search` tunable for pgvector ANN queries (10-1000).
    pub hnsw_ef_search: u32,
    /// HNSW `ef_construction` tunable used when building the index (10-1000).
    pub hnsw_ef_construction: u32,
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let password = std::env::var("CINDEX_DB_PASSWORD")
            .or_else(|_| std::env::var("DB_PASSWORD"))
            .unwrap_or_else(|_| {
                tracing::warn!(
                    "CINDEX_DB_PASSWORD not set; falling back to insecure development default"
                );
                DEFAULT_DB_PASSWORD.to_string()
            });

        Self {
            host: std::env::var("CINDEX_DB_HOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string()),
            port: std::env::var("CINDEX_DB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DB_PORT),
            database: std::env::var("CINDEX_DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            user: std::env::var("CINDEX_DB_USER").unwrap_or_else(|_| DEFAULT_DB_USER.to_string()),
            password,
            ssl_mode: std::env::var("CINDEX_DB_SSL_MODE").unwrap_or_else(|_| "disable".to_string()),
            max_connections: env_u32("CINDEX_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            min_connections: env_u32("CINDEX_DB_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS),
            connect_timeout_secs: env_u64(
                "CINDEX_DB_TIMEOUT_SECONDS",
                DEFAULT_DB_TIMEOUT_SECONDS,
            ),
            idle_timeout_secs: env_u64(
                "CINDEX_DB_IDLE_TIMEOUT_SECONDS",
                DEFAULT_DB_IDLE_TIMEOUT_SECONDS,
            ),
            auto_migrate: env_bool("CINDEX_AUTO_MIGRATE", DEFAULT_AUTO_MIGRATE),
            hnsw_ef_search: env_u32("CINDEX_HNSW_EF_SEARCH", DEFAULT_HNSW_EF_SEARCH),
            hnsw_ef_construction: env_u32(
                "CINDEX_HNSW_EF_CONSTRUCTION",
                DEFAULT_HNSW_EF_CONSTRUCTION,
            ),
        }
    }

    /// A connection string with the password redacted, safe to log.
    #[must_use]
    pub fn safe_connection_string(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }

    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = match self.ssl_mode.as_str() {
            "require" => PgSslMode::Require,
            "prefer" => PgSslMode::Prefer,
            _ => PgSslMode::Disable,
        };
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    /// Build a connection pool from this configuration.
    ///
    /// # Errors
    /// Returns a `sqlx::Error` if the pool cannot be established.
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .connect_with(self.connect_options())
            .await
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_non_empty(&self.host, "store.host")?;
        validate_non_empty(&self.database, "store.database")?;
        validate_non_empty(&self.user, "store.user")?;
        validate_non_empty(&self.password, "store.password")?;
        validate_port(self.port, "store.port")?;
        validate_range(u64::from(self.max_connections), 1, 100, "store.max_connections")?;
        validate_range(u64::from(self.hnsw_ef_search), 10, 1000, "store.hnsw_ef_search")?;
        validate_range(
            u64::from(self.hnsw_ef_construction),
            10,
            1000,
            "store.hnsw_ef_construction",
        )?;
        Ok(())
    }
}

/// Embedding model configuration.
///
/// Env vars: `CINDEX_EMBEDDING_MODEL`, `CINDEX_EMBEDDING_DIMENSIONS` (1-4096),
/// `CINDEX_EMBEDDING_CONTEXT_WINDOW` (512-131072).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimensions: usize,
    pub context_window: usize,
}

impl EmbeddingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("CINDEX_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            dimensions: env_usize("CINDEX_EMBEDDING_DIMENSIONS", DEFAULT_EMBEDDING_DIMENSIONS),
            context_window: env_usize(
                "CINDEX_EMBEDDING_CONTEXT_WINDOW",
                DEFAULT_EMBEDDING_CONTEXT_WINDOW,
            ),
        }
    }
}

impl Validate for EmbeddingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_non_empty(&self.model, "embedding.model")?;
        validate_range(self.dimensions as u64, 1, 4096, "embedding.dimensions")?;
        validate_range(
            self.context_window as u64,
            512,
            131_072,
            "embedding.context_window",
        )?;
        Ok(())
    }
}

/// Summary model configuration.
///
/// Env vars: `CINDEX_SUMMARY_MODEL`, `CINDEX_SUMMARY_CONTEXT_WINDOW`,
/// `CINDEX_SUMMARY_METHOD` (`llm` or `rule_based`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub model: String,
    pub context_window: usize,
    pub method: SummaryMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMethod {
    Llm,
    RuleBased,
}

impl SummaryConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let method = match std::env::var("CINDEX_SUMMARY_METHOD").as_deref() {
            Ok("rule_based") => SummaryMethod::RuleBased,
            _ => SummaryMethod::Llm,
        };
        Self {
            model: std::env::var("CINDEX_SUMMARY_MODEL")
                .unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.to_string()),
            context_window: env_usize(
                "CINDEX_SUMMARY_CONTEXT_WINDOW",
                DEFAULT_SUMMARY_CONTEXT_WINDOW,
            ),
            method,
        }
    }
}

impl Validate for SummaryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_non_empty(&self.model, "summary.model")?;
        validate_range(
            self.context_window as u64,
            512,
            131_072,
            "summary.context_window",
        )?;
        Ok(())
    }
}

/// Embedding/summary backend HTTP client configuration.
///
/// Env vars: `CINDEX_BACKEND_HOST`, `CINDEX_BACKEND_TIMEOUT_SECONDS` (1-300),
/// `CINDEX_BACKEND_RETRY_COUNT` (1-10), `CINDEX_BACKEND_RETRY_BASE_DELAY_MS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub host: String,
    pub timeout_secs: u64,
    pub retry_count: u32,
    pub retry_base_delay_ms: u64,
}

impl BackendConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("CINDEX_BACKEND_HOST")
                .unwrap_or_else(|_| DEFAULT_BACKEND_HOST.to_string()),
            timeout_secs: env_u64(
                "CINDEX_BACKEND_TIMEOUT_SECONDS",
                DEFAULT_BACKEND_TIMEOUT_SECONDS,
            ),
            retry_count: env_u32("CINDEX_BACKEND_RETRY_COUNT", DEFAULT_BACKEND_RETRY_COUNT),
            retry_base_delay_ms: env_u64(
                "CINDEX_BACKEND_RETRY_BASE_DELAY_MS",
                DEFAULT_BACKEND_RETRY_BASE_DELAY_MS,
            ),
        }
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.host, "backend.host")?;
        validate_range(self.timeout_secs, 1, 300, "backend.timeout_secs")?;
        validate_range(u64::from(self.retry_count), 1, 10, "backend.retry_count")?;
        validate_range(
            self.retry_base_delay_ms,
            50,
            5_000,
            "backend.retry_base_delay_ms",
        )?;
        Ok(())
    }
}

/// Retrieval pipeline thresholds, weights, and budgets (spec §4.6-4.14).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub similarity_threshold: f64,
    pub chunk_similarity_threshold: f64,
    pub dedup_threshold: f64,
    pub hybrid_vector_weight: f64,
    pub hybrid_keyword_weight: f64,
    pub hybrid_search_enabled: bool,
    pub api_endpoint_similarity_threshold: f64,
    pub api_endpoint_cap: usize,
    pub max_chunks: usize,
    pub top_k_files: usize,
    pub import_depth: u32,
    pub workspace_depth: u32,
    pub service_depth: u32,
    pub boundary_max_depth: u32,
    pub max_context_tokens: usize,
    pub warn_context_tokens: usize,
    pub enable_workspace_detection: bool,
    pub enable_service_detection: bool,
    pub enable_api_endpoint_detection: bool,
    pub multi_repo_mode: bool,
}

impl RetrievalConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            similarity_threshold: env_f64(
                "CINDEX_SIMILARITY_THRESHOLD",
                DEFAULT_SIMILARITY_THRESHOLD,
            ),
            chunk_similarity_threshold: env_f64(
                "CINDEX_CHUNK_SIMILARITY_THRESHOLD",
                DEFAULT_CHUNK_SIMILARITY_THRESHOLD,
            ),
            dedup_threshold: env_f64("CINDEX_DEDUP_THRESHOLD", DEFAULT_DEDUP_THRESHOLD),
            hybrid_vector_weight: env_f64(
                "CINDEX_HYBRID_VECTOR_WEIGHT",
                DEFAULT_HYBRID_VECTOR_WEIGHT,
            ),
            hybrid_keyword_weight: env_f64(
                "CINDEX_HYBRID_KEYWORD_WEIGHT",
                DEFAULT_HYBRID_KEYWORD_WEIGHT,
            ),
            hybrid_search_enabled: env_bool(
                "CINDEX_HYBRID_SEARCH_ENABLED",
                DEFAULT_HYBRID_SEARCH_ENABLED,
            ),
            api_endpoint_similarity_threshold: env_f64(
                "CINDEX_API_ENDPOINT_SIMILARITY_THRESHOLD",
                DEFAULT_API_ENDPOINT_SIMILARITY_THRESHOLD,
            ),
            api_endpoint_cap: env_usize("CINDEX_API_ENDPOINT_CAP", DEFAULT_API_ENDPOINT_CAP),
            max_chunks: env_usize("CINDEX_MAX_CHUNKS", DEFAULT_MAX_CHUNKS),
            top_k_files: env_usize("CINDEX_TOP_K_FILES", DEFAULT_TOP_K_FILES),
            import_depth: env_u32("CINDEX_IMPORT_DEPTH", DEFAULT_IMPORT_DEPTH),
            workspace_depth: env_u32("CINDEX_WORKSPACE_DEPTH", DEFAULT_WORKSPACE_DEPTH),
            service_depth: env_u32("CINDEX_SERVICE_DEPTH", DEFAULT_SERVICE_DEPTH),
            boundary_max_depth: env_u32("CINDEX_BOUNDARY_MAX_DEPTH", DEFAULT_BOUNDARY_MAX_DEPTH),
            max_context_tokens: env_usize(
                "CINDEX_MAX_CONTEXT_TOKENS",
                DEFAULT_MAX_CONTEXT_TOKENS,
            ),
            warn_context_tokens: env_usize(
                "CINDEX_WARN_CONTEXT_TOKENS",
                DEFAULT_WARN_CONTEXT_TOKENS,
            ),
            enable_workspace_detection: env_bool("CINDEX_ENABLE_WORKSPACE_DETECTION", true),
            enable_service_detection: env_bool("CINDEX_ENABLE_SERVICE_DETECTION", true),
            enable_api_endpoint_detection: env_bool(
                "CINDEX_ENABLE_API_ENDPOINT_DETECTION",
                true,
            ),
            multi_repo_mode: env_bool("CINDEX_MULTI_REPO_MODE", true),
        }
    }
}

impl Validate for RetrievalConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            (
                "chunk_similarity_threshold",
                self.chunk_similarity_threshold,
            ),
            ("dedup_threshold", self.dedup_threshold),
            ("hybrid_vector_weight", self.hybrid_vector_weight),
            ("hybrid_keyword_weight", self.hybrid_keyword_weight),
            (
                "api_endpoint_similarity_threshold",
                self.api_endpoint_similarity_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::CrossField {
                    message: format!("retrieval.{name} ({value}) must be within 0.0..=1.0"),
                });
            }
        }
        validate_range(u64::from(self.import_depth), 1, 10, "retrieval.import_depth")?;
        validate_range(
            u64::from(self.workspace_depth),
            1,
            10,
            "retrieval.workspace_depth",
        )?;
        validate_range(u64::from(self.service_depth), 1, 10, "retrieval.service_depth")?;
        Ok(())
    }
}

/// Indexing orchestrator configuration (spec §4.4-4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub indexing_batch_size: usize,
    pub max_file_size_lines: usize,
    pub protect_secrets: bool,
    pub secret_patterns: Vec<String>,
}

impl IndexingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let patterns = std::env::var("CINDEX_SECRET_PATTERNS")
            .unwrap_or_else(|_| DEFAULT_SECRET_PATTERNS.to_string());
        Self {
            indexing_batch_size: env_usize(
                "CINDEX_INDEXING_BATCH_SIZE",
                DEFAULT_INDEXING_BATCH_SIZE,
            ),
            max_file_size_lines: env_usize(
                "CINDEX_MAX_FILE_SIZE",
                DEFAULT_MAX_FILE_SIZE_LINES,
            ),
            protect_secrets: env_bool("CINDEX_PROTECT_SECRETS", DEFAULT_PROTECT_SECRETS),
            secret_patterns: patterns
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Validate for IndexingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(
            self.indexing_batch_size as u64,
            1,
            64,
            "indexing.indexing_batch_size",
        )?;
        validate_range(
            self.max_file_size_lines as u64,
            100,
            100_000,
            "indexing.max_file_size_lines",
        )?;
        Ok(())
    }
}

/// Query-embedding and API-endpoint cache configuration (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub query_embedding_ttl_minutes: u64,
    pub query_embedding_capacity: usize,
    pub api_endpoint_cache_ttl_minutes: u64,
    pub api_endpoint_cache_capacity: usize,
}

impl CacheConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            query_embedding_ttl_minutes: env_u64(
                "CINDEX_QUERY_CACHE_TTL_MINUTES",
                DEFAULT_QUERY_CACHE_TTL_MINUTES,
            ),
            query_embedding_capacity: env_usize(
                "CINDEX_QUERY_CACHE_CAPACITY",
                DEFAULT_QUERY_CACHE_CAPACITY,
            ),
            api_endpoint_cache_ttl_minutes: env_u64(
                "CINDEX_API_CACHE_TTL_MINUTES",
                DEFAULT_API_CACHE_TTL_MINUTES,
            ),
            api_endpoint_cache_capacity: env_usize(
                "CINDEX_API_CACHE_CAPACITY",
                DEFAULT_API_CACHE_CAPACITY,
            ),
        }
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(
            self.query_embedding_ttl_minutes,
            30,
            60,
            "cache.query_embedding_ttl_minutes",
        )?;
        Ok(())
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ApplicationConfig::default();
        config.validate().expect("default config should validate");
    }

    #[test]
    fn similarity_above_dedup_is_rejected() {
        let mut config = ApplicationConfig::default();
        config.retrieval.similarity_threshold = 0.95;
        config.retrieval.dedup_threshold = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = ApplicationConfig::default();
        config.store.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trips() {
        let config = ApplicationConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: ApplicationConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.embedding.model, config.embedding.model);
    }

    #[test]
    fn secret_patterns_split_on_comma() {
        let config = IndexingConfig::from_env();
        assert!(config.secret_patterns.iter().any(|p| p == ".env"));
    }
}
