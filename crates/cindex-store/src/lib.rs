//! `PostgreSQL`-backed data store: repositories, files, chunks (with hybrid
//! vector + full-text search), symbols, workspaces, services, API endpoints,
//! cross-repo dependencies, and documentation chunks (spec §3, §4.8-§4.12).

pub mod chunk_id;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod pool_manager;
pub mod repository;
pub mod traits;

pub use chunk_id::{generate_chunk_id, hash_content};
pub use cindex_config::StoreConfig;
pub use error::{StoreError, StoreResult, map_db_err};
pub use migrations::{run_migrations, wait_for_migrations};
pub use pool::{create_pool, initialize_database};
pub use pool_manager::{PoolConfig, PoolManager, PoolStats};
pub use repository::PgStoreRepository;
pub use traits::{IndexStats, ScoredChunk, ScoredEndpoint, StoreRepository};
