//! Single-pool convenience constructors, for callers (tests, one-off tools)
//! that don't need the read/write/analytics split [`crate::pool_manager`]
//! gives the server.

use cindex_config::StoreConfig;
use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};
use crate::migrations::run_migrations;

/// Open a single pool against `config`, without running migrations.
///
/// # Errors
/// Returns [`StoreError::NotConnected`] if the pool cannot be created.
pub async fn create_pool(config: &StoreConfig) -> StoreResult<PgPool> {
    config
        .create_pool()
        .await
        .map_err(|err| StoreError::NotConnected {
            message: err.to_string(),
        })
}

/// Open a pool and ensure the schema is up to date.
///
/// # Errors
/// Returns an error if the connection or any migration fails.
pub async fn initialize_database(config: &StoreConfig) -> StoreResult<PgPool> {
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
