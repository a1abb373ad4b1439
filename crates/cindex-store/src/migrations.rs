//! Schema provisioning: `pgvector` extension, the domain tables, and the
//! `tsvector` columns that back hybrid search (spec §4.8, §6 ambient detail).

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migrations, run in order against a fresh or existing database.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply all pending migrations. Idempotent: running against an up-to-date
/// database is a no-op.
///
/// # Errors
/// Returns [`StoreError::Schema`] if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|err| StoreError::Schema {
            message: err.to_string(),
        })
}

/// Poll until migrations finish applying, used when multiple processes race
/// to migrate the same database at startup.
///
/// # Errors
/// Returns [`StoreError::Schema`] if migrations never converge within
/// `max_attempts`.
pub async fn wait_for_migrations(pool: &PgPool, max_attempts: u32) -> StoreResult<()> {
    let mut last_err = None;
    for attempt in 0..max_attempts {
        match run_migrations(pool).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::warn!(attempt, "migrations not yet applied, retrying");
                last_err = Some(err);
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }
    }
    Err(last_err.unwrap_or(StoreError::Schema {
        message: "migrations did not converge".to_string(),
    }))
}
