//! Postgres storage for homedash: the settings document and the
//! per-integration snapshot tables.

pub mod settings;
pub mod snapshots;
pub mod store;

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub use settings::{get_settings, upsert_settings, SettingsRow};
pub use snapshots::{
    count_snapshots, insert_snapshot, latest_snapshot, list_snapshots, SnapshotRow,
};
pub use store::PgStore;

// Relative to crates/homedash-db/Cargo.toml.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

const APPLIED_MIGRATIONS_SQL: &str =
    "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true";

/// Pool sizing taken from `AppConfig`.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &homedash_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }

    /// Pool options carrying these limits.
    #[must_use]
    pub fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    config.options().connect(database_url).await
}

async fn applied_migrations(pool: &PgPool) -> i64 {
    // Missing on a fresh database.
    sqlx::query_scalar::<_, i64>(APPLIED_MIGRATIONS_SQL)
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Apply pending migrations and return how many ran.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    let before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await;

    Ok(usize::try_from(after.saturating_sub(before)).unwrap_or(0))
}

/// Round-trip a `SELECT 1` through the pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can answer.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
