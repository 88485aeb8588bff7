//! Postgres-backed implementation of the pipeline storage ports.

use homedash_core::{Settings, SettingsSource, Snapshot, SnapshotSink, StoreError};
use sqlx::PgPool;

use crate::DbError;

/// Settings source and snapshot sink over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        StoreError::Backend(Box::new(e))
    }
}

impl SettingsSource for PgStore {
    async fn load_settings(&self, user_id: Option<i64>) -> Result<Settings, StoreError> {
        let row = crate::get_settings(&self.pool, user_id)
            .await?
            .ok_or(StoreError::SettingsNotFound { user_id })?;

        serde_json::from_value(row.document).map_err(StoreError::InvalidSettings)
    }
}

impl SnapshotSink for PgStore {
    async fn insert_snapshot(
        &self,
        user_id: Option<i64>,
        snapshot: &Snapshot,
    ) -> Result<i64, StoreError> {
        let document = snapshot.to_document(user_id).map_err(StoreError::Serialize)?;
        let id = crate::insert_snapshot(&self.pool, snapshot.integration(), user_id, &document)
            .await?;

        Ok(id)
    }
}
