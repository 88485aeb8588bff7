//! Database operations for the per-integration snapshot tables.
//!
//! Every integration has its own append-only table with the same columns.
//! Table names come from [`Integration::table`], never from caller input.

use chrono::{DateTime, Utc};
use homedash_core::Integration;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from any `*_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub document: Value,
    pub created_at: DateTime<Utc>,
}

/// Insert a new snapshot document and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_snapshot(
    pool: &PgPool,
    integration: Integration,
    user_id: Option<i64>,
    document: &Value,
) -> Result<i64, DbError> {
    let sql = format!(
        "INSERT INTO {} (user_id, document) VALUES ($1, $2) RETURNING id",
        integration.table()
    );

    let id: i64 = sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(document)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// List recent snapshots for one owner, newest first.
///
/// Results are ordered by `created_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshots(
    pool: &PgPool,
    integration: Integration,
    user_id: Option<i64>,
    limit: i64,
) -> Result<Vec<SnapshotRow>, DbError> {
    let sql = format!(
        "SELECT id, user_id, document, created_at \
         FROM {} \
         WHERE user_id IS NOT DISTINCT FROM $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
        integration.table()
    );

    let rows = sqlx::query_as::<_, SnapshotRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Return the most recent snapshot for one owner, or `None` if none exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_snapshot(
    pool: &PgPool,
    integration: Integration,
    user_id: Option<i64>,
) -> Result<Option<SnapshotRow>, DbError> {
    Ok(list_snapshots(pool, integration, user_id, 1)
        .await?
        .into_iter()
        .next())
}

/// Count stored snapshots for one owner.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_snapshots(
    pool: &PgPool,
    integration: Integration,
    user_id: Option<i64>,
) -> Result<i64, DbError> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE user_id IS NOT DISTINCT FROM $1",
        integration.table()
    );

    let count: i64 = sqlx::query_scalar(&sql)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
