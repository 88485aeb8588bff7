//! Database operations for the `app_settings` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `app_settings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettingsRow {
    pub id: i64,
    /// `None` for the global document.
    pub user_id: Option<i64>,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fetch the settings document owned by `user_id` (`None` = global).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_settings(
    pool: &PgPool,
    user_id: Option<i64>,
) -> Result<Option<SettingsRow>, DbError> {
    let row = sqlx::query_as::<_, SettingsRow>(
        "SELECT id, user_id, document, created_at, updated_at \
         FROM app_settings \
         WHERE user_id IS NOT DISTINCT FROM $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert or replace the settings document owned by `user_id`.
///
/// The document is stored as given; sections this crate does not model are
/// kept as-is.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including the check that
/// `document` is a JSON object).
pub async fn upsert_settings(
    pool: &PgPool,
    user_id: Option<i64>,
    document: &Value,
) -> Result<SettingsRow, DbError> {
    // The global row and per-user rows are guarded by different indexes.
    let conflict_target = if user_id.is_some() {
        "(user_id)"
    } else {
        "((user_id IS NULL)) WHERE user_id IS NULL"
    };
    let sql = format!(
        "INSERT INTO app_settings (user_id, document) \
         VALUES ($1, $2) \
         ON CONFLICT {conflict_target} \
         DO UPDATE SET document = EXCLUDED.document, updated_at = NOW() \
         RETURNING id, user_id, document, created_at, updated_at"
    );

    let row = sqlx::query_as::<_, SettingsRow>(&sql)
        .bind(user_id)
        .bind(document)
        .fetch_one(pool)
        .await?;

    Ok(row)
}
