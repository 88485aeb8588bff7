use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use homedash_core::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct SettingsItem {
    user_id: Option<i64>,
    document: Value,
    updated_at: DateTime<Utc>,
}

impl From<homedash_db::SettingsRow> for SettingsItem {
    fn from(row: homedash_db::SettingsRow) -> Self {
        Self {
            user_id: row.user_id,
            document: row.document,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerQuery {
    pub user_id: Option<i64>,
}

pub(super) async fn get_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<SettingsItem>>, ApiError> {
    let row = homedash_db::get_settings(&state.pool, query.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no settings document"))?;

    Ok(Json(ApiResponse::new(row.into(), req_id.0)))
}

/// Replace the settings document. Sections the pipelines know about must
/// decode; everything else is stored untouched.
pub(super) async fn put_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OwnerQuery>,
    Json(document): Json<Value>,
) -> Result<Json<ApiResponse<SettingsItem>>, ApiError> {
    if !document.is_object() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "settings document must be a JSON object",
        ));
    }
    if let Err(e) = Settings::from_document(document.clone()) {
        return Err(ApiError::new(req_id.0, "validation_error", e.to_string()));
    }

    let row = homedash_db::upsert_settings(&state.pool, query.user_id, &document)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(user_id = ?query.user_id, "settings document replaced");
    Ok(Json(ApiResponse::new(row.into(), req_id.0)))
}
