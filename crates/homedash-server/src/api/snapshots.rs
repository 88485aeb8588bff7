use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use homedash_core::Integration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct SnapshotItem {
    id: i64,
    integration: Integration,
    user_id: Option<i64>,
    document: Value,
    created_at: DateTime<Utc>,
}

impl SnapshotItem {
    fn from_row(integration: Integration, row: homedash_db::SnapshotRow) -> Self {
        Self {
            id: row.id,
            integration,
            user_id: row.user_id,
            document: row.document,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SnapshotQuery {
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
}

fn parse_integration(request_id: &str, raw: &str) -> Result<Integration, ApiError> {
    raw.parse()
        .map_err(|e: homedash_core::UnknownIntegration| {
            ApiError::new(request_id, "not_found", e.to_string())
        })
}

pub(super) async fn list_snapshots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(integration): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<ApiResponse<Vec<SnapshotItem>>>, ApiError> {
    let integration = parse_integration(&req_id.0, &integration)?;

    let rows = homedash_db::list_snapshots(
        &state.pool,
        integration,
        query.user_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SnapshotItem::from_row(integration, row))
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn latest_snapshot(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(integration): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<ApiResponse<SnapshotItem>>, ApiError> {
    let integration = parse_integration(&req_id.0, &integration)?;

    let row = homedash_db::latest_snapshot(&state.pool, integration, query.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no {integration} snapshot yet"),
            )
        })?;

    Ok(Json(ApiResponse::new(
        SnapshotItem::from_row(integration, row),
        req_id.0,
    )))
}
