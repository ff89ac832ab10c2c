//! HTTP handlers for the stock movement ledger

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::movements::{MovementService, PatchMovementInput, RecordMovementInput};
use crate::AppState;
use shared::models::StockMovement;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMovementsQuery {
    pub client_id: Option<Uuid>,
}

/// List movements, optionally filtered by client
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<ListMovementsQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = MovementService::new(state.db);
    let movements = service.list(query.client_id).await?;
    Ok(Json(movements))
}

/// Record a movement; withdrawals are validated against available stock
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let service = MovementService::new(state.db);
    let movement = service.record(input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Patch the farmer comment or its read flag on a movement
pub async fn patch_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<PatchMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = MovementService::new(state.db);
    let movement = service.patch(movement_id, input).await?;
    Ok(Json(movement))
}

/// Unread-anomaly badge count for a recording user
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Count unread farmer comments on movements recorded by a user
pub async fn get_unread_anomaly_count(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = MovementService::new(state.db);
    let count = service.unread_anomaly_count(user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Export the full ledger as CSV
pub async fn export_movements(
    State(state): State<AppState>,
) -> AppResult<([(header::HeaderName, &'static str); 2], String)> {
    let service = MovementService::new(state.db);
    let csv = service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"movements.csv\"",
            ),
        ],
        csv,
    ))
}
