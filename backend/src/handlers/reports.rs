//! HTTP handlers for aggregate reports

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::reporting::{ProductSummary, ReportingService};
use crate::AppState;

/// Warehouse-wide net stock per product
pub async fn get_stock_summary(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductSummary>>> {
    let service = ReportingService::new(state.db);
    let summary = service.stock_summary().await?;
    Ok(Json(summary))
}
