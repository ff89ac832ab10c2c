//! Stock movement (ledger entry) model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::MovementType;

/// A single recorded stock event for a client and product.
///
/// Ledger rows are append-only: once inserted, every field is immutable
/// except `farmer_comment` and `is_comment_read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub product: String,
    /// Gross weight as read from the scale (product plus any boxes), in kg.
    pub total_weight: Decimal,
    pub plastic_box_count: Option<i32>,
    /// Unit weight of one plastic box, in kg.
    pub plastic_box_weight: Option<Decimal>,
    pub wood_box_count: Option<i32>,
    /// Unit weight of one wood box, in kg.
    pub wood_box_weight: Option<Decimal>,
    /// Net product weight, derived at creation time and stored.
    pub product_weight: Decimal,
    #[serde(rename = "recordedByUserId")]
    pub recorded_by: Uuid,
    pub comment: Option<String>,
    /// Anomaly note the linked farmer may attach after the fact.
    pub farmer_comment: Option<String>,
    pub is_comment_read: bool,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/// Current stock position for a client, folded from the full ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBalance {
    pub total_weight: Decimal,
    pub product_weight: Decimal,
    pub plastic_boxes: i64,
    pub wood_boxes: i64,
}
