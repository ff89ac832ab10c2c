//! Stock movement ledger service
//!
//! Movements are append-only: rows are inserted with a server-stamped date
//! and never updated afterwards, except for the farmer's anomaly comment and
//! its read flag. Balances are always recomputed by folding the full row set
//! for a client; nothing incremental is stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{StockBalance, StockMovement};
use shared::stock;
use shared::types::MovementType;

/// Movement service for the stock ledger
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Ledger row as stored; the movement type column is text
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    client_id: Uuid,
    movement_type: String,
    product: String,
    total_weight: Decimal,
    plastic_box_count: Option<i32>,
    plastic_box_weight: Option<Decimal>,
    wood_box_count: Option<i32>,
    wood_box_weight: Option<Decimal>,
    product_weight: Decimal,
    recorded_by: Uuid,
    comment: Option<String>,
    farmer_comment: Option<String>,
    is_comment_read: bool,
    created_at: DateTime<Utc>,
}

fn movement_from_row(row: MovementRow) -> AppResult<StockMovement> {
    Ok(StockMovement {
        id: row.id,
        client_id: row.client_id,
        movement_type: row.movement_type.parse().map_err(AppError::Internal)?,
        product: row.product,
        total_weight: row.total_weight,
        plastic_box_count: row.plastic_box_count,
        plastic_box_weight: row.plastic_box_weight,
        wood_box_count: row.wood_box_count,
        wood_box_weight: row.wood_box_weight,
        product_weight: row.product_weight,
        recorded_by: row.recorded_by,
        comment: row.comment,
        farmer_comment: row.farmer_comment,
        is_comment_read: row.is_comment_read,
        created_at: row.created_at,
    })
}

const SELECT_MOVEMENT: &str = r#"
    SELECT id, client_id, movement_type, product, total_weight,
           plastic_box_count, plastic_box_weight, wood_box_count, wood_box_weight,
           product_weight, recorded_by, comment, farmer_comment, is_comment_read, created_at
    FROM stock_movements
"#;

/// Input for recording a movement
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovementInput {
    pub client_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product: String,
    pub total_weight: Decimal,
    pub plastic_box_count: Option<i32>,
    pub plastic_box_weight: Option<Decimal>,
    pub wood_box_count: Option<i32>,
    pub wood_box_weight: Option<Decimal>,
    #[serde(rename = "recordedByUserId")]
    pub recorded_by: Uuid,
    pub comment: Option<String>,
}

/// Patchable fields of an existing movement
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMovementInput {
    pub farmer_comment: Option<String>,
    pub is_comment_read: Option<bool>,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List movements, optionally restricted to one client, newest first
    pub async fn list(&self, client_id: Option<Uuid>) -> AppResult<Vec<StockMovement>> {
        let rows = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, MovementRow>(&format!(
                    "{} WHERE client_id = $1 ORDER BY created_at DESC",
                    SELECT_MOVEMENT
                ))
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MovementRow>(&format!(
                    "{} ORDER BY created_at DESC",
                    SELECT_MOVEMENT
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(movement_from_row).collect()
    }

    /// Record a movement.
    ///
    /// Derives the net product weight, and for withdrawals checks it against
    /// the client's balances before inserting. Validation and insert run in
    /// one transaction holding a per-client advisory lock, so two concurrent
    /// withdrawals cannot both pass against the same stale balance.
    pub async fn record(&self, input: RecordMovementInput) -> AppResult<StockMovement> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let client_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(input.client_id)
                .fetch_one(&self.db)
                .await?;
        if !client_exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let user_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(input.recorded_by)
                .fetch_one(&self.db)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound("User".to_string()));
        }

        // Rejects negative box counts or unit weights and a negative net
        // result, for deposits and withdrawals alike.
        let product_weight = stock::derive_product_weight(
            input.total_weight,
            input.plastic_box_count,
            input.plastic_box_weight,
            input.wood_box_count,
            input.wood_box_weight,
        )?;

        let mut tx = self.db.begin().await?;

        // Serialize validate-then-insert per client for the duration of the
        // transaction.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(input.client_id)
            .execute(&mut *tx)
            .await?;

        if input.movement_type == MovementType::Out {
            let rows = sqlx::query_as::<_, MovementRow>(&format!(
                "{} WHERE client_id = $1",
                SELECT_MOVEMENT
            ))
            .bind(input.client_id)
            .fetch_all(&mut *tx)
            .await?;
            let history: Vec<StockMovement> = rows
                .into_iter()
                .map(movement_from_row)
                .collect::<AppResult<_>>()?;

            stock::check_withdrawal(
                &history,
                &input.product,
                product_weight,
                input.plastic_box_count,
                input.wood_box_count,
            )?;
        }

        let row = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO stock_movements (
                client_id, movement_type, product, total_weight,
                plastic_box_count, plastic_box_weight, wood_box_count, wood_box_weight,
                product_weight, recorded_by, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, client_id, movement_type, product, total_weight,
                      plastic_box_count, plastic_box_weight, wood_box_count, wood_box_weight,
                      product_weight, recorded_by, comment, farmer_comment, is_comment_read,
                      created_at
            "#,
        )
        .bind(input.client_id)
        .bind(input.movement_type.as_str())
        .bind(&input.product)
        .bind(input.total_weight)
        .bind(input.plastic_box_count)
        .bind(input.plastic_box_weight)
        .bind(input.wood_box_count)
        .bind(input.wood_box_weight)
        .bind(product_weight)
        .bind(input.recorded_by)
        .bind(&input.comment)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        movement_from_row(row)
    }

    /// Apply a patch to the two mutable fields of a movement.
    ///
    /// Writing the farmer comment (any string, empty included) resets the
    /// read flag; marking as read is a separate, idempotent operation that
    /// leaves the comment untouched. When a patch carries both, the comment
    /// write wins and the movement ends unread.
    pub async fn patch(&self, movement_id: Uuid, input: PatchMovementInput) -> AppResult<StockMovement> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_movements WHERE id = $1)",
        )
        .bind(movement_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Movement".to_string()));
        }

        let row = if let Some(ref comment) = input.farmer_comment {
            sqlx::query_as::<_, MovementRow>(
                r#"
                UPDATE stock_movements
                SET farmer_comment = $1, is_comment_read = FALSE
                WHERE id = $2
                RETURNING id, client_id, movement_type, product, total_weight,
                          plastic_box_count, plastic_box_weight, wood_box_count, wood_box_weight,
                          product_weight, recorded_by, comment, farmer_comment, is_comment_read,
                          created_at
                "#,
            )
            .bind(comment)
            .bind(movement_id)
            .fetch_one(&self.db)
            .await?
        } else if let Some(is_read) = input.is_comment_read {
            sqlx::query_as::<_, MovementRow>(
                r#"
                UPDATE stock_movements
                SET is_comment_read = $1
                WHERE id = $2
                RETURNING id, client_id, movement_type, product, total_weight,
                          plastic_box_count, plastic_box_weight, wood_box_count, wood_box_weight,
                          product_weight, recorded_by, comment, farmer_comment, is_comment_read,
                          created_at
                "#,
            )
            .bind(is_read)
            .bind(movement_id)
            .fetch_one(&self.db)
            .await?
        } else {
            return Err(AppError::Validation(
                "Nothing to update: provide farmerComment or isCommentRead".to_string(),
            ));
        };

        movement_from_row(row)
    }

    /// Count movements recorded by a user that carry an unread, non-empty
    /// farmer comment. Feeds the receptionist's anomaly badge. An unknown
    /// user is a 404, not an empty count.
    pub async fn unread_anomaly_count(&self, user_id: Uuid) -> AppResult<i64> {
        let user_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound("User".to_string()));
        }

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_movements
            WHERE recorded_by = $1
              AND farmer_comment IS NOT NULL
              AND farmer_comment <> ''
              AND is_comment_read = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Current stock position for a client across all products
    pub async fn client_balance(&self, client_id: Uuid) -> AppResult<StockBalance> {
        let history = self.history(client_id).await?;
        Ok(stock::client_balance(&history))
    }

    /// Net product weight held by a client for one product (exact-match name)
    pub async fn product_balance(&self, client_id: Uuid, product: &str) -> AppResult<Decimal> {
        let history = self.history(client_id).await?;
        Ok(stock::product_balance(&history, product))
    }

    /// Export the full ledger as CSV, newest first
    pub async fn export_csv(&self) -> AppResult<String> {
        let movements = self.list(None).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "id",
                "clientId",
                "type",
                "product",
                "totalWeight",
                "plasticBoxCount",
                "plasticBoxWeight",
                "woodBoxCount",
                "woodBoxWeight",
                "productWeight",
                "recordedByUserId",
                "comment",
                "farmerComment",
                "isCommentRead",
                "date",
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

        for m in &movements {
            writer
                .write_record([
                    m.id.to_string(),
                    m.client_id.to_string(),
                    m.movement_type.to_string(),
                    m.product.clone(),
                    m.total_weight.to_string(),
                    m.plastic_box_count.map(|c| c.to_string()).unwrap_or_default(),
                    m.plastic_box_weight.map(|w| w.to_string()).unwrap_or_default(),
                    m.wood_box_count.map(|c| c.to_string()).unwrap_or_default(),
                    m.wood_box_weight.map(|w| w.to_string()).unwrap_or_default(),
                    m.product_weight.to_string(),
                    m.recorded_by.to_string(),
                    m.comment.clone().unwrap_or_default(),
                    m.farmer_comment.clone().unwrap_or_default(),
                    m.is_comment_read.to_string(),
                    m.created_at.to_rfc3339(),
                ])
                .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))
    }

    /// Full movement history for a client; existence is checked so an
    /// unknown client is a 404 rather than an empty balance.
    async fn history(&self, client_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let client_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(client_id)
                .fetch_one(&self.db)
                .await?;
        if !client_exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            "{} WHERE client_id = $1 ORDER BY created_at ASC",
            SELECT_MOVEMENT
        ))
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(movement_from_row).collect()
    }
}
