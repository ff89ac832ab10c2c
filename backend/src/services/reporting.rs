//! Aggregate reporting for the admin dashboard

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;

/// Reporting service for warehouse-wide aggregates
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Warehouse-wide position for one product
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product: String,
    pub net_product_weight: Decimal,
    pub movement_count: i64,
    pub client_count: i64,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Net stock per product across all clients
    pub async fn stock_summary(&self) -> AppResult<Vec<ProductSummary>> {
        let rows = sqlx::query_as::<_, (String, Decimal, i64, i64)>(
            r#"
            SELECT product,
                   COALESCE(SUM(CASE WHEN movement_type = 'in' THEN product_weight
                                     ELSE -product_weight END), 0) as net_weight,
                   COUNT(*) as movement_count,
                   COUNT(DISTINCT client_id) as client_count
            FROM stock_movements
            GROUP BY product
            ORDER BY product
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product, net_weight, movement_count, client_count)| ProductSummary {
                product,
                net_product_weight: net_weight,
                movement_count,
                client_count,
            })
            .collect())
    }
}
