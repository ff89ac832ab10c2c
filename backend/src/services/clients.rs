//! Client registry service

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::Client;
use shared::types::ClientType;

/// Client service for the warehouse's customer registry
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

/// Row as stored; enum columns are text and parsed on the way out
#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    client_type: String,
    join_date: NaiveDate,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

fn client_from_row(row: ClientRow) -> AppResult<Client> {
    Ok(Client {
        id: row.id,
        name: row.name,
        client_type: row.client_type.parse().map_err(AppError::Internal)?,
        join_date: row.join_date,
        phone: row.phone,
        email: row.email,
        address: row.address,
        comment: row.comment,
        created_at: row.created_at,
    })
}

/// Input for registering a client
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    #[validate(length(min = 1, message = "Client name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    /// Defaults to today when omitted.
    pub join_date: Option<NaiveDate>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub comment: Option<String>,
}

impl ClientService {
    /// Create a new ClientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all clients, newest joiners first
    pub async fn list(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, client_type, join_date, phone, email, address, comment, created_at
            FROM clients
            ORDER BY join_date DESC, name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(client_from_row).collect()
    }

    /// Register a client
    pub async fn create(&self, input: CreateClientInput) -> AppResult<Client> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let join_date = input.join_date.unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (name, client_type, join_date, phone, email, address, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, client_type, join_date, phone, email, address, comment, created_at
            "#,
        )
        .bind(&input.name)
        .bind(input.client_type.as_str())
        .bind(join_date)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.comment)
        .fetch_one(&self.db)
        .await?;

        client_from_row(row)
    }
}
