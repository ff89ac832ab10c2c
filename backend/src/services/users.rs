//! User account management service
//!
//! Accounts are created and maintained by administrators. The stored bcrypt
//! hash never leaves this module: rows are converted to `shared::User`
//! before anything is returned.

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::User;
use shared::types::{Role, UserStatus};
use shared::validation::{validate_display_name, validate_password, validate_username};

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// User row as stored, including the password hash
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
    pub client_id: Option<Uuid>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Convert a stored row into the wire model, dropping the hash
pub(crate) fn user_from_row(row: UserRow) -> AppResult<User> {
    Ok(User {
        id: row.id,
        username: row.username,
        name: row.display_name,
        role: row.role.parse().map_err(AppError::Internal)?,
        status: row.status.parse().map_err(AppError::Internal)?,
        client_id: row.client_id,
        created_at: row.created_at,
    })
}

/// Input for creating a user account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub username: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub status: Option<UserStatus>,
    /// Client to link; meaningful only for farmer accounts.
    pub client_id: Option<Uuid>,
}

/// Partial update for an existing account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub client_id: Option<Uuid>,
    pub password: Option<String>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all user accounts
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, role, status, client_id, password_hash, created_at
            FROM users
            ORDER BY username ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(user_from_row).collect()
    }

    /// Create a user account
    pub async fn create(&self, input: CreateUserInput) -> AppResult<User> {
        validate_username(&input.username).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_display_name(&input.name).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_password(&input.password).map_err(|e| AppError::Validation(e.to_string()))?;

        // Check username is free
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(&input.username)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        // A linked client must exist
        if let Some(client_id) = input.client_id {
            let client_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                    .bind(client_id)
                    .fetch_one(&self.db)
                    .await?;
            if !client_exists {
                return Err(AppError::NotFound("Client".to_string()));
            }
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
        let status = input.status.unwrap_or_default();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, display_name, role, status, client_id, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, display_name, role, status, client_id, password_hash, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.name)
        .bind(input.role.as_str())
        .bind(status.as_str())
        .bind(input.client_id)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await?;

        user_from_row(row)
    }

    /// Partially update an account; omitted fields keep their stored values
    pub async fn update(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        let existing = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, role, status, client_id, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if let Some(ref username) = input.username {
            validate_username(username).map_err(|e| AppError::Validation(e.to_string()))?;
            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE username = $1 AND id != $2",
            )
            .bind(username)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
            if duplicate > 0 {
                return Err(AppError::DuplicateEntry("username".to_string()));
            }
        }
        if let Some(ref name) = input.name {
            validate_display_name(name).map_err(|e| AppError::Validation(e.to_string()))?;
        }
        if let Some(client_id) = input.client_id {
            let client_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                    .bind(client_id)
                    .fetch_one(&self.db)
                    .await?;
            if !client_exists {
                return Err(AppError::NotFound("Client".to_string()));
            }
        }

        let password_hash = match input.password {
            Some(password) => {
                validate_password(&password).map_err(|e| AppError::Validation(e.to_string()))?;
                hash(&password, DEFAULT_COST)
                    .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
            }
            None => existing.password_hash,
        };

        let username = input.username.unwrap_or(existing.username);
        let display_name = input.name.unwrap_or(existing.display_name);
        let role = input
            .role
            .map(|r| r.as_str().to_string())
            .unwrap_or(existing.role);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);
        let client_id = input.client_id.or(existing.client_id);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = $1, display_name = $2, role = $3, status = $4, client_id = $5,
                password_hash = $6
            WHERE id = $7
            RETURNING id, username, display_name, role, status, client_id, password_hash, created_at
            "#,
        )
        .bind(&username)
        .bind(&display_name)
        .bind(&role)
        .bind(&status)
        .bind(client_id)
        .bind(&password_hash)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        user_from_row(row)
    }

    /// Delete an account. Admin-role accounts are protected regardless of
    /// who asks.
    pub async fn delete(&self, user_id: Uuid) -> AppResult<()> {
        let role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let role: Role = role.parse().map_err(AppError::Internal)?;
        if !role.deletable() {
            return Err(AppError::Forbidden(
                "Administrator accounts cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
