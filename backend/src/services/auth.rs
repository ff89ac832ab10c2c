//! Authentication service for role-checked login
//!
//! Login is session-less: a successful login returns the user record and no
//! token is issued. Every subsequent request carries the acting user's id
//! where the API needs it.

use bcrypt::verify;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::users::{user_from_row, UserRow};
use shared::models::User;
use shared::types::Role;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
}

/// Login credentials with the role the caller claims to hold
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Authenticate a user with username, password and claimed role.
    ///
    /// Unknown username or wrong password is a 401; a valid credential pair
    /// with the wrong role, or a suspended account, is a 403.
    pub async fn login(&self, input: LoginInput) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, role, status, client_id, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = user_from_row(row)?;

        if user.status == shared::types::UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }
        if user.role != input.role {
            return Err(AppError::Forbidden(
                "Account does not hold the requested role".to_string(),
            ));
        }

        Ok(user)
    }
}
