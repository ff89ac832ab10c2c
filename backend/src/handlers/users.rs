//! HTTP handlers for user account management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::users::{CreateUserInput, UpdateUserInput, UserService};
use crate::AppState;
use shared::models::User;

/// List all user accounts
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = UserService::new(state.db);
    let users = service.list().await?;
    Ok(Json(users))
}

/// Create a user account
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let service = UserService::new(state.db);
    let user = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Partially update a user account
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service.update(user_id, input).await?;
    Ok(Json(user))
}

/// Delete a user account (refused for administrators)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = UserService::new(state.db);
    service.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
