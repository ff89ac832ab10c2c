//! Authentication handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::auth::{AuthService, LoginInput};
use crate::AppState;
use shared::models::User;

/// Login endpoint handler. Returns the user record on success; no token or
/// session is created.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<User>> {
    let service = AuthService::new(state.db);
    let user = service.login(body).await?;
    Ok(Json(user))
}
