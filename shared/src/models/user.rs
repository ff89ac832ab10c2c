//! User account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Role, UserStatus};

/// A user account on the platform.
///
/// The password hash lives only in the backend's database rows; it is never
/// part of this model and therefore never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    /// Linked client account; meaningful only for farmer-role users.
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
