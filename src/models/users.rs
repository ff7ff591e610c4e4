use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Role mapping for core.user_role. Privilege is total-ordered:
/// admin covers moderator covers user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "core.user_role", rename_all = "lowercase")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

/// User model mapped to core.user. Only `role` is stored; the capability
/// set is derived from it on read.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[sqlx(rename = "password_hash")]
    pub password_hash: Option<String>,

    pub display_name: String,
    pub avatar_url: Option<String>,

    pub role: UserRole,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
