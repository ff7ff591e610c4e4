use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::permissions::{Capability, capabilities_for, is_admin, is_moderator},
    models::users::{User, UserRole},
};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// User as exposed over the API. `permissions` is never read from storage;
/// it is derived from the role at response time.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub permissions: Vec<Capability>,
    pub is_moderator: bool,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            role: user.role,
            permissions: capabilities_for(user.role).to_vec(),
            is_moderator: is_moderator(user.role),
            is_admin: is_admin(user.role),
        }
    }
}
