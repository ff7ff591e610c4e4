use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    app::state::AppState, error::AppError, models::users::UserRole,
    repositories::users as user_repo,
};

/// Authenticated principal injected into request extensions. Carries the
/// role so capability checks never reach for ambient state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| {
            let query = req.uri().query().unwrap_or("");
            let params: std::collections::HashMap<String, String> =
                serde_urlencoded::from_str(query).unwrap_or_default();
            params.get("token").cloned()
        })
        .ok_or(AppError::Unauthorized(
            "Missing authorization token".to_string(),
        ))?;

    let claim = state
        .jwt_config
        .verify_token(&token)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let user_id = Uuid::parse_str(&claim.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id".to_string()))?;

    // Role is loaded fresh per request so demotions take effect immediately.
    let user = user_repo::find_user_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthorized("Unknown user".to_string()))?;
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    let auth_user = AuthUser {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
    };

    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
