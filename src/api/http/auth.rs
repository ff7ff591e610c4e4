use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateRoleRequest, UserResponse},
    error::AppError,
    usecases::auth::AuthService,
};

pub async fn register_handle(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let response = AuthService::register(
        &state.db,
        &state.jwt_config,
        &state.allowed_email_domains,
        req,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login_handle(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, &state.jwt_config, req).await?;
    Ok(Json(response))
}

pub async fn get_me_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let response = AuthService::me(&state.db, &auth_user).await?;
    Ok(Json(response))
}

pub async fn update_role_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let response = AuthService::update_role(&state.db, &auth_user, user_id, req).await?;
    Ok(Json(response))
}
