use axum::{Extension, Json, extract::State};

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::votes::{CastVoteRequest, VoteResponse},
    error::AppError,
    usecases::votes::VoteService,
};

pub async fn cast_vote_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CastVoteRequest>,
) -> Result<Json<VoteResponse>, AppError> {
    let response = VoteService::cast_vote(&state.db, &auth_user, req).await?;
    Ok(Json(response))
}
