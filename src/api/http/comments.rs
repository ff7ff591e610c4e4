use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::comments::{
        CommentResponse, CommentTreeResponse, CreateCommentRequest, ListCommentsQuery,
    },
    error::AppError,
    usecases::comments::CommentService,
};

pub async fn list_question_comments_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<CommentTreeResponse>, AppError> {
    let response =
        CommentService::list_comments(&state.db, &auth_user, question_id, query).await?;
    Ok(Json(response))
}

pub async fn create_question_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let response =
        CommentService::create_comment(&state.db, &auth_user, question_id, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn delete_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CommentService::delete_comment(&state.db, &auth_user, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
