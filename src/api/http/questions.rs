use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::questions::{
        CreateQuestionRequest, ListQuestionsQuery, QuestionActionMessage, QuestionListResponse,
        QuestionResponse, UpdateQuestionRequest,
    },
    error::AppError,
    usecases::questions::QuestionService,
};

pub async fn create_question_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), AppError> {
    let response = QuestionService::create_question(&state.db, &auth_user, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_questions_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<Json<QuestionListResponse>, AppError> {
    let response = QuestionService::list_questions(&state.db, &auth_user, query).await?;
    Ok(Json(response))
}

pub async fn get_question_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<QuestionResponse>, AppError> {
    let response = QuestionService::get_question(&state.db, &auth_user, question_id).await?;
    Ok(Json(response))
}

pub async fn update_question_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let response =
        QuestionService::update_question(&state.db, &auth_user, question_id, req).await?;
    Ok(Json(response))
}

pub async fn delete_question_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<QuestionActionMessage>, AppError> {
    QuestionService::delete_question(&state.db, &auth_user, question_id).await?;
    Ok(Json(QuestionActionMessage {
        message: "Question deleted".to_string(),
    }))
}
