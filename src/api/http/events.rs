use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::events::{
        CreateEventRequest, EventActionMessage, EventListResponse, EventResponse,
        ListEventsQuery, UpdateEventRequest,
    },
    error::AppError,
    usecases::events::EventService,
};

pub async fn create_event_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let response = EventService::create_event(&state.db, &auth_user, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_events_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<EventListResponse>, AppError> {
    let response = EventService::list_events(&state.db, &auth_user, query).await?;
    Ok(Json(response))
}

pub async fn get_event_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    let response = EventService::get_event(&state.db, &auth_user, event_id).await?;
    Ok(Json(response))
}

pub async fn update_event_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let response = EventService::update_event(&state.db, &auth_user, event_id, req).await?;
    Ok(Json(response))
}

pub async fn delete_event_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventActionMessage>, AppError> {
    EventService::delete_event(&state.db, &auth_user, event_id).await?;
    Ok(Json(EventActionMessage {
        message: "Event deleted".to_string(),
    }))
}
