use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{
        middleware::AuthUser,
        permissions::{Capability, require_capability, role_allows},
    },
    dto::events::{
        CreateEventRequest, EventAuthorResponse, EventListResponse, EventResponse,
        ListEventsQuery, UpdateEventRequest,
    },
    error::AppError,
    models::communities,
    repositories::{events as event_repo, events::CreateEventParams, events::UpdateEventFields},
    telemetry::BusinessEvent,
};

pub struct EventService;

const MIN_TITLE_LENGTH: usize = 3;
const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 10_000;

impl EventService {
    pub async fn create_event(
        pool: &PgPool,
        user: &AuthUser,
        req: CreateEventRequest,
    ) -> Result<EventResponse, AppError> {
        require_capability(user, Capability::CreateEvents)?;

        let community_id = communities::find(&req.community_id)
            .map(|community| community.id.to_string())
            .ok_or_else(|| {
                AppError::ValidationError(format!("Unknown community '{}'", req.community_id))
            })?;
        let title = normalize_event_title(&req.title)?;
        let description = normalize_event_description(&req.description)?;
        validate_schedule(req.starts_at, req.ends_at)?;

        let row = event_repo::create_event(
            pool,
            CreateEventParams {
                community_id,
                created_by: user.user_id,
                title,
                description,
                location: req.location,
                starts_at: req.starts_at,
                ends_at: req.ends_at,
            },
        )
        .await?;

        BusinessEvent::EventCreated {
            event_id: row.id,
            community_id: row.community_id.clone(),
            actor_id: user.user_id,
        }
        .log();

        Ok(map_event_response(row))
    }

    pub async fn get_event(
        pool: &PgPool,
        user: &AuthUser,
        event_id: Uuid,
    ) -> Result<EventResponse, AppError> {
        require_capability(user, Capability::ReadForums)?;

        let touched = event_repo::increment_views(pool, event_id).await?;
        if touched == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        let row = event_repo::find_event_by_id(pool, event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".to_string()))?;

        Ok(map_event_response(row))
    }

    pub async fn list_events(
        pool: &PgPool,
        user: &AuthUser,
        query: ListEventsQuery,
    ) -> Result<EventListResponse, AppError> {
        require_capability(user, Capability::ReadForums)?;

        if let Some(community_id) = query.community_id.as_deref() {
            if communities::find(community_id).is_none() {
                return Err(AppError::ValidationError(format!(
                    "Unknown community '{community_id}'"
                )));
            }
        }

        let rows = event_repo::list_events(
            pool,
            query.community_id.as_deref(),
            query.upcoming.unwrap_or(false),
        )
        .await?;
        let data = rows.into_iter().map(map_event_response).collect();

        Ok(EventListResponse { data })
    }

    pub async fn update_event(
        pool: &PgPool,
        user: &AuthUser,
        event_id: Uuid,
        req: UpdateEventRequest,
    ) -> Result<EventResponse, AppError> {
        let existing = event_repo::find_event_by_id(pool, event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".to_string()))?;

        let is_owner = existing.created_by == user.user_id;
        if !is_owner && !role_allows(user.role, Capability::ManageEvents) {
            return Err(AppError::Forbidden(
                "Only the organizer or an event manager can edit this event".to_string(),
            ));
        }

        let title = req.title.as_deref().map(normalize_event_title).transpose()?;
        let description = req
            .description
            .as_deref()
            .map(normalize_event_description)
            .transpose()?;
        // The patch is set-only: an omitted field keeps its stored value.
        // The schedule check therefore runs on the merged values.
        let starts_at = req.starts_at.unwrap_or(existing.starts_at);
        let ends_at = req.ends_at.or(existing.ends_at);
        validate_schedule(starts_at, ends_at)?;

        let row = event_repo::update_event(
            pool,
            event_id,
            UpdateEventFields {
                title,
                description,
                location: req.location,
                starts_at: req.starts_at,
                ends_at: req.ends_at,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Event not found".to_string()))?;

        Ok(map_event_response(row))
    }

    pub async fn delete_event(
        pool: &PgPool,
        user: &AuthUser,
        event_id: Uuid,
    ) -> Result<(), AppError> {
        let existing = event_repo::find_event_by_id(pool, event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".to_string()))?;

        let is_owner = existing.created_by == user.user_id;
        let may_manage = role_allows(user.role, Capability::ManageEvents)
            || role_allows(user.role, Capability::DeleteContent);
        if !is_owner && !may_manage {
            return Err(AppError::Forbidden(
                "Only the organizer or an event manager can delete this event".to_string(),
            ));
        }

        event_repo::soft_delete_event(pool, event_id).await?;

        BusinessEvent::EventDeleted {
            event_id,
            actor_id: user.user_id,
        }
        .log();

        Ok(())
    }
}

fn normalize_event_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len < MIN_TITLE_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Event title must be at least {MIN_TITLE_LENGTH} characters"
        )));
    }
    if len > MAX_TITLE_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Event title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_event_description(description: &str) -> Result<String, AppError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "Event description is required".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Event description exceeds {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_schedule(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    if let Some(ends_at) = ends_at {
        if ends_at <= starts_at {
            return Err(AppError::ValidationError(
                "Event must end after it starts".to_string(),
            ));
        }
    }
    Ok(())
}

fn map_event_response(row: event_repo::EventRow) -> EventResponse {
    EventResponse {
        id: row.id,
        community_id: row.community_id,
        created_by: row.created_by,
        author: EventAuthorResponse {
            id: row.created_by,
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        },
        title: row.title,
        description: row.description,
        location: row.location,
        starts_at: row.starts_at,
        ends_at: row.ends_at,
        upvotes: row.upvotes,
        downvotes: row.downvotes,
        views: row.views,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn rejects_event_ending_before_start() {
        let starts = Utc::now();
        let ends = starts - Duration::hours(1);
        assert!(matches!(
            validate_schedule(starts, Some(ends)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn open_ended_event_is_fine() {
        assert!(validate_schedule(Utc::now(), None).is_ok());
    }

    #[test]
    fn rejects_blank_description() {
        assert!(matches!(
            normalize_event_description("  \n "),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn trims_title() {
        let title = normalize_event_title(" Spring Career Fair ").expect("valid");
        assert_eq!(title, "Spring Career Fair");
    }
}
