use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug)]
pub(crate) struct CreateEventParams {
    pub community_id: String,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Partial patch for `update_event`. Fields are set-only: `None` keeps the
/// stored value, so `location` and `ends_at` cannot be cleared back to NULL
/// through this path.
#[derive(Debug, Default)]
pub(crate) struct UpdateEventFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub community_id: String,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
}

const EVENT_COLUMNS: &str = r#"
    e.id,
    e.community_id,
    e.created_by,
    e.title,
    e.description,
    e.location,
    e.starts_at,
    e.ends_at,
    e.upvotes,
    e.downvotes,
    e.views,
    e.created_at,
    COALESCE(u.display_name, 'Deleted user') AS author_display_name,
    u.avatar_url AS author_avatar_url
"#;

pub async fn create_event(pool: &PgPool, params: CreateEventParams) -> Result<EventRow, AppError> {
    let row = crate::log_query_fetch_one!(
        "events.create_event",
        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            WITH e AS (
                INSERT INTO campus.event
                    (community_id, created_by, title, description, location, starts_at, ends_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {EVENT_COLUMNS}
            FROM e
            LEFT JOIN core.user u ON u.id = e.created_by
            "#,
        ))
        .bind(params.community_id)
        .bind(params.created_by)
        .bind(params.title)
        .bind(params.description)
        .bind(params.location)
        .bind(params.starts_at)
        .bind(params.ends_at)
        .fetch_one(pool)
    )?;

    Ok(row)
}

pub async fn find_event_by_id(pool: &PgPool, event_id: Uuid) -> Result<Option<EventRow>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "events.find_event_by_id",
        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM campus.event e
            LEFT JOIN core.user u ON u.id = e.created_by
            WHERE e.id = $1
            AND e.deleted_at IS NULL
            "#,
        ))
        .bind(event_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn list_events(
    pool: &PgPool,
    community_id: Option<&str>,
    upcoming_only: bool,
) -> Result<Vec<EventRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "events.list_events",
        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM campus.event e
            LEFT JOIN core.user u ON u.id = e.created_by
            WHERE e.deleted_at IS NULL
            AND ($1::text IS NULL OR e.community_id = $1)
            AND (NOT $2 OR e.starts_at >= now())
            ORDER BY e.starts_at ASC
            "#,
        ))
        .bind(community_id)
        .bind(upcoming_only)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn update_event(
    pool: &PgPool,
    event_id: Uuid,
    fields: UpdateEventFields,
) -> Result<Option<EventRow>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "events.update_event",
        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            WITH e AS (
                UPDATE campus.event
                SET title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    location = COALESCE($4, location),
                    starts_at = COALESCE($5, starts_at),
                    ends_at = COALESCE($6, ends_at),
                    updated_at = now()
                WHERE id = $1
                AND deleted_at IS NULL
                RETURNING *
            )
            SELECT {EVENT_COLUMNS}
            FROM e
            LEFT JOIN core.user u ON u.id = e.created_by
            "#,
        ))
        .bind(event_id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.location)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn soft_delete_event(pool: &PgPool, event_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "events.soft_delete_event",
        sqlx::query(
            r#"
            UPDATE campus.event
            SET deleted_at = now()
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(event_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn increment_views(pool: &PgPool, event_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "events.increment_views",
        sqlx::query(
            r#"
            UPDATE campus.event
            SET views = views + 1
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(event_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}
