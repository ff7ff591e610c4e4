use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug)]
pub(crate) struct CreateQuestionParams {
    pub community_id: String,
    pub created_by: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    pub id: Uuid,
    pub community_id: String,
    pub created_by: Uuid,
    pub title: String,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub views: i32,
    pub reply_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
}

const QUESTION_COLUMNS: &str = r#"
    q.id,
    q.community_id,
    q.created_by,
    q.title,
    q.content,
    q.upvotes,
    q.downvotes,
    q.views,
    q.reply_count,
    q.created_at,
    q.last_activity_at,
    COALESCE(u.display_name, 'Deleted user') AS author_display_name,
    u.avatar_url AS author_avatar_url
"#;

pub async fn create_question(
    pool: &PgPool,
    params: CreateQuestionParams,
) -> Result<QuestionRow, AppError> {
    let row = crate::log_query_fetch_one!(
        "questions.create_question",
        sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            WITH q AS (
                INSERT INTO forum.question (community_id, created_by, title, content)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {QUESTION_COLUMNS}
            FROM q
            LEFT JOIN core.user u ON u.id = q.created_by
            "#,
        ))
        .bind(params.community_id)
        .bind(params.created_by)
        .bind(params.title)
        .bind(params.content)
        .fetch_one(pool)
    )?;

    Ok(row)
}

pub async fn find_question_by_id(
    pool: &PgPool,
    question_id: Uuid,
) -> Result<Option<QuestionRow>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "questions.find_question_by_id",
        sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM forum.question q
            LEFT JOIN core.user u ON u.id = q.created_by
            WHERE q.id = $1
            AND q.deleted_at IS NULL
            "#,
        ))
        .bind(question_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn list_questions(
    pool: &PgPool,
    community_id: Option<&str>,
) -> Result<Vec<QuestionRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "questions.list_questions",
        sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM forum.question q
            LEFT JOIN core.user u ON u.id = q.created_by
            WHERE q.deleted_at IS NULL
            AND ($1::text IS NULL OR q.community_id = $1)
            ORDER BY q.last_activity_at DESC
            "#,
        ))
        .bind(community_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn update_question(
    pool: &PgPool,
    question_id: Uuid,
    title: Option<String>,
    content: Option<String>,
) -> Result<Option<QuestionRow>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "questions.update_question",
        sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            WITH q AS (
                UPDATE forum.question
                SET title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    updated_at = now()
                WHERE id = $1
                AND deleted_at IS NULL
                RETURNING *
            )
            SELECT {QUESTION_COLUMNS}
            FROM q
            LEFT JOIN core.user u ON u.id = q.created_by
            "#,
        ))
        .bind(question_id)
        .bind(title)
        .bind(content)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn soft_delete_question(pool: &PgPool, question_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "questions.soft_delete_question",
        sqlx::query(
            r#"
            UPDATE forum.question
            SET deleted_at = now()
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(question_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// View tracking: commutative increment, no read-modify-write.
pub async fn increment_views(pool: &PgPool, question_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "questions.increment_views",
        sqlx::query(
            r#"
            UPDATE forum.question
            SET views = views + 1
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(question_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// A new reply bumps the counter and refreshes activity in the same
/// transaction as the comment insert.
pub async fn record_reply(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "questions.record_reply",
        sqlx::query(
            r#"
            UPDATE forum.question
            SET reply_count = reply_count + 1,
                last_activity_at = now()
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(question_id)
        .execute(&mut **tx)
    )?;

    Ok(result.rows_affected())
}

pub async fn remove_reply(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "questions.remove_reply",
        sqlx::query(
            r#"
            UPDATE forum.question
            SET reply_count = GREATEST(reply_count - 1, 0)
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(question_id)
        .execute(&mut **tx)
    )?;

    Ok(result.rows_affected())
}

/// Applies both signed vote deltas as one commutative update and returns
/// the resulting counters.
pub async fn adjust_vote_counters(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
    up_delta: i32,
    down_delta: i32,
) -> Result<Option<(i32, i32)>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "questions.adjust_vote_counters",
        sqlx::query_as::<_, (i32, i32)>(
            r#"
            UPDATE forum.question
            SET upvotes = GREATEST(upvotes + $2, 0),
                downvotes = GREATEST(downvotes + $3, 0)
            WHERE id = $1
            AND deleted_at IS NULL
            RETURNING upvotes, downvotes
            "#,
        )
        .bind(question_id)
        .bind(up_delta)
        .bind(down_delta)
        .fetch_optional(&mut **tx)
    )?;

    Ok(row)
}

pub async fn get_vote_counters(
    pool: &PgPool,
    question_id: Uuid,
) -> Result<Option<(i32, i32)>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "questions.get_vote_counters",
        sqlx::query_as::<_, (i32, i32)>(
            r#"
            SELECT upvotes, downvotes
            FROM forum.question
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(question_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}
