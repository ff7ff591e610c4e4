use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug)]
pub(crate) struct CreateCommentParams {
    pub question_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_by: Uuid,
    pub content: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub question_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_by: Uuid,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
}

const COMMENT_COLUMNS: &str = r#"
    c.id,
    c.question_id,
    c.parent_id,
    c.created_by,
    c.content,
    c.upvotes,
    c.downvotes,
    c.created_at,
    COALESCE(u.display_name, 'Deleted user') AS author_display_name,
    u.avatar_url AS author_avatar_url
"#;

pub async fn create_comment(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateCommentParams,
) -> Result<CommentRow, AppError> {
    let row = crate::log_query_fetch_one!(
        "comments.create_comment",
        sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            WITH c AS (
                INSERT INTO forum.comment (question_id, parent_id, created_by, content)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            LEFT JOIN core.user u ON u.id = c.created_by
            "#,
        ))
        .bind(params.question_id)
        .bind(params.parent_id)
        .bind(params.created_by)
        .bind(params.content)
        .fetch_one(&mut **tx)
    )?;

    Ok(row)
}

/// Flat comment list for one question in creation order. Sorting,
/// filtering and threading happen in the service layer.
pub async fn list_comments(
    pool: &PgPool,
    question_id: Uuid,
) -> Result<Vec<CommentRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "comments.list_comments",
        sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM forum.comment c
            LEFT JOIN core.user u ON u.id = c.created_by
            WHERE c.question_id = $1
            AND c.deleted_at IS NULL
            ORDER BY c.created_at ASC
            "#,
        ))
        .bind(question_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn find_comment_by_id(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<CommentRow>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.find_comment_by_id",
        sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM forum.comment c
            LEFT JOIN core.user u ON u.id = c.created_by
            WHERE c.id = $1
            AND c.deleted_at IS NULL
            "#,
        ))
        .bind(comment_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn exists_in_question(
    pool: &PgPool,
    question_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, AppError> {
    let exists = crate::log_query_fetch_one!(
        "comments.exists_in_question",
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM forum.comment
                WHERE id = $1
                AND question_id = $2
                AND deleted_at IS NULL
            )
            "#,
        )
        .bind(comment_id)
        .bind(question_id)
        .fetch_one(pool)
    )?;

    Ok(exists)
}

pub async fn soft_delete_comment(
    tx: &mut Transaction<'_, Postgres>,
    comment_id: Uuid,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "comments.soft_delete_comment",
        sqlx::query(
            r#"
            UPDATE forum.comment
            SET deleted_at = now()
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(comment_id)
        .execute(&mut **tx)
    )?;

    Ok(result.rows_affected())
}

/// Applies both signed vote deltas as one commutative update and returns
/// the resulting counters.
pub async fn adjust_vote_counters(
    tx: &mut Transaction<'_, Postgres>,
    comment_id: Uuid,
    up_delta: i32,
    down_delta: i32,
) -> Result<Option<(i32, i32)>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.adjust_vote_counters",
        sqlx::query_as::<_, (i32, i32)>(
            r#"
            UPDATE forum.comment
            SET upvotes = GREATEST(upvotes + $2, 0),
                downvotes = GREATEST(downvotes + $3, 0)
            WHERE id = $1
            AND deleted_at IS NULL
            RETURNING upvotes, downvotes
            "#,
        )
        .bind(comment_id)
        .bind(up_delta)
        .bind(down_delta)
        .fetch_optional(&mut **tx)
    )?;

    Ok(row)
}

pub async fn get_vote_counters(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<(i32, i32)>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.get_vote_counters",
        sqlx::query_as::<_, (i32, i32)>(
            r#"
            SELECT upvotes, downvotes
            FROM forum.comment
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(comment_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}
