use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::votes::{VotableType, Vote, VoteType},
};

pub async fn find_vote(
    pool: &PgPool,
    item_type: VotableType,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Vote>, AppError> {
    let vote = crate::log_query_fetch_optional!(
        "votes.find_vote",
        sqlx::query_as::<_, Vote>(
            r#"
            SELECT *
            FROM forum.vote
            WHERE item_type = $1
            AND item_id = $2
            AND user_id = $3
            "#,
        )
        .bind(item_type)
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(vote)
}

/// One ledger row per (item_type, item_id, user_id); a repeat vote
/// overwrites the row, it never appends.
pub async fn upsert_vote(
    tx: &mut Transaction<'_, Postgres>,
    item_type: VotableType,
    item_id: Uuid,
    user_id: Uuid,
    vote_type: VoteType,
) -> Result<Vote, AppError> {
    let vote = crate::log_query_fetch_one!(
        "votes.upsert_vote",
        sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO forum.vote (item_type, item_id, user_id, vote_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (item_type, item_id, user_id)
            DO UPDATE SET vote_type = EXCLUDED.vote_type, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(item_type)
        .bind(item_id)
        .bind(user_id)
        .bind(vote_type)
        .fetch_one(&mut **tx)
    )?;

    Ok(vote)
}
