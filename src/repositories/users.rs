use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::users::{User, UserRole},
};

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<User, AppError> {
    let user = crate::log_query_fetch_one!(
        "users.create_user",
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO core.user (email, password_hash, display_name, role)
            VALUES ($1, $2, $3, 'user')
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(pool)
    )?;

    Ok(user)
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = crate::log_query_fetch_optional!(
        "users.find_user_by_email",
        sqlx::query_as::<_, User>(
            r#"
            SELECT *
            FROM core.user
            WHERE lower(email) = lower($1)
            AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
    )?;

    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = crate::log_query_fetch_optional!(
        "users.find_user_by_id",
        sqlx::query_as::<_, User>(
            r#"
            SELECT *
            FROM core.user
            WHERE id = $1
            AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(user)
}

pub async fn update_user_role(
    pool: &PgPool,
    user_id: Uuid,
    role: UserRole,
) -> Result<Option<User>, AppError> {
    let user = crate::log_query_fetch_optional!(
        "users.update_user_role",
        sqlx::query_as::<_, User>(
            r#"
            UPDATE core.user
            SET role = $2, updated_at = now()
            WHERE id = $1
            AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
    )?;

    Ok(user)
}
