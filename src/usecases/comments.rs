use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{
        middleware::AuthUser,
        permissions::{Capability, is_moderator, require_capability},
    },
    dto::comments::{
        CommentAuthorResponse, CommentResponse, CommentTreeResponse, CreateCommentRequest,
        ListCommentsQuery,
    },
    error::AppError,
    repositories::{
        comments as comment_repo, comments::CreateCommentParams, questions as question_repo,
    },
    telemetry::BusinessEvent,
    usecases::threading,
};

pub struct CommentService;

const MIN_COMMENT_LENGTH: usize = 1;
const MAX_COMMENT_LENGTH: usize = 5000;

impl CommentService {
    pub async fn create_comment(
        pool: &PgPool,
        user: &AuthUser,
        question_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentResponse, AppError> {
        require_capability(user, Capability::CreateQuestions)?;

        question_repo::find_question_by_id(pool, question_id)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let content = normalize_comment_content(&req.content)?;

        // A reply target must be a live comment of the same question.
        if let Some(parent_id) = req.parent_id {
            let parent_exists =
                comment_repo::exists_in_question(pool, question_id, parent_id).await?;
            if !parent_exists {
                return Err(AppError::NotFound("Parent comment not found".to_string()));
            }
        }

        let mut tx = pool.begin().await?;
        let row = comment_repo::create_comment(
            &mut tx,
            CreateCommentParams {
                question_id,
                parent_id: req.parent_id,
                created_by: user.user_id,
                content,
            },
        )
        .await?;
        question_repo::record_reply(&mut tx, question_id).await?;
        tx.commit().await?;

        BusinessEvent::CommentCreated {
            comment_id: row.id,
            question_id,
            parent_id: row.parent_id,
            actor_id: user.user_id,
        }
        .log();

        Ok(map_comment_response(row))
    }

    /// Fetches the flat snapshot, runs it through the filter/sort pipeline
    /// and nests it into the reply tree.
    pub async fn list_comments(
        pool: &PgPool,
        user: &AuthUser,
        question_id: Uuid,
        query: ListCommentsQuery,
    ) -> Result<CommentTreeResponse, AppError> {
        require_capability(user, Capability::ReadForums)?;

        question_repo::find_question_by_id(pool, question_id)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let rows = comment_repo::list_comments(pool, question_id).await?;
        let comments: Vec<CommentResponse> = rows.into_iter().map(map_comment_response).collect();

        let filtered = threading::filter_comments(comments, query.search.as_deref());
        let sorted = threading::sort_comments(filtered, query.sort.unwrap_or_default());
        let total = sorted.len();
        let data = threading::build_comment_tree(sorted);

        Ok(CommentTreeResponse { data, total })
    }

    pub async fn delete_comment(
        pool: &PgPool,
        user: &AuthUser,
        comment_id: Uuid,
    ) -> Result<(), AppError> {
        let row = comment_repo::find_comment_by_id(pool, comment_id)
            .await?
            .ok_or(AppError::NotFound("Comment not found".to_string()))?;

        let is_owner = row.created_by == user.user_id;
        if !is_owner && !is_moderator(user.role) {
            return Err(AppError::Forbidden(
                "Only the author or a moderator can delete this comment".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;
        comment_repo::soft_delete_comment(&mut tx, comment_id).await?;
        question_repo::remove_reply(&mut tx, row.question_id).await?;
        tx.commit().await?;

        BusinessEvent::CommentDeleted {
            comment_id,
            question_id: row.question_id,
            actor_id: user.user_id,
        }
        .log();

        Ok(())
    }
}

fn normalize_comment_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len < MIN_COMMENT_LENGTH {
        return Err(AppError::ValidationError(
            "Comment content is required".to_string(),
        ));
    }
    if len > MAX_COMMENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Comment content exceeds {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn map_comment_response(row: comment_repo::CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        question_id: row.question_id,
        parent_id: row.parent_id,
        created_by: row.created_by,
        author: CommentAuthorResponse {
            id: row.created_by,
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        },
        content: row.content,
        upvotes: row.upvotes,
        downvotes: row.downvotes,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_content() {
        let result = normalize_comment_content("   ");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn rejects_long_content() {
        let content = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let result = normalize_comment_content(&content);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn trims_content() {
        let result = normalize_comment_content("  Anyone else in CS201? ").expect("valid");
        assert_eq!(result, "Anyone else in CS201?");
    }
}
