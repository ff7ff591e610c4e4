use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{
        middleware::AuthUser,
        permissions::{Capability, require_capability, role_allows},
    },
    dto::questions::{
        CreateQuestionRequest, ListQuestionsQuery, QuestionAuthorResponse, QuestionListResponse,
        QuestionResponse, UpdateQuestionRequest,
    },
    error::AppError,
    models::communities,
    repositories::{questions as question_repo, questions::CreateQuestionParams},
    telemetry::BusinessEvent,
};

pub struct QuestionService;

const MIN_TITLE_LENGTH: usize = 8;
const MAX_TITLE_LENGTH: usize = 200;
const MIN_CONTENT_LENGTH: usize = 1;
const MAX_CONTENT_LENGTH: usize = 10_000;

impl QuestionService {
    pub async fn create_question(
        pool: &PgPool,
        user: &AuthUser,
        req: CreateQuestionRequest,
    ) -> Result<QuestionResponse, AppError> {
        require_capability(user, Capability::CreateQuestions)?;

        let community_id = validate_community(&req.community_id)?;
        let title = normalize_title(&req.title)?;
        let content = normalize_content(&req.content)?;

        let row = question_repo::create_question(
            pool,
            CreateQuestionParams {
                community_id: community_id.to_string(),
                created_by: user.user_id,
                title,
                content,
            },
        )
        .await?;

        BusinessEvent::QuestionCreated {
            question_id: row.id,
            community_id: row.community_id.clone(),
            actor_id: user.user_id,
        }
        .log();

        Ok(map_question_response(row))
    }

    /// Reading a question bumps its view counter as a side effect. The
    /// increment is commutative, so concurrent readers never lose updates.
    pub async fn get_question(
        pool: &PgPool,
        user: &AuthUser,
        question_id: Uuid,
    ) -> Result<QuestionResponse, AppError> {
        require_capability(user, Capability::ReadForums)?;

        let touched = question_repo::increment_views(pool, question_id).await?;
        if touched == 0 {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
        let row = question_repo::find_question_by_id(pool, question_id)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        Ok(map_question_response(row))
    }

    pub async fn list_questions(
        pool: &PgPool,
        user: &AuthUser,
        query: ListQuestionsQuery,
    ) -> Result<QuestionListResponse, AppError> {
        require_capability(user, Capability::ReadForums)?;

        if let Some(community_id) = query.community_id.as_deref() {
            validate_community(community_id)?;
        }

        let rows = question_repo::list_questions(pool, query.community_id.as_deref()).await?;
        let data = rows.into_iter().map(map_question_response).collect();

        Ok(QuestionListResponse { data })
    }

    pub async fn update_question(
        pool: &PgPool,
        user: &AuthUser,
        question_id: Uuid,
        req: UpdateQuestionRequest,
    ) -> Result<QuestionResponse, AppError> {
        let existing = question_repo::find_question_by_id(pool, question_id)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let is_owner = existing.created_by == user.user_id;
        if !is_owner && !role_allows(user.role, Capability::ModerateForums) {
            return Err(AppError::Forbidden(
                "Only the author or a moderator can edit this question".to_string(),
            ));
        }

        let title = req.title.as_deref().map(normalize_title).transpose()?;
        let content = req.content.as_deref().map(normalize_content).transpose()?;
        if title.is_none() && content.is_none() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        let row = question_repo::update_question(pool, question_id, title, content)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        Ok(map_question_response(row))
    }

    pub async fn delete_question(
        pool: &PgPool,
        user: &AuthUser,
        question_id: Uuid,
    ) -> Result<(), AppError> {
        let existing = question_repo::find_question_by_id(pool, question_id)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let is_owner = existing.created_by == user.user_id;
        if !is_owner && !role_allows(user.role, Capability::DeleteContent) {
            return Err(AppError::Forbidden(
                "Only the author or an admin can delete this question".to_string(),
            ));
        }

        question_repo::soft_delete_question(pool, question_id).await?;

        BusinessEvent::QuestionDeleted {
            question_id,
            actor_id: user.user_id,
        }
        .log();

        Ok(())
    }
}

fn validate_community(community_id: &str) -> Result<&str, AppError> {
    communities::find(community_id)
        .map(|community| community.id)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown community '{community_id}'")))
}

fn normalize_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len < MIN_TITLE_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Title must be at least {MIN_TITLE_LENGTH} characters"
        )));
    }
    if len > MAX_TITLE_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len < MIN_CONTENT_LENGTH {
        return Err(AppError::ValidationError(
            "Question content is required".to_string(),
        ));
    }
    if len > MAX_CONTENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Question content exceeds {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn map_question_response(row: question_repo::QuestionRow) -> QuestionResponse {
    QuestionResponse {
        id: row.id,
        community_id: row.community_id,
        created_by: row.created_by,
        author: QuestionAuthorResponse {
            id: row.created_by,
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        },
        title: row.title,
        content: row.content,
        upvotes: row.upvotes,
        downvotes: row.downvotes,
        views: row.views,
        reply_count: row.reply_count,
        created_at: row.created_at,
        last_activity_at: row.last_activity_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_title() {
        let result = normalize_title("why");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn rejects_overlong_title() {
        let title = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            normalize_title(&title),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn trims_title() {
        let title = normalize_title("  Where is the registrar office?  ").expect("valid");
        assert_eq!(title, "Where is the registrar office?");
    }

    #[test]
    fn rejects_unknown_community() {
        let result = validate_community("not-a-community");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn accepts_known_community() {
        assert_eq!(validate_community("academics").expect("valid"), "academics");
    }
}
