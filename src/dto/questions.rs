use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub community_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuestionsQuery {
    pub community_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionAuthorResponse {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub community_id: String,
    pub created_by: Uuid,
    pub author: QuestionAuthorResponse,
    pub title: String,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub views: i32,
    pub reply_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct QuestionListResponse {
    pub data: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize)]
pub struct QuestionActionMessage {
    pub message: String,
}
