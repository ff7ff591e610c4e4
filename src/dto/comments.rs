use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::comments::CommentSort;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCommentsQuery {
    pub sort: Option<CommentSort>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentAuthorResponse {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub question_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_by: Uuid,
    pub author: CommentAuthorResponse,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

/// One node of the reply tree: the comment plus its ordered replies.
/// Built fresh on every fetch, never persisted.
#[derive(Debug, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct CommentTreeResponse {
    pub data: Vec<CommentNode>,
    pub total: usize,
}
