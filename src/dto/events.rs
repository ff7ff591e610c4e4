use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub community_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub community_id: Option<String>,
    pub upcoming: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EventAuthorResponse {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub community_id: String,
    pub created_by: Uuid,
    pub author: EventAuthorResponse,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub data: Vec<EventResponse>,
}

#[derive(Debug, Serialize)]
pub struct EventActionMessage {
    pub message: String,
}
