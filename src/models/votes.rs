use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Vote direction mapping for forum.vote_type. `None` is an explicit
/// retraction; a missing ledger row means the same thing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "forum.vote_type", rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
    None,
}

impl Default for VoteType {
    fn default() -> Self {
        Self::None
    }
}

/// Kind of entity a vote can target, mapping for forum.votable_type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "forum.votable_type", rename_all = "lowercase")]
pub enum VotableType {
    Question,
    Comment,
}

/// Ledger row mapped to forum.vote. At most one row per
/// (item_type, item_id, user_id); later votes overwrite it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: Uuid,
    pub item_type: VotableType,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
