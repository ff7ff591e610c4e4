use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::votes::{VotableType, VoteType};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CastVoteRequest {
    pub item_type: VotableType,
    pub item_id: Uuid,
    pub vote: VoteType,
}

/// Outcome of a vote: the recorded direction plus the target's counters
/// after the ledger update, so the client can settle optimistic state.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub item_type: VotableType,
    pub item_id: Uuid,
    pub vote: VoteType,
    pub upvotes: i32,
    pub downvotes: i32,
}
