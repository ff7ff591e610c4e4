use sqlx::PgPool;

use crate::{
    auth::{
        middleware::AuthUser,
        permissions::{Capability, require_capability},
    },
    dto::votes::{CastVoteRequest, VoteResponse},
    error::AppError,
    models::votes::{VotableType, VoteType},
    repositories::{comments as comment_repo, questions as question_repo, votes as vote_repo},
    telemetry::BusinessEvent,
};

pub struct VoteService;

impl VoteService {
    /// Records a vote and keeps the target's counters consistent with the
    /// ledger. Re-casting the current vote is a no-op; switching applies
    /// both signed deltas in one atomic increment.
    pub async fn cast_vote(
        pool: &PgPool,
        user: &AuthUser,
        req: CastVoteRequest,
    ) -> Result<VoteResponse, AppError> {
        require_capability(user, Capability::Vote)?;

        let current = vote_repo::find_vote(pool, req.item_type, req.item_id, user.user_id)
            .await?
            .map(|vote| vote.vote_type)
            .unwrap_or_default();

        if current == req.vote {
            // Idempotent repeat: no ledger write, no counter change.
            let (upvotes, downvotes) = read_counters(pool, req).await?;
            return Ok(VoteResponse {
                item_type: req.item_type,
                item_id: req.item_id,
                vote: current,
                upvotes,
                downvotes,
            });
        }

        let (up_delta, down_delta) = vote_deltas(current, req.vote);

        let mut tx = pool.begin().await?;
        vote_repo::upsert_vote(&mut tx, req.item_type, req.item_id, user.user_id, req.vote)
            .await?;
        let counters = match req.item_type {
            VotableType::Question => {
                question_repo::adjust_vote_counters(&mut tx, req.item_id, up_delta, down_delta)
                    .await?
            }
            VotableType::Comment => {
                comment_repo::adjust_vote_counters(&mut tx, req.item_id, up_delta, down_delta)
                    .await?
            }
        };
        let (upvotes, downvotes) =
            counters.ok_or(AppError::NotFound("Vote target not found".to_string()))?;
        tx.commit().await?;

        BusinessEvent::VoteCast {
            item_type: req.item_type,
            item_id: req.item_id,
            actor_id: user.user_id,
            vote: req.vote,
        }
        .log();

        Ok(VoteResponse {
            item_type: req.item_type,
            item_id: req.item_id,
            vote: req.vote,
            upvotes,
            downvotes,
        })
    }
}

async fn read_counters(pool: &PgPool, req: CastVoteRequest) -> Result<(i32, i32), AppError> {
    let counters = match req.item_type {
        VotableType::Question => question_repo::get_vote_counters(pool, req.item_id).await?,
        VotableType::Comment => comment_repo::get_vote_counters(pool, req.item_id).await?,
    };
    counters.ok_or(AppError::NotFound("Vote target not found".to_string()))
}

/// Signed counter deltas for moving from `current` to `requested`: the old
/// vote gives its counter back, the new vote takes one.
fn vote_deltas(current: VoteType, requested: VoteType) -> (i32, i32) {
    let mut up_delta = 0;
    let mut down_delta = 0;
    match current {
        VoteType::Up => up_delta -= 1,
        VoteType::Down => down_delta -= 1,
        VoteType::None => {}
    }
    match requested {
        VoteType::Up => up_delta += 1,
        VoteType::Down => down_delta += 1,
        VoteType::None => {}
    }
    (up_delta, down_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_adds_one() {
        assert_eq!(vote_deltas(VoteType::None, VoteType::Up), (1, 0));
        assert_eq!(vote_deltas(VoteType::None, VoteType::Down), (0, 1));
    }

    #[test]
    fn switching_conserves_total() {
        let (up, down) = vote_deltas(VoteType::Up, VoteType::Down);
        assert_eq!((up, down), (-1, 1));
        assert_eq!(up + down, 0);

        let (up, down) = vote_deltas(VoteType::Down, VoteType::Up);
        assert_eq!((up, down), (1, -1));
        assert_eq!(up + down, 0);
    }

    #[test]
    fn retraction_removes_one() {
        assert_eq!(vote_deltas(VoteType::Up, VoteType::None), (-1, 0));
        assert_eq!(vote_deltas(VoteType::Down, VoteType::None), (0, -1));
    }

    #[test]
    fn repeat_vote_is_a_no_delta() {
        // The service returns before computing deltas, but the math must
        // agree with the early exit.
        for vote in [VoteType::Up, VoteType::Down, VoteType::None] {
            assert_eq!(vote_deltas(vote, vote), (0, 0));
        }
    }
}
