//! Flat-to-tree comment transform: filter, then sort, then nest by parent
//! reference. All three steps are pure functions over the fetched snapshot;
//! the tree is rebuilt on every fetch and never mutated in place.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    dto::comments::{CommentNode, CommentResponse},
    models::comments::CommentSort,
};

/// Visual indentation cap for clients. Replies deeper than this still exist
/// in the tree; renderers just stop indenting.
pub const MAX_RENDER_DEPTH: usize = 8;

pub fn render_depth(depth: usize) -> usize {
    depth.min(MAX_RENDER_DEPTH)
}

/// Case-insensitive substring filter on content or author display name.
/// A blank query passes everything through.
pub fn filter_comments(comments: Vec<CommentResponse>, query: Option<&str>) -> Vec<CommentResponse> {
    let Some(needle) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return comments;
    };
    let needle = needle.to_lowercase();
    comments
        .into_iter()
        .filter(|comment| {
            comment.content.to_lowercase().contains(&needle)
                || comment.author.display_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Orders the flat list. Every strategy uses a stable sort, so ties keep
/// their fetch order (creation order).
pub fn sort_comments(mut comments: Vec<CommentResponse>, sort: CommentSort) -> Vec<CommentResponse> {
    match sort {
        CommentSort::Top => comments.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
        CommentSort::Newest => comments.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        CommentSort::Oldest => comments.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        CommentSort::Controversial => comments.sort_by(|a, b| {
            let engagement_a = a.upvotes + a.downvotes;
            let engagement_b = b.upvotes + b.downvotes;
            engagement_b.cmp(&engagement_a)
        }),
    }
    comments
}

/// Nests the flat list by parent reference, preserving input order at every
/// level. A comment whose parent is not in the input set (deleted, or
/// excluded by the filter) is promoted to a root rather than dropped, and
/// members of a parent cycle are promoted the same way, so the tree always
/// holds exactly the input comments.
pub fn build_comment_tree(comments: Vec<CommentResponse>) -> Vec<CommentNode> {
    let order: Vec<Uuid> = comments.iter().map(|comment| comment.id).collect();
    let present: HashSet<Uuid> = order.iter().copied().collect();

    let mut roots: Vec<Uuid> = Vec::new();
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for comment in &comments {
        match comment
            .parent_id
            .filter(|parent| present.contains(parent) && *parent != comment.id)
        {
            Some(parent) => children.entry(parent).or_default().push(comment.id),
            None => roots.push(comment.id),
        }
    }

    let mut by_id: HashMap<Uuid, CommentResponse> = comments
        .into_iter()
        .map(|comment| (comment.id, comment))
        .collect();

    let mut tree: Vec<CommentNode> = roots
        .iter()
        .filter_map(|root| assemble(*root, &mut by_id, &children))
        .collect();

    // Comments caught in a parent cycle are unreachable from any root.
    // Promote whatever is left, in input order.
    for id in order {
        if by_id.contains_key(&id) {
            if let Some(node) = assemble(id, &mut by_id, &children) {
                tree.push(node);
            }
        }
    }

    tree
}

fn assemble(
    id: Uuid,
    by_id: &mut HashMap<Uuid, CommentResponse>,
    children: &HashMap<Uuid, Vec<Uuid>>,
) -> Option<CommentNode> {
    let comment = by_id.remove(&id)?;
    let replies = children
        .get(&id)
        .map(|ids| {
            ids.iter()
                .filter_map(|child| assemble(*child, by_id, children))
                .collect()
        })
        .unwrap_or_default();
    Some(CommentNode { comment, replies })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::comments::CommentAuthorResponse;
    use chrono::{Duration, TimeZone, Utc};

    fn comment(id: u32, parent: Option<u32>, upvotes: i32) -> CommentResponse {
        comment_full(id, parent, upvotes, 0, "some reply", "Student")
    }

    fn comment_full(
        id: u32,
        parent: Option<u32>,
        upvotes: i32,
        downvotes: i32,
        content: &str,
        author: &str,
    ) -> CommentResponse {
        let base = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
        CommentResponse {
            id: Uuid::from_u128(id as u128),
            question_id: Uuid::from_u128(1_000_000),
            parent_id: parent.map(|p| Uuid::from_u128(p as u128)),
            created_by: Uuid::from_u128(2_000_000),
            author: CommentAuthorResponse {
                id: Uuid::from_u128(2_000_000),
                display_name: author.to_string(),
                avatar_url: None,
            },
            content: content.to_string(),
            upvotes,
            downvotes,
            created_at: base + Duration::minutes(id as i64),
        }
    }

    fn node_count(nodes: &[CommentNode]) -> usize {
        nodes
            .iter()
            .map(|node| 1 + node_count(&node.replies))
            .sum()
    }

    fn ids(nodes: &[CommentNode]) -> Vec<u128> {
        nodes.iter().map(|node| node.comment.id.as_u128()).collect()
    }

    #[test]
    fn tree_keeps_every_comment() {
        let flat = vec![
            comment(1, None, 0),
            comment(2, Some(1), 0),
            comment(3, Some(2), 0),
            comment(4, None, 0),
            comment(5, Some(4), 0),
        ];
        let tree = build_comment_tree(flat);
        assert_eq!(node_count(&tree), 5);
        assert_eq!(ids(&tree), vec![1, 4]);
    }

    #[test]
    fn orphan_is_promoted_to_root() {
        let flat = vec![comment(1, None, 0), comment(2, Some(99), 0)];
        let tree = build_comment_tree(flat);
        assert_eq!(ids(&tree), vec![1, 2]);
        assert!(tree.iter().all(|node| node.replies.is_empty()));
    }

    #[test]
    fn children_keep_input_order() {
        let flat = vec![
            comment(1, None, 0),
            comment(3, Some(1), 5),
            comment(2, Some(1), 9),
        ];
        let tree = build_comment_tree(flat);
        assert_eq!(ids(&tree), vec![1]);
        let reply_ids: Vec<u128> = tree[0]
            .replies
            .iter()
            .map(|node| node.comment.id.as_u128())
            .collect();
        assert_eq!(reply_ids, vec![3, 2]);
    }

    #[test]
    fn deep_chain_is_fully_nested() {
        let flat: Vec<_> = (1..=12)
            .map(|id| comment(id, (id > 1).then(|| id - 1), 0))
            .collect();
        let tree = build_comment_tree(flat);
        assert_eq!(node_count(&tree), 12);

        let mut depth = 0;
        let mut cursor = &tree[0];
        while let Some(next) = cursor.replies.first() {
            depth += 1;
            cursor = next;
        }
        assert_eq!(depth, 11);
        // Data depth is uncapped; only the render indent saturates.
        assert_eq!(render_depth(depth), MAX_RENDER_DEPTH);
    }

    #[test]
    fn top_sort_is_stable_for_ties() {
        let flat = vec![
            comment(1, None, 5),
            comment(2, None, 5),
            comment(3, None, 2),
            comment(4, None, 8),
        ];
        let sorted = sort_comments(flat, CommentSort::Top);
        let order: Vec<u128> = sorted.iter().map(|c| c.id.as_u128()).collect();
        assert_eq!(order, vec![4, 1, 2, 3]);
    }

    #[test]
    fn newest_and_oldest_are_inverses() {
        let flat = vec![comment(1, None, 0), comment(2, None, 0), comment(3, None, 0)];
        let newest = sort_comments(flat.clone(), CommentSort::Newest);
        let oldest = sort_comments(flat, CommentSort::Oldest);
        let newest_ids: Vec<u128> = newest.iter().map(|c| c.id.as_u128()).collect();
        let oldest_ids: Vec<u128> = oldest.iter().map(|c| c.id.as_u128()).collect();
        assert_eq!(newest_ids, vec![3, 2, 1]);
        assert_eq!(oldest_ids, vec![1, 2, 3]);
    }

    #[test]
    fn controversial_ranks_by_total_engagement() {
        let flat = vec![
            comment_full(1, None, 10, 0, "a", "A"),
            comment_full(2, None, 6, 6, "b", "B"),
            comment_full(3, None, 1, 2, "c", "C"),
        ];
        let sorted = sort_comments(flat, CommentSort::Controversial);
        let order: Vec<u128> = sorted.iter().map(|c| c.id.as_u128()).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn blank_query_passes_through() {
        let flat = vec![comment(1, None, 0), comment(2, None, 0)];
        assert_eq!(filter_comments(flat.clone(), None).len(), 2);
        assert_eq!(filter_comments(flat, Some("   ")).len(), 2);
    }

    #[test]
    fn filter_matches_content_and_author() {
        let flat = vec![
            comment_full(1, None, 0, 0, "the library closes at ten", "Alice"),
            comment_full(2, None, 0, 0, "unrelated", "Bob LIBRARYfan"),
            comment_full(3, None, 0, 0, "unrelated", "Carol"),
        ];
        let filtered = filter_comments(flat, Some("Library"));
        let kept: Vec<u128> = filtered.iter().map(|c| c.id.as_u128()).collect();
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn filtered_parent_promotes_matching_child() {
        let flat = vec![
            comment_full(1, None, 0, 0, "parent without the term", "Alice"),
            comment_full(2, Some(1), 0, 0, "child mentions exams", "Bob"),
        ];
        let filtered = filter_comments(flat, Some("exams"));
        let tree = build_comment_tree(filtered);
        assert_eq!(ids(&tree), vec![2]);
        assert!(tree[0].replies.is_empty());
    }

    #[test]
    fn parent_cycle_keeps_all_comments() {
        // 1 and 2 claim each other as parent; 3 is an ordinary root.
        let flat = vec![
            comment(1, Some(2), 0),
            comment(2, Some(1), 0),
            comment(3, None, 0),
        ];
        let tree = build_comment_tree(flat);
        assert_eq!(node_count(&tree), 3);
        assert_eq!(ids(&tree), vec![3, 1]);
        assert_eq!(tree[1].replies[0].comment.id.as_u128(), 2);
    }

    #[test]
    fn self_referencing_comment_is_a_root() {
        let flat = vec![comment(7, Some(7), 0)];
        let tree = build_comment_tree(flat);
        assert_eq!(ids(&tree), vec![7]);
    }

    #[test]
    fn sort_then_nest_end_to_end() {
        // A(id 1) root with 3 upvotes, B(id 2) replies to A, C(id 3) points
        // at a missing parent and has the highest score.
        let flat = vec![
            comment(1, None, 3),
            comment(2, Some(1), 1),
            comment(3, Some(99), 5),
        ];
        let sorted = sort_comments(flat, CommentSort::Top);
        let tree = build_comment_tree(sorted);

        assert_eq!(ids(&tree), vec![3, 1]);
        assert_eq!(node_count(&tree), 3);
        assert_eq!(tree[1].replies.len(), 1);
        assert_eq!(tree[1].replies[0].comment.id.as_u128(), 2);
    }
}
