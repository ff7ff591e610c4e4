use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    users::UserRole,
    votes::{VotableType, VoteType},
};

#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    UserRegistered {
        user_id: Uuid,
        email_redacted: String,
    },
    UserLoggedIn {
        user_id: Uuid,
    },
    LoginFailed {
        email_redacted: String,
        reason: String,
    },
    RoleChanged {
        user_id: Uuid,
        changed_by: Uuid,
        role: UserRole,
    },
    QuestionCreated {
        question_id: Uuid,
        community_id: String,
        actor_id: Uuid,
    },
    QuestionDeleted {
        question_id: Uuid,
        actor_id: Uuid,
    },
    EventCreated {
        event_id: Uuid,
        community_id: String,
        actor_id: Uuid,
    },
    EventDeleted {
        event_id: Uuid,
        actor_id: Uuid,
    },
    CommentCreated {
        comment_id: Uuid,
        question_id: Uuid,
        parent_id: Option<Uuid>,
        actor_id: Uuid,
    },
    CommentDeleted {
        comment_id: Uuid,
        question_id: Uuid,
        actor_id: Uuid,
    },
    VoteCast {
        item_type: VotableType,
        item_id: Uuid,
        actor_id: Uuid,
        vote: VoteType,
    },
}

pub fn redact_email(email: &str) -> String {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return "***".to_string();
    }
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() {
        return "***".to_string();
    }
    let first_char = local.chars().next().unwrap_or('*');
    format!("{first_char}***@{domain}")
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        info!(
            target: "business_events",
            event = %event_json,
            "Business event occurred"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::redact_email;

    #[test]
    fn redacts_valid_email() {
        assert_eq!(redact_email("student@campus.edu"), "s***@campus.edu");
    }

    #[test]
    fn redacts_missing_domain() {
        assert_eq!(redact_email("invalid"), "***");
    }

    #[test]
    fn redacts_empty_value() {
        assert_eq!(redact_email(""), "***");
    }
}
