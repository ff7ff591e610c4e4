use serde::{Deserialize, Serialize};

use crate::{auth::middleware::AuthUser, error::AppError, models::users::UserRole};

/// A single named permission governing access to one action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ReadForums,
    CreateQuestions,
    Vote,
    CreateEvents,
    ManageEvents,
    ModerateForums,
    ManageUsers,
    DeleteContent,
}

const USER_CAPABILITIES: &[Capability] = &[
    Capability::ReadForums,
    Capability::CreateQuestions,
    Capability::Vote,
];

const MODERATOR_CAPABILITIES: &[Capability] = &[
    Capability::ReadForums,
    Capability::CreateQuestions,
    Capability::Vote,
    Capability::CreateEvents,
    Capability::ManageEvents,
    Capability::ModerateForums,
];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ReadForums,
    Capability::CreateQuestions,
    Capability::Vote,
    Capability::CreateEvents,
    Capability::ManageEvents,
    Capability::ModerateForums,
    Capability::ManageUsers,
    Capability::DeleteContent,
];

/// Capability set for a role. Sets are monotone: each role keeps everything
/// the role below it has. This is the only source of permissions; nothing
/// is persisted per user.
pub fn capabilities_for(role: UserRole) -> &'static [Capability] {
    match role {
        UserRole::User => USER_CAPABILITIES,
        UserRole::Moderator => MODERATOR_CAPABILITIES,
        UserRole::Admin => ADMIN_CAPABILITIES,
    }
}

pub fn role_allows(role: UserRole, capability: Capability) -> bool {
    capabilities_for(role).contains(&capability)
}

/// Fail-closed capability check: no principal means no access.
pub fn has_capability(principal: Option<&AuthUser>, capability: Capability) -> bool {
    principal.is_some_and(|user| role_allows(user.role, capability))
}

pub fn is_moderator(role: UserRole) -> bool {
    matches!(role, UserRole::Moderator | UserRole::Admin)
}

pub fn is_admin(role: UserRole) -> bool {
    matches!(role, UserRole::Admin)
}

pub fn require_capability(user: &AuthUser, capability: Capability) -> Result<(), AppError> {
    if has_capability(Some(user), capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to do this".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "student@campus.edu".to_string(),
            display_name: "Student".to_string(),
            role,
        }
    }

    #[test]
    fn role_sets_are_monotone() {
        let user = capabilities_for(UserRole::User);
        let moderator = capabilities_for(UserRole::Moderator);
        let admin = capabilities_for(UserRole::Admin);

        for capability in user {
            assert!(moderator.contains(capability));
        }
        for capability in moderator {
            assert!(admin.contains(capability));
        }
    }

    #[test]
    fn missing_principal_is_denied() {
        assert!(!has_capability(None, Capability::ReadForums));
    }

    #[test]
    fn user_cannot_manage_events() {
        let user = principal(UserRole::User);
        assert!(has_capability(Some(&user), Capability::Vote));
        assert!(!has_capability(Some(&user), Capability::ManageEvents));
    }

    #[test]
    fn only_admin_is_admin() {
        assert!(is_admin(UserRole::Admin));
        assert!(!is_admin(UserRole::Moderator));
        assert!(!is_admin(UserRole::User));
    }

    #[test]
    fn moderator_check_covers_admin() {
        assert!(is_moderator(UserRole::Admin));
        assert!(is_moderator(UserRole::Moderator));
        assert!(!is_moderator(UserRole::User));
    }

    #[test]
    fn require_capability_rejects_with_forbidden() {
        let user = principal(UserRole::User);
        let result = require_capability(&user, Capability::DeleteContent);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
