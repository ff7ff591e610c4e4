use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::{JwtConfig, hash_password, verify_password},
        middleware::AuthUser,
        permissions::{Capability, require_capability},
    },
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateRoleRequest, UserResponse},
    error::AppError,
    repositories::users as user_repo,
    telemetry::{BusinessEvent, redact_email},
};

pub struct AuthService;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_DISPLAY_NAME_LENGTH: usize = 80;

impl AuthService {
    /// Registers a campus account. Sign-up is closed to everyone outside
    /// the configured institutional email domains.
    pub async fn register(
        pool: &PgPool,
        jwt_config: &JwtConfig,
        allowed_domains: &[String],
        req: RegisterRequest,
    ) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&req.email)?;
        if !email_domain_allowed(&email, allowed_domains) {
            return Err(AppError::ValidationError(
                "Registration requires an institutional email address".to_string(),
            ));
        }
        let display_name = normalize_display_name(&req.display_name)?;
        if req.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if user_repo::find_user_by_email(pool, &email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)
            .map_err(|err| AppError::Internal(format!("password hashing failed: {}", err)))?;
        let user = user_repo::create_user(pool, &email, &password_hash, &display_name).await?;

        BusinessEvent::UserRegistered {
            user_id: user.id,
            email_redacted: redact_email(&user.email),
        }
        .log();

        let token = jwt_config
            .create_token(user.id, user.email.clone())
            .map_err(|err| AppError::Internal(format!("token creation failed: {}", err)))?;

        Ok(LoginResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn login(
        pool: &PgPool,
        jwt_config: &JwtConfig,
        req: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&req.email)?;

        let user = user_repo::find_user_by_email(pool, &email).await?;
        let Some(user) = user else {
            BusinessEvent::LoginFailed {
                email_redacted: redact_email(&email),
                reason: "unknown email".to_string(),
            }
            .log();
            return Err(AppError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ));
        };

        let Some(password_hash) = user.password_hash.as_deref() else {
            return Err(AppError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ));
        };
        let valid = verify_password(&req.password, password_hash)
            .map_err(|err| AppError::Internal(format!("password verification failed: {}", err)))?;
        if !valid {
            BusinessEvent::LoginFailed {
                email_redacted: redact_email(&email),
                reason: "wrong password".to_string(),
            }
            .log();
            return Err(AppError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ));
        }
        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        BusinessEvent::UserLoggedIn { user_id: user.id }.log();

        let token = jwt_config
            .create_token(user.id, user.email.clone())
            .map_err(|err| AppError::Internal(format!("token creation failed: {}", err)))?;

        Ok(LoginResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn me(pool: &PgPool, user: &AuthUser) -> Result<UserResponse, AppError> {
        let record = user_repo::find_user_by_id(pool, user.user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;
        Ok(UserResponse::from(record))
    }

    /// Role management for admins. The role is the only thing stored;
    /// capability sets follow from it automatically.
    pub async fn update_role(
        pool: &PgPool,
        actor: &AuthUser,
        target_id: Uuid,
        req: UpdateRoleRequest,
    ) -> Result<UserResponse, AppError> {
        require_capability(actor, Capability::ManageUsers)?;
        if actor.user_id == target_id {
            return Err(AppError::BadRequest(
                "You cannot change your own role".to_string(),
            ));
        }

        let user = user_repo::update_user_role(pool, target_id, req.role)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        BusinessEvent::RoleChanged {
            user_id: user.id,
            changed_by: actor.user_id,
            role: user.role,
        }
        .log();

        Ok(UserResponse::from(user))
    }
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let trimmed = email.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AppError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(trimmed)
}

fn normalize_display_name(display_name: &str) -> Result<String, AppError> {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "Display name is required".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Display name exceeds {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// The institutional gate: the part after '@' must match one of the
/// configured domains exactly (case-insensitive).
fn email_domain_allowed(email: &str, allowed_domains: &[String]) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    allowed_domains
        .iter()
        .any(|allowed| domain.eq_ignore_ascii_case(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> Vec<String> {
        vec!["campus.edu".to_string(), "alumni.campus.edu".to_string()]
    }

    #[test]
    fn accepts_institutional_email() {
        assert!(email_domain_allowed("student@campus.edu", &domains()));
        assert!(email_domain_allowed("grad@ALUMNI.campus.edu", &domains()));
    }

    #[test]
    fn rejects_outside_email() {
        assert!(!email_domain_allowed("someone@gmail.com", &domains()));
        assert!(!email_domain_allowed("no-at-sign", &domains()));
    }

    #[test]
    fn rejects_lookalike_subdomain() {
        assert!(!email_domain_allowed("a@campus.edu.evil.com", &domains()));
    }

    #[test]
    fn normalizes_email_case() {
        let email = normalize_email("  Student@Campus.EDU ").expect("valid");
        assert_eq!(email, "student@campus.edu");
    }

    #[test]
    fn rejects_email_without_at() {
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_blank_display_name() {
        assert!(matches!(
            normalize_display_name("   "),
            Err(AppError::ValidationError(_))
        ));
    }
}
