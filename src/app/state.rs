use sqlx::PgPool;

use crate::auth::jwt::JwtConfig;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub allowed_email_domains: Vec<String>,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using an insecure development secret");
            "campus-connect-dev-secret".to_string()
        });

        let allowed_email_domains = match std::env::var("CAMPUS_EMAIL_DOMAINS") {
            Ok(raw) => parse_domains(&raw),
            Err(_) => Vec::new(),
        };
        let allowed_email_domains = if allowed_email_domains.is_empty() {
            warn!("CAMPUS_EMAIL_DOMAINS not set, defaulting to campus.edu");
            vec!["campus.edu".to_string()]
        } else {
            allowed_email_domains
        };

        Self {
            db,
            jwt_config: JwtConfig::from_env(secret),
            allowed_email_domains,
        }
    }
}

fn parse_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|domain| domain.trim().trim_start_matches('@').to_lowercase())
        .filter(|domain| !domain.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_domains;

    #[test]
    fn parses_comma_separated_domains() {
        let domains = parse_domains("campus.edu, @Alumni.Campus.edu ,");
        assert_eq!(domains, vec!["campus.edu", "alumni.campus.edu"]);
    }

    #[test]
    fn empty_value_yields_no_domains() {
        assert!(parse_domains("  , ,").is_empty());
    }
}
