use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OauthConfig {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub post_login_redirect: String,
    pub post_logout_redirect: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session_secret: String,
    pub oauth: OauthConfig,
    pub admin_emails: HashSet<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session_secret = std::env::var("SESSION_SECRET")?;
        let oauth = OauthConfig {
            domain: std::env::var("AUTH0_DOMAIN")?,
            client_id: std::env::var("AUTH0_CLIENT_ID")?,
            client_secret: std::env::var("AUTH0_CLIENT_SECRET")?,
            callback_url: std::env::var("AUTH0_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:8080/callback".into()),
            post_login_redirect: std::env::var("POST_LOGIN_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:5173/".into()),
            post_logout_redirect: std::env::var("POST_LOGOUT_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:5173/".into()),
        };
        let admin_emails =
            parse_admin_emails(&std::env::var("ADMIN_EMAILS").unwrap_or_default());
        Ok(Self {
            database_url,
            session_secret,
            oauth,
            admin_emails,
        })
    }

    /// The allow-list is the single source of admin rights at login time.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(email)
    }
}

/// Parse the comma-separated `ADMIN_EMAILS` value into a set, ignoring
/// blanks and normalizing case the same way login does.
fn parse_admin_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_admin_list() {
        let set = parse_admin_emails("alice@example.com, Bob@Example.com");
        assert_eq!(set.len(), 2);
        assert!(set.contains("alice@example.com"));
        assert!(set.contains("bob@example.com"));
    }

    #[test]
    fn empty_admin_list_yields_empty_set() {
        assert!(parse_admin_emails("").is_empty());
        assert!(parse_admin_emails(" , ,").is_empty());
    }

    #[test]
    fn is_admin_email_checks_membership() {
        let config = AppConfig {
            database_url: "postgres://localhost/yapper".into(),
            session_secret: "secret".into(),
            oauth: OauthConfig {
                domain: "tenant.auth0.com".into(),
                client_id: "client".into(),
                client_secret: "shh".into(),
                callback_url: "http://localhost:8080/callback".into(),
                post_login_redirect: "http://localhost:5173/".into(),
                post_logout_redirect: "http://localhost:5173/".into(),
            },
            admin_emails: parse_admin_emails("admin@example.com"),
        };
        assert!(config.is_admin_email("admin@example.com"));
        assert!(!config.is_admin_email("user@example.com"));
    }
}
