use anyhow::Context;
use axum::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::OauthConfig;

/// Identity claims returned by the provider's userinfo endpoint.
///
/// `email` is optional on the wire: some provider connections do not share
/// it, and the login flow must treat that as a hard failure.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Outbound adapter for the third-party identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the client is redirected to in order to start the code flow.
    fn authorize_url(&self) -> String;
    /// Provider-side logout URL, carrying the client id and return-to URL.
    fn logout_url(&self) -> String;
    /// Exchange an authorization code for the caller's identity claims.
    async fn exchange_code(&self, code: &str) -> anyhow::Result<IdentityClaims>;
}

/// Auth0-flavoured implementation speaking plain HTTPS.
#[derive(Debug)]
pub struct Auth0Provider {
    http: reqwest::Client,
    base: Url,
    oauth: OauthConfig,
}

impl Auth0Provider {
    pub fn new(oauth: OauthConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&format!("https://{}", oauth.domain))
            .context("invalid identity provider domain")?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            oauth,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }
}

#[async_trait]
impl IdentityProvider for Auth0Provider {
    fn authorize_url(&self) -> String {
        let mut url = self.endpoint("/authorize");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.oauth.client_id)
            .append_pair("redirect_uri", &self.oauth.callback_url)
            .append_pair("scope", "openid profile email");
        url.into()
    }

    fn logout_url(&self) -> String {
        let mut url = self.endpoint("/v2/logout");
        url.query_pairs_mut()
            .append_pair("client_id", &self.oauth.client_id)
            .append_pair("returnTo", &self.oauth.post_logout_redirect);
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> anyhow::Result<IdentityClaims> {
        let token: TokenResponse = self
            .http
            .post(self.endpoint("/oauth/token"))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.oauth.callback_url.as_str()),
            ])
            .send()
            .await
            .context("token endpoint unreachable")?
            .error_for_status()
            .context("token exchange rejected")?
            .json()
            .await
            .context("malformed token response")?;

        let claims: IdentityClaims = self
            .http
            .get(self.endpoint("/userinfo"))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("userinfo endpoint unreachable")?
            .error_for_status()
            .context("userinfo request rejected")?
            .json()
            .await
            .context("malformed userinfo response")?;

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OauthConfig;

    fn make_provider() -> Auth0Provider {
        Auth0Provider::new(OauthConfig {
            domain: "tenant.auth0.com".into(),
            client_id: "client-123".into(),
            client_secret: "shh".into(),
            callback_url: "http://localhost:8080/callback".into(),
            post_login_redirect: "http://localhost:5173/".into(),
            post_logout_redirect: "http://localhost:5173/bye".into(),
        })
        .expect("provider should construct")
    }

    #[test]
    fn authorize_url_carries_code_flow_params() {
        let url = make_provider().authorize_url();
        assert!(url.starts_with("https://tenant.auth0.com/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"));
        assert!(url.contains("scope=openid+profile+email"));
    }

    #[test]
    fn logout_url_carries_client_id_and_return_to() {
        let url = make_provider().logout_url();
        assert!(url.starts_with("https://tenant.auth0.com/v2/logout?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("returnTo=http%3A%2F%2Flocalhost%3A5173%2Fbye"));
    }

    #[test]
    fn rejects_unparseable_domain() {
        let err = Auth0Provider::new(OauthConfig {
            domain: "not a domain".into(),
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: String::new(),
            post_login_redirect: String::new(),
            post_logout_redirect: String::new(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("identity provider domain"));
    }

    #[test]
    fn userinfo_without_email_deserializes_to_none() {
        let claims: IdentityClaims =
            serde_json::from_str(r#"{"sub": "auth0|123", "name": "A"}"#)
                .expect("claims should deserialize");
        assert_eq!(claims.sub, "auth0|123");
        assert!(claims.email.is_none());
    }

    #[test]
    fn userinfo_with_email_deserializes() {
        let claims: IdentityClaims =
            serde_json::from_str(r#"{"sub": "auth0|123", "email": "a@example.com"}"#)
                .expect("claims should deserialize");
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
    }
}
