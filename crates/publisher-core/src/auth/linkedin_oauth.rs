//! ============================================================================
//! LinkedIn OAuth 2.0 Authorization Code Flow
//! ============================================================================
//! Confidential-client flow: authorization URL, anti-forgery state check on
//! callback, code-for-token exchange with the client secret, and persistence
//! of the token endpoint response.
//!
//! The session holds one state value for the life of the process, so only a
//! single authorization attempt can be in flight per server. Serving several
//! users would need per-attempt state keyed by a session id.
//! ============================================================================

use std::collections::HashMap;
use std::path::Path;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::OAuthConfig;
use crate::types::{OAuthError, TokenRecord};

/// Anti-forgery state for one server process. Read-only after creation.
#[derive(Debug, Clone)]
pub struct OAuthSession {
    state: String,
}

impl OAuthSession {
    /// Create a session with a freshly generated state value
    pub fn new() -> Self {
        Self {
            state: Self::generate_state(),
        }
    }

    /// Create a session with a known state value
    pub fn with_state(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Generate a random state parameter for CSRF protection
    fn generate_state() -> String {
        (0..32)
            .map(|_| format!("{:02x}", rand::random::<u8>()))
            .collect()
    }

    /// Exact comparison in constant time over SHA-256 digests, so neither
    /// length nor shared prefix of `received` changes the work done.
    pub fn verify(&self, received: &str) -> bool {
        let expected = Sha256::digest(self.state.as_bytes());
        let actual = Sha256::digest(received.as_bytes());
        expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Default for OAuthSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters LinkedIn appends to the redirect URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a raw query string (without the leading `?`)
    pub fn from_query(query: &str) -> Self {
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        Self {
            code: params.get("code").cloned(),
            state: params.get("state").cloned(),
            error: params.get("error").cloned(),
            error_description: params.get("error_description").cloned(),
        }
    }
}

/// LinkedIn OAuth 2.0 client
pub struct LinkedInOAuth {
    config: OAuthConfig,
    client: Client,
}

impl LinkedInOAuth {
    /// Create a new OAuth client; every request is bounded by the configured timeout
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Get the authorization URL to open in the browser
    pub fn auth_url(&self, session: &OAuthSession) -> Result<String, OAuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(OAuthError::MissingConfig("CLIENT_ID and CLIENT_SECRET"))?;

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", client_id),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("state", session.state()),
                ("scope", self.config.scopes.as_str()),
            ],
        )?;

        debug!("Generated auth URL with state: {}", session.state());
        Ok(url.into())
    }

    /// Process the redirect back from LinkedIn and, if it checks out,
    /// exchange the code and store the token.
    pub async fn handle_callback(
        &self,
        session: &OAuthSession,
        params: &CallbackParams,
    ) -> Result<TokenRecord, OAuthError> {
        if let Some(error) = &params.error {
            let description = params.error_description.clone().unwrap_or_default();
            warn!("LinkedIn returned OAuth error: {} - {}", error, description);
            return Err(OAuthError::Provider {
                error: error.clone(),
                description,
            });
        }

        // A missing state is checked like any other value so it takes the same path
        let received = params.state.as_deref().unwrap_or("");
        if !session.verify(received) {
            warn!("State mismatch on OAuth callback - possible CSRF attempt");
            debug!("Expected state {}, got {:?}", session.state(), params.state);
            return Err(OAuthError::StateMismatch);
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(OAuthError::MissingCode)?;

        info!("Received authorization code");
        self.exchange_code(code).await
    }

    /// Form fields for the token request, in wire order
    pub fn token_form<'a>(
        &'a self,
        code: &'a str,
        client_id: &'a str,
        client_secret: &'a str,
    ) -> [(&'static str, &'a str); 5] {
        [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ]
    }

    /// Exchange the authorization code for an access token and persist the
    /// response. Nothing is written unless the provider answers 2xx with JSON.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, OAuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(OAuthError::MissingConfig("CLIENT_ID"))?;
        let client_secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or(OAuthError::MissingConfig("CLIENT_SECRET"))?;

        info!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&self.token_form(code, client_id, client_secret))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Token exchange failed: {} - {}", status, body);
            return Err(OAuthError::ExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let record = TokenRecord::from_body(body)?;
        save_token(&self.config.token_path, &record).await?;

        match record.expires_in() {
            Some(secs) => info!("Successfully obtained token, expires in {} seconds", secs),
            None => info!("Successfully obtained token"),
        }

        Ok(record)
    }
}

/// Write the token record exactly as received, replacing any previous file
pub async fn save_token(path: &Path, record: &TokenRecord) -> Result<(), OAuthError> {
    tokio::fs::write(path, record.raw.as_bytes())
        .await
        .map_err(|source| OAuthError::Persist {
            path: path.display().to_string(),
            source,
        })?;
    info!("Token saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;
    use httpmock::prelude::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_config(server: &MockServer, token_path: PathBuf) -> OAuthConfig {
        OAuthConfig {
            client_id: Some("cid".into()),
            client_secret: Some("s3cret".into()),
            redirect_uri: "http://localhost:8000/callback".into(),
            scopes: "w_member_social r_liteprofile r_emailaddress".into(),
            auth_url: "https://www.linkedin.com/oauth/v2/authorization".into(),
            token_url: server.url("/oauth/v2/accessToken"),
            token_path,
            http_timeout: Duration::from_secs(5),
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn callback(state: Option<&str>, code: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(String::from),
            state: state.map(String::from),
            ..Default::default()
        }
    }

    const EXPECTED_FORM: &str = "grant_type=authorization_code&code=XYZ\
        &redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fcallback\
        &client_id=cid&client_secret=s3cret";

    #[test]
    fn test_state_generation() {
        let session = OAuthSession::new();
        assert_eq!(session.state().len(), 64); // 32 bytes * 2 hex chars
        assert!(session.state().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(session.state(), OAuthSession::new().state());
    }

    #[test]
    fn test_state_verify_is_exact() {
        let session = OAuthSession::with_state("abc123");
        assert!(session.verify("abc123"));
        assert!(!session.verify(""));
        assert!(!session.verify("abc12"));
        assert!(!session.verify("abc124"));
        assert!(!session.verify("abc1234"));
        assert!(!session.verify("ABC123"));
    }

    #[test]
    fn test_callback_params_from_query() {
        let params = CallbackParams::from_query(
            "error=user_cancelled_login&error_description=The+member+declined%21",
        );
        assert_eq!(params.error.as_deref(), Some("user_cancelled_login"));
        assert_eq!(params.error_description.as_deref(), Some("The member declined!"));
        assert!(params.code.is_none());

        let params = CallbackParams::from_query("code=XYZ&state=abc123");
        assert_eq!(params, callback(Some("abc123"), Some("XYZ")));
    }

    #[test]
    fn test_auth_url_generation() {
        let config = OAuthConfig {
            client_id: Some("my client".into()),
            ..OAuthConfig::from_lookup(&no_env)
        };
        let oauth = LinkedInOAuth::new(config).unwrap();
        let session = OAuthSession::with_state("abc123");
        let url = Url::parse(&oauth.auth_url(&session).unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("www.linkedin.com"));
        assert_eq!(url.path(), "/oauth/v2/authorization");
        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["client_id"], "my client");
        assert_eq!(pairs["redirect_uri"], "http://localhost:8000/callback");
        assert_eq!(pairs["state"], "abc123");
        assert_eq!(pairs["scope"], "w_member_social r_liteprofile r_emailaddress");
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_auth_url_without_client_id() {
        let oauth = LinkedInOAuth::new(OAuthConfig::from_lookup(&no_env)).unwrap();
        let err = oauth.auth_url(&OAuthSession::new()).unwrap_err();
        assert!(matches!(err, OAuthError::MissingConfig(_)));
        assert_eq!(err.to_string(), "Set CLIENT_ID and CLIENT_SECRET in your .env first");
    }

    #[tokio::test]
    async fn test_matching_state_exchanges_and_persists() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let body = "{\"access_token\":\"AQV-token\",\n \"expires_in\": 5183999 }";

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/v2/accessToken")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(EXPECTED_FORM);
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        });

        let oauth = LinkedInOAuth::new(test_config(&server, token_path.clone())).unwrap();
        let session = OAuthSession::with_state("abc123");
        let record = oauth
            .handle_callback(&session, &callback(Some("abc123"), Some("XYZ")))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(record.access_token(), Some("AQV-token"));
        assert_eq!(std::fs::read_to_string(&token_path).unwrap(), body);
    }

    #[tokio::test]
    async fn test_state_mismatch_never_exchanges() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");

        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/accessToken");
            then.status(200).body(r#"{"access_token":"nope"}"#);
        });

        let oauth = LinkedInOAuth::new(test_config(&server, token_path.clone())).unwrap();
        let session = OAuthSession::with_state("abc123");

        for state in [Some("WRONG"), Some(""), Some("abc12"), Some("abc124"), None] {
            let err = oauth
                .handle_callback(&session, &callback(state, Some("XYZ")))
                .await
                .unwrap_err();
            assert!(matches!(err, OAuthError::StateMismatch), "state {:?}", state);
            assert_eq!(err.http_status(), 400);
        }

        mock.assert_calls(0);
        assert!(!token_path.exists());
    }

    #[tokio::test]
    async fn test_provider_error_surfaced_verbatim() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/accessToken");
            then.status(200).body("{}");
        });

        let dir = tempfile::tempdir().unwrap();
        let oauth = LinkedInOAuth::new(test_config(&server, dir.path().join("t.json"))).unwrap();
        let params = CallbackParams {
            error: Some("user_cancelled_authorize".into()),
            error_description: Some("The user cancelled the authorization".into()),
            state: Some("abc123".into()),
            code: Some("XYZ".into()),
        };

        let err = oauth
            .handle_callback(&OAuthSession::with_state("abc123"), &params)
            .await
            .unwrap_err();

        match &err {
            OAuthError::Provider { error, description } => {
                assert_eq!(error, "user_cancelled_authorize");
                assert_eq!(description, "The user cancelled the authorization");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "Error returned: user_cancelled_authorize - The user cancelled the authorization"
        );
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_missing_code_rejected() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let oauth = LinkedInOAuth::new(test_config(&server, dir.path().join("t.json"))).unwrap();

        let err = oauth
            .handle_callback(&OAuthSession::with_state("abc123"), &callback(Some("abc123"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::MissingCode));
    }

    #[tokio::test]
    async fn test_failed_exchange_writes_nothing() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");

        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/accessToken");
            then.status(401)
                .body(r#"{"error":"invalid_client","error_description":"Client authentication failed"}"#);
        });

        let oauth = LinkedInOAuth::new(test_config(&server, token_path.clone())).unwrap();
        let err = oauth.exchange_code("XYZ").await.unwrap_err();

        mock.assert();
        match err {
            OAuthError::ExchangeFailed { status, ref body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("401"));
        assert!(!token_path.exists());
    }

    #[tokio::test]
    async fn test_exchange_overwrites_previous_token() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, r#"{"access_token":"old"}"#).unwrap();

        server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/accessToken");
            then.status(200).body(r#"{"access_token":"new","expires_in":60}"#);
        });

        let oauth = LinkedInOAuth::new(test_config(&server, token_path.clone())).unwrap();
        oauth.exchange_code("XYZ").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&token_path).unwrap(),
            r#"{"access_token":"new","expires_in":60}"#
        );
    }

    #[tokio::test]
    async fn test_exchange_requires_client_secret() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&server, dir.path().join("t.json"));
        config.client_secret = None;

        let oauth = LinkedInOAuth::new(config).unwrap();
        let err = oauth.exchange_code("XYZ").await.unwrap_err();
        assert!(matches!(err, OAuthError::MissingConfig("CLIENT_SECRET")));
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn test_non_json_success_is_not_saved() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");

        server.mock(|when, then| {
            when.method(POST).path("/oauth/v2/accessToken");
            then.status(200).body("<html>maintenance</html>");
        });

        let oauth = LinkedInOAuth::new(test_config(&server, token_path.clone())).unwrap();
        let err = oauth.exchange_code("XYZ").await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidTokenResponse(_)));
        assert!(!token_path.exists());
    }
}
