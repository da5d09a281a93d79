//! ============================================================================
//! Core Types for the LinkedIn Publisher
//! ============================================================================
//! Token record, UGC post payload, API outcomes, and the error enums for the
//! authorization and publishing components.
//! ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Token Record
// ============================================================================

/// Token endpoint response, kept exactly as the provider sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    /// Raw response body, written verbatim to the token file
    pub raw: String,
    /// Parsed form of `raw`
    pub json: serde_json::Value,
}

impl TokenRecord {
    /// Parse a token endpoint body. Non-JSON bodies are rejected.
    pub fn from_body(raw: String) -> Result<Self, serde_json::Error> {
        let json = serde_json::from_str(&raw)?;
        Ok(Self { raw, json })
    }

    pub fn access_token(&self) -> Option<&str> {
        self.json.get("access_token").and_then(|v| v.as_str())
    }

    pub fn expires_in(&self) -> Option<i64> {
        self.json.get("expires_in").and_then(|v| v.as_i64())
    }
}

// ============================================================================
// UGC Post Payload
// ============================================================================

/// Member network visibility of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "connections" => Ok(Visibility::Connections),
            _ => Err(format!(
                "Unknown visibility '{}'. Valid values: public, connections",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaCategory {
    None,
}

/// Text-only post for `POST /ugcPosts`.
/// Example:
/// -> { author: "urn:li:person:789", lifecycleState: "PUBLISHED", ... }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPost {
    pub author: String,
    pub lifecycle_state: LifecycleState,
    pub specific_content: SpecificContent,
    pub visibility: VisibilitySetting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    pub share_content: ShareContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContent {
    pub share_commentary: ShareCommentary,
    pub share_media_category: MediaCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareCommentary {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySetting {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    pub member_network: Visibility,
}

impl UgcPost {
    /// Build a published, text-only post
    pub fn text(author: impl Into<String>, text: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            author: author.into(),
            lifecycle_state: LifecycleState::Published,
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: ShareCommentary { text: text.into() },
                    share_media_category: MediaCategory::None,
                },
            },
            visibility: VisibilitySetting {
                member_network: visibility,
            },
        }
    }
}

// ============================================================================
// API Outcomes
// ============================================================================

/// Response body passed back to the caller untouched
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// JSON when it parses, text otherwise
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    /// Pretty form for terminal display
    pub fn pretty(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => serde_json::Value::String(text.clone()).to_string(),
        }
    }
}

/// Result of submitting a post, whatever the status
#[derive(Debug, Clone, PartialEq)]
pub struct PostOutcome {
    pub status: u16,
    pub body: ResponseBody,
}

impl PostOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Everything a publish run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    pub author: String,
    /// True when the author came from a /me lookup
    pub author_looked_up: bool,
    pub outcome: PostOutcome,
}

// ============================================================================
// Error Types
// ============================================================================

/// Terminal states of an authorization attempt other than TOKEN_STORED
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Error returned: {error} - {description}")]
    Provider { error: String, description: String },

    #[error("Invalid state. CSRF check failed.")]
    StateMismatch,

    #[error("Missing authorization code.")]
    MissingCode,

    #[error("Set {0} in your .env first")]
    MissingConfig(&'static str),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to get token: {status} {body}")]
    ExchangeFailed { status: u16, body: String },

    #[error("Token endpoint returned invalid JSON: {0}")]
    InvalidTokenResponse(#[from] serde_json::Error),

    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to save token to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl OAuthError {
    /// HTTP status the callback endpoint answers with
    pub fn http_status(&self) -> u16 {
        match self {
            OAuthError::Provider { .. } => 200,
            OAuthError::StateMismatch
            | OAuthError::MissingCode
            | OAuthError::ExchangeFailed { .. } => 400,
            OAuthError::InvalidTokenResponse(_) | OAuthError::Transport(_) => 502,
            OAuthError::MissingConfig(_)
            | OAuthError::InvalidUrl(_)
            | OAuthError::Persist { .. } => 500,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(
        "No access token provided. Set ACCESS_TOKEN env var or pass --token. Use oauth-server to obtain one."
    )]
    MissingAccessToken,

    #[error("Failed to fetch /me: {status} {body}")]
    ProfileLookupFailed { status: u16, body: String },

    #[error("Could not find 'id' in /me response: {0}")]
    MissingProfileId(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_post_wire_shape() {
        let post = UgcPost::text("urn:li:person:789", "hello", Visibility::default());
        let value = serde_json::to_value(&post).unwrap();

        assert_eq!(
            value,
            json!({
                "author": "urn:li:person:789",
                "lifecycleState": "PUBLISHED",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": { "text": "hello" },
                        "shareMediaCategory": "NONE"
                    }
                },
                "visibility": {
                    "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
                }
            })
        );
    }

    #[test]
    fn test_connections_visibility() {
        let post = UgcPost::text("urn:li:person:1", "hi", Visibility::Connections);
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(
            value["visibility"]["com.linkedin.ugc.MemberNetworkVisibility"],
            "CONNECTIONS"
        );
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("connections".parse::<Visibility>(), Ok(Visibility::Connections));
        assert!("friends".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_token_record_keeps_raw_body() {
        let raw = "{\n  \"access_token\": \"AQX\",\n  \"expires_in\": 5184000\n}".to_string();
        let record = TokenRecord::from_body(raw.clone()).unwrap();
        assert_eq!(record.raw, raw);
        assert_eq!(record.access_token(), Some("AQX"));
        assert_eq!(record.expires_in(), Some(5184000));
        assert!(TokenRecord::from_body("not json".into()).is_err());
    }

    #[test]
    fn test_response_body_from_text() {
        assert_eq!(
            ResponseBody::from_text(r#"{"id":"urn:li:share:1"}"#.into()),
            ResponseBody::Json(json!({"id": "urn:li:share:1"}))
        );
        assert_eq!(
            ResponseBody::from_text("Bad Gateway".into()),
            ResponseBody::Text("Bad Gateway".into())
        );
        assert_eq!(ResponseBody::Text("oops".into()).pretty(), "\"oops\"");
    }

    #[test]
    fn test_oauth_error_statuses() {
        assert_eq!(OAuthError::StateMismatch.http_status(), 400);
        assert_eq!(
            OAuthError::StateMismatch.to_string(),
            "Invalid state. CSRF check failed."
        );
        let err = OAuthError::ExchangeFailed {
            status: 401,
            body: "denied".into(),
        };
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.to_string(), "Failed to get token: 401 denied");
    }
}
