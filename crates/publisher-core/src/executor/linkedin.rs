//! ============================================================================
//! LinkedIn Executor - Text Posting via the UGC API
//! ============================================================================
//! Handles posting to LinkedIn with an OAuth 2.0 Bearer token:
//! - Discover the author URN via GET /me
//! - Publish a text-only post via POST /ugcPosts
//! ============================================================================

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{access_token_sources, resolve_first, LINKEDIN_API_BASE};
use crate::types::{PostOutcome, PublishError, PublishReport, ResponseBody, UgcPost, Visibility};

/// Rest.li protocol version LinkedIn requires on v2 calls
pub const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

const RESTLI_HEADER: &str = "X-Restli-Protocol-Version";

/// Resolve the access token from the explicit value or the environment
pub fn resolve_access_token<F>(explicit: Option<String>, env: &F) -> Result<String, PublishError>
where
    F: Fn(&str) -> Option<String>,
{
    let (token, source) =
        resolve_first(&access_token_sources(explicit), env).ok_or(PublishError::MissingAccessToken)?;
    debug!("Using access token from {}", source.describe());
    Ok(token)
}

/// Executor for LinkedIn posting operations
pub struct LinkedInExecutor {
    client: reqwest::Client,
    access_token: String,
    api_base: String,
}

impl LinkedInExecutor {
    /// Create a new LinkedInExecutor with an OAuth 2.0 access token
    pub fn new(access_token: String, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token,
            api_base: LINKEDIN_API_BASE.to_string(),
        })
    }

    /// Point the executor at a different API base (no trailing slash)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Look up the authenticated member and return `urn:li:person:{id}`
    pub async fn fetch_author_urn(&self) -> Result<String, PublishError> {
        let url = format!("{}/me", self.api_base);
        debug!("Fetching member profile from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header(RESTLI_HEADER, RESTLI_PROTOCOL_VERSION)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() != 200 {
            warn!("Profile lookup failed: {} - {}", status, body);
            return Err(PublishError::ProfileLookupFailed {
                status: status.as_u16(),
                body,
            });
        }

        let profile: MeResponse = serde_json::from_str(&body)
            .map_err(|_| PublishError::MissingProfileId(body.clone()))?;

        let person_id = match profile.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => return Err(PublishError::MissingProfileId(body)),
        };

        Ok(format!("urn:li:person:{}", person_id))
    }

    /// Publish a text-only post. Any HTTP status is returned to the caller.
    pub async fn post_text(
        &self,
        author: &str,
        text: &str,
        visibility: Visibility,
    ) -> Result<PostOutcome, PublishError> {
        info!(
            "Posting to LinkedIn as {}: {}...",
            author,
            text.chars().take(50).collect::<String>()
        );

        let post = UgcPost::text(author, text, visibility);

        let response = self
            .client
            .post(format!("{}/ugcPosts", self.api_base))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .header(RESTLI_HEADER, RESTLI_PROTOCOL_VERSION)
            .json(&post)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = ResponseBody::from_text(response.text().await?);

        if (200..300).contains(&status) {
            info!("LinkedIn post accepted ({})", status);
        } else {
            warn!("LinkedIn API returned {}", status);
        }

        Ok(PostOutcome { status, body })
    }

    /// Resolve the author when needed, then post
    pub async fn publish(
        &self,
        author: Option<String>,
        text: &str,
        visibility: Visibility,
    ) -> Result<PublishReport, PublishError> {
        let (author, author_looked_up) = match author.filter(|a| !a.trim().is_empty()) {
            Some(author) => (author, false),
            None => {
                info!("Author URN not provided, fetching via /me");
                (self.fetch_author_urn().await?, true)
            }
        };

        let outcome = self.post_text(&author, text, visibility).await?;

        Ok(PublishReport {
            author,
            author_looked_up,
            outcome,
        })
    }
}

// ============================================================================
// LinkedIn API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: Option<serde_json::Value>,
}
