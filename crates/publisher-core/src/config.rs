//! ============================================================================
//! Configuration - Environment-sourced settings for both components
//! ============================================================================
//! Values come from the process environment (optionally seeded from `.env`
//! by the binaries). Every lookup goes through an injectable closure so the
//! resolution order can be exercised without touching the real environment.
//! ============================================================================

use std::path::PathBuf;
use std::time::Duration;

/// LinkedIn OAuth 2.0 authorization endpoint
pub const LINKEDIN_AUTH_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";

/// LinkedIn OAuth 2.0 token endpoint
pub const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";

/// LinkedIn REST API v2 base URL
pub const LINKEDIN_API_BASE: &str = "https://api.linkedin.com/v2";

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/callback";

/// Default scopes: posting, basic profile (for /me), email
pub const DEFAULT_SCOPES: &str = "w_member_social r_liteprofile r_emailaddress";

pub const DEFAULT_TOKEN_PATH: &str = "token.json";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// A named place a configuration value may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value passed on the command line
    Argument(Option<String>),
    /// Environment variable by name
    Env(&'static str),
}

impl ConfigSource {
    /// Look the value up. Empty strings count as absent.
    pub fn lookup<F>(&self, env: &F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = match self {
            ConfigSource::Argument(value) => value.clone(),
            ConfigSource::Env(name) => env(name),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Argument(_) => "command-line argument".to_string(),
            ConfigSource::Env(name) => format!("${}", name),
        }
    }
}

/// Consult `sources` in priority order and return the first present value
/// together with the source that supplied it.
pub fn resolve_first<F>(sources: &[ConfigSource], env: &F) -> Option<(String, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    sources
        .iter()
        .find_map(|source| source.lookup(env).map(|value| (value, source.clone())))
}

/// Access token sources, highest priority first
pub fn access_token_sources(explicit: Option<String>) -> Vec<ConfigSource> {
    vec![
        ConfigSource::Argument(explicit),
        ConfigSource::Env("ACCESS_TOKEN"),
        ConfigSource::Env("LINKEDIN_ACCESS_TOKEN"),
    ]
}

/// Author URN sources, highest priority first
pub fn author_urn_sources(explicit: Option<String>) -> Vec<ConfigSource> {
    vec![
        ConfigSource::Argument(explicit),
        ConfigSource::Env("AUTHOR_URN"),
        ConfigSource::Env("LINKEDIN_AUTHOR_URN"),
    ]
}

/// Read a process environment variable
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Outbound request timeout from `HTTP_TIMEOUT_SECS`
pub fn http_timeout<F>(env: &F) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let secs = env("HTTP_TIMEOUT_SECS")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Single-tenant OAuth client configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scopes: String,
    pub auth_url: String,
    pub token_url: String,
    /// Where the token record is written after a successful exchange
    pub token_path: PathBuf,
    pub http_timeout: Duration,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    /// Build from an arbitrary lookup. Missing values never fail here;
    /// the operations that need them report it instead.
    pub fn from_lookup<F>(env: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        Self {
            client_id: non_empty("CLIENT_ID"),
            client_secret: non_empty("CLIENT_SECRET"),
            redirect_uri: non_empty("REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            scopes: non_empty("SCOPES").unwrap_or_else(|| DEFAULT_SCOPES.to_string()),
            auth_url: LINKEDIN_AUTH_URL.to_string(),
            token_url: LINKEDIN_TOKEN_URL.to_string(),
            token_path: non_empty("TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            http_timeout: http_timeout(env),
        }
    }
}
