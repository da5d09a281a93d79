//! ============================================================================
//! PUBLISHER-CORE: LinkedIn OAuth + Publishing
//! ============================================================================
//! Backend logic shared by the two binaries:
//! - OAuth 2.0 Authorization Code flow and token persistence
//! - Local helper server for the browser redirect
//! - Author URN discovery and UGC text posts
//! ============================================================================

pub mod auth;
pub mod config;
pub mod executor;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use types::*;
pub use auth::{CallbackParams, LinkedInOAuth, OAuthSession};
pub use config::{OAuthConfig, ConfigSource};
pub use executor::LinkedInExecutor;
