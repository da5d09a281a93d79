//! ============================================================================
//! Auth Module - OAuth and Authentication Flows
//! ============================================================================
//! Handles authentication against LinkedIn:
//! - OAuth 2.0 Authorization Code flow with a confidential client
//! ============================================================================

mod linkedin_oauth;

pub use linkedin_oauth::{save_token, CallbackParams, LinkedInOAuth, OAuthSession};
