//! ============================================================================
//! Executor Module - Publishing Executors
//! ============================================================================
//! - LinkedInExecutor: text posts via the LinkedIn UGC API
//! ============================================================================

mod linkedin;

pub use linkedin::{resolve_access_token, LinkedInExecutor, RESTLI_PROTOCOL_VERSION};
