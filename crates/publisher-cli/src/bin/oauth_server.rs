// ============================================================================
// oauth-server — local helper for the LinkedIn Authorization Code flow
// ============================================================================
// 1. Set CLIENT_ID, CLIENT_SECRET (and optionally REDIRECT_URI, SCOPES) in .env
// 2. Run: oauth-server
// 3. Open http://localhost:8000/ and click "Authorize with LinkedIn"
// 4. LinkedIn redirects to /callback; the token is exchanged and saved to
//    token.json (or $TOKEN_PATH)
// ============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use publisher_core::server;
use publisher_core::{LinkedInOAuth, OAuthConfig, OAuthSession};
use tracing::{info, warn};

/// Local OAuth helper server for LinkedIn
#[derive(Parser)]
#[command(name = "oauth-server", version, about = "Obtain a LinkedIn access token via the browser")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "OAUTH_BIND", default_value = "0.0.0.0:8000")]
    bind: String,
}

fn main() -> Result<()> {
    publisher_cli::bootstrap();

    let cli = Cli::parse();
    let config = OAuthConfig::from_env();

    if config.client_id.is_none() || config.client_secret.is_none() {
        warn!("CLIENT_ID or CLIENT_SECRET is not set; the index page will show setup instructions");
    }
    info!("Redirect URI: {}", config.redirect_uri);
    info!("Token file: {}", config.token_path.display());

    let oauth = LinkedInOAuth::new(config).context("Failed to build HTTP client")?;
    let session = OAuthSession::new();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    server::serve(&cli.bind, &oauth, &session, runtime.handle())
}
