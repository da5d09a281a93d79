// ============================================================================
// post-linkedin — publish a text post to LinkedIn from the command line
// ============================================================================
// Usage:
//   post-linkedin --message "Hello from the API"
//   post-linkedin -m "Hi" --author urn:li:person:abc --token AQV...
//
// Token:  --token, else $ACCESS_TOKEN, else $LINKEDIN_ACCESS_TOKEN
// Author: --author, else $AUTHOR_URN, else $LINKEDIN_AUTHOR_URN, else GET /me
// ============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use publisher_core::config::{author_urn_sources, http_timeout, process_env, resolve_first};
use publisher_core::executor::resolve_access_token;
use publisher_core::{LinkedInExecutor, Visibility};
use tracing::debug;

/// Post a text update to LinkedIn using an OAuth access token
#[derive(Parser)]
#[command(name = "post-linkedin", version, about = "Publish a text post via the LinkedIn UGC API")]
struct Cli {
    /// Message text to post
    #[arg(short, long)]
    message: String,

    /// Author URN (urn:li:person:...) - looked up via /me when omitted
    #[arg(long)]
    author: Option<String>,

    /// Access token (env var preferred)
    #[arg(long)]
    token: Option<String>,

    /// Network visibility: public or connections
    #[arg(long, default_value = "public")]
    visibility: Visibility,
}

#[tokio::main]
async fn main() -> Result<()> {
    publisher_cli::bootstrap();

    let cli = Cli::parse();

    let access_token = resolve_access_token(cli.token, &process_env)?;
    let executor = LinkedInExecutor::new(access_token, http_timeout(&process_env))
        .context("Failed to build HTTP client")?;

    let author = resolve_first(&author_urn_sources(cli.author), &process_env).map(|(author, source)| {
        debug!("Using author URN from {}", source.describe());
        author
    });
    if author.is_none() {
        println!("Author URN not provided - fetching via /me ...");
    }

    let report = executor
        .publish(author, &cli.message, cli.visibility)
        .await?;

    if report.author_looked_up {
        println!("Detected author urn: {}", report.author);
    }

    println!("Status: {}", report.outcome.status);
    println!("Response: {}", report.outcome.body.pretty());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_required() {
        assert!(Cli::try_parse_from(["post-linkedin"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["post-linkedin", "-m", "hello"]).unwrap();
        assert_eq!(cli.message, "hello");
        assert!(cli.author.is_none());
        assert!(cli.token.is_none());
        assert_eq!(cli.visibility, Visibility::Public);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "post-linkedin",
            "--message",
            "hi",
            "--author",
            "urn:li:person:789",
            "--token",
            "AQV",
            "--visibility",
            "connections",
        ])
        .unwrap();
        assert_eq!(cli.author.as_deref(), Some("urn:li:person:789"));
        assert_eq!(cli.token.as_deref(), Some("AQV"));
        assert_eq!(cli.visibility, Visibility::Connections);
    }
}
