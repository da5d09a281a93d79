//! Shared startup for the publisher binaries.

/// Load `.env` and initialize logging
pub fn bootstrap() {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["publisher_core=info", "publisher_cli=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
