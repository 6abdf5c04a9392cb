//! WebSocket Chat Relay - Entry Point
//!
//! Loads configuration, starts the TCP listener and the ChatServer actor.

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use chat_relay::{serve, Config, ErrorPolicy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = Config::from_env();
    if config.error_policy == ErrorPolicy::Silent {
        tracing::info!("Rejected events will be dropped without reply");
    }

    let listener = TcpListener::bind(&config.addr).await?;
    serve(listener, config).await?;

    Ok(())
}
