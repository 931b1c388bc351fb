//! Relay hub entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-hub
//! ```
//!
//! Configuration is loaded from environment variables. The backend channel
//! is the process's own stdin/stdout, so the hub is meant to be launched by
//! the backend peer as a subprocess.

use relay_common::{try_init_tracing, RelayConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the hub
    if let Err(e) = run().await {
        error!(error = %e, "Hub failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting relay hub...");

    // Load configuration
    let config = RelayConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        host = %config.hub.host,
        port = config.hub.port,
        addressing = ?config.hub.addressing,
        "Configuration loaded"
    );

    relay_hub::server::run(config).await?;

    Ok(())
}
