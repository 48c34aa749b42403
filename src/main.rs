use anyhow::Result;
use tracing::info;

use contact_gateway::config::Config;
use contact_gateway::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_gateway=info".parse()?),
        )
        .init();

    info!("Starting contact gateway");

    // Load configuration from environment
    let config = Config::from_env();

    if config.contact_to_email.is_none() {
        // Startup still succeeds; submissions will fail with a stable
        // code until the operator sets the recipient.
        tracing::warn!("CONTACT_TO_EMAIL is not set; submissions cannot be delivered");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let app = server::router(AppState::new(config));

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
