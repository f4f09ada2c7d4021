/**
 * Taskboard Server Entry Point
 *
 * Loads `.env`, reads `AppConfig`, installs tracing and serves the API.
 */

use taskboard::backend::server::create_app;
use taskboard::shared::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let config = AppConfig::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("[Server] Starting taskboard");
    if config.uses_dev_secret() {
        tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
    }

    let app = create_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("[Server] Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
