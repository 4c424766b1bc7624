use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use instructor_marketplace_api::config::{self, AppConfig};
use instructor_marketplace_api::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    dotenv().ok();

    // Initialize tracing for structured logs
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("instructor_marketplace_api=debug,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context(
        "Invalid configuration. Copy `.env.example` to `.env` and fill in DATABASE_URL and JWT_SECRET",
    )?;
    let addr = config.server_addr();

    // Establish database connection (and run migrations)
    let pool = config::database::establish_connection(&config.database).await?;
    let app = create_app(AppState::with_mysql(config, pool));

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("Failed to serve application")?;

    Ok(())
}
