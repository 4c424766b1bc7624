use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use super::DatabaseConfig;

/// Connect the MySQL pool and apply pending migrations.
pub async fn establish_connection(config: &DatabaseConfig) -> anyhow::Result<MySqlPool> {
    use anyhow::Context;

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("Failed to connect to the database")?;
    tracing::info!("Successfully connected to the database");

    // Run migrations automatically on startup
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied successfully");

    Ok(pool)
}
