use guild_coffer::errors::{Error, Result};
use guild_coffer::{bot, config};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenvy::dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::settings::load_default_config()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    let app_config = Arc::new(app_config);

    // 4. Initialize database and ensure tables exist
    let db = config::database::create_connection(&app_config)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ensured."))
        .inspect_err(|e| error!("Failed to create database tables: {e}"))?;

    // 5. Run the bot; the token is read directly before use, not stored
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, Arc::clone(&app_config), db).await?;
    Ok(())
}
