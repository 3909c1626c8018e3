//! Bot layer - Discord-specific interface, command handlers, and the
//! framework runner.
//!
//! This module owns everything that touches Discord types: slash commands,
//! the reaction event handler that feeds the approval state machine, and the
//! poise framework setup. Core business logic stays framework-agnostic under
//! [`crate::core`].

/// Discord command implementations (ledger, request, admin, general)
pub mod commands;
/// Discord event handlers (reaction-based approvals)
pub mod handlers;

use crate::config::AppConfig;
use crate::errors::Error;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info};

/// Shared data available to all bot commands and event handlers.
pub struct BotData {
    /// Database connection for all persistence operations
    pub database: DatabaseConnection,
    /// Process-wide application configuration
    pub config: Arc<AppConfig>,
}

/// Type alias for the poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let reply = match &error {
                Error::InvalidAmount { input } => {
                    format!("❌ Invalid amount: {input:?}. Use copper (`15000`) or denominated form (`1g50s`).")
                }
                Error::Unauthorized => "❌ You don't have permission to use this command.".to_string(),
                _ => "An error occurred while running the command.".to_string(),
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until shutdown.
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> crate::errors::Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ledger::balance(),
                commands::ledger::give(),
                commands::ledger::take(),
                commands::ledger::history(),
                commands::request::request(),
                commands::request::transfer(),
                commands::request::pending(),
                commands::admin::setup(),
                commands::admin::backup(),
                commands::admin::restore(),
                commands::general::ping(),
                commands::general::help(),
            ],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::ReactionAdd { add_reaction } = event {
                        // Handler failures are logged, never propagated; a bad
                        // reaction event must not take down the dispatch loop.
                        if let Err(e) =
                            handlers::reactions::handle_reaction_add(ctx, add_reaction, data).await
                        {
                            error!("Reaction handler error: {e}");
                        }
                    }
                    Ok(())
                })
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData { database, config })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .map_err(Error::from)?;

    client.start().await.map_err(Error::from)
}
