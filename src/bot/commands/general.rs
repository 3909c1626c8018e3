//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database
//! operations and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::bot::BotData;
    use crate::errors::{Error, Result};

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**GuildCoffer Help**\n\
        Amounts are written in copper (`15000`) or denominated form (`1g50s`).\n\n\
        **Member Commands**\n\
        • `/balance [user]` - Shows banked and debt balances.\n\
        • `/request <amount> <reason> [bucket]` - Asks the admins for a currency grant.\n\
        • `/transfer <user> <amount> <reason>` - Asks the admins to approve a transfer.\n\
        • `/history [user]` - Shows recent ledger activity.\n\n\
        **Admin Commands**\n\
        • `/give <user> <amount> <reason>` - Grants currency directly.\n\
        • `/take <user> <amount> <reason>` - Deducts currency (stops at zero).\n\
        • `/pending` - Re-posts approval embeds for all pending requests.\n\
        • `/setup <admin_role> [request_channel] [symbols]` - Configures this server.\n\
        • `/backup` - Exports all balances as a JSON snapshot.\n\
        • `/restore <file>` - Replaces all balances from a snapshot.\n\n\
        Admins resolve requests by reacting ✅ or ❌ on the request embed.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::{help, ping};
