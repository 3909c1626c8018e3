//! Admin Discord commands - `setup`, `backup`, and `restore`.
//!
//! `/setup` is gated on Discord's own Manage Guild permission since it is
//! what establishes the admin role everything else checks. Backup and
//! restore move whole-guild account snapshots as JSON attachments; restore
//! also accepts the legacy flat balance map and migrates it on ingest.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::bot::Context;
    use crate::bot::commands::utils;
    use crate::core::guild::{self, ConfigUpdate};
    use crate::core::snapshot;
    use crate::errors::{Error, Result};
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Configures this server: admin role, request channel, currency symbols.
    #[poise::command(
        slash_command,
        guild_only,
        required_permissions = "MANAGE_GUILD",
        default_member_permissions = "MANAGE_GUILD"
    )]
    pub async fn setup(
        ctx: Context<'_>,
        #[description = "Role allowed to approve requests and run admin commands"]
        admin_role: serenity::Role,
        #[description = "Channel for approval embeds (defaults to wherever the command ran)"]
        request_channel: Option<serenity::GuildChannel>,
        #[description = "Gold symbol override, e.g. a guild emoji"] gold_symbol: Option<String>,
        #[description = "Silver symbol override"] silver_symbol: Option<String>,
        #[description = "Copper symbol override"] copper_symbol: Option<String>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let config = guild::upsert_config(
            &ctx.data().database,
            ConfigUpdate {
                guild_id: guild_id.to_string(),
                admin_role_id: admin_role.id.to_string(),
                request_channel_id: request_channel.as_ref().map(|c| c.id.to_string()),
                gold_symbol,
                silver_symbol,
                copper_symbol,
            },
        )
        .await?;

        info!(guild_id = %config.guild_id, "guild configured");
        let channel_note = config
            .request_channel_id
            .as_ref()
            .map_or_else(String::new, |c| format!(" Requests go to <#{c}>."));
        ctx.say(format!(
            "✅ Configured. Members with <@&{}> can approve requests.{channel_note}",
            config.admin_role_id
        ))
        .await?;
        Ok(())
    }

    /// Exports all account balances as a JSON snapshot attachment. Admin only.
    #[poise::command(slash_command, guild_only)]
    pub async fn backup(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let Some(config) = utils::require_setup(&ctx, &guild_id).await? else {
            return Ok(());
        };
        utils::ensure_admin(&ctx, &config).await?;

        let snap = snapshot::export_guild(&ctx.data().database, &guild_id).await?;
        let json = snapshot::to_json(&snap)?;
        let attachment =
            serenity::CreateAttachment::bytes(json.into_bytes(), "coffer-backup.json");

        ctx.send(
            poise::CreateReply::default()
                .content(format!("Snapshot of {} account(s).", snap.accounts.len()))
                .attachment(attachment)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Replaces all account balances from a snapshot attachment. Admin only.
    #[poise::command(slash_command, guild_only)]
    pub async fn restore(
        ctx: Context<'_>,
        #[description = "A backup JSON file (current or legacy format)"]
        file: serenity::Attachment,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let Some(config) = utils::require_setup(&ctx, &guild_id).await? else {
            return Ok(());
        };
        utils::ensure_admin(&ctx, &config).await?;

        let bytes = file.download().await.map_err(Error::from)?;
        let snap = match snapshot::parse(&bytes) {
            Ok(snap) => snap,
            Err(Error::Config { message }) => {
                ctx.say(format!("❌ Could not read that snapshot: {message}"))
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let restored = snapshot::restore_guild(&ctx.data().database, &guild_id, &snap).await?;
        info!(%guild_id, restored, "accounts restored from snapshot");
        ctx.say(format!("✅ Restored {restored} account(s) from the snapshot."))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::{backup, restore, setup};
