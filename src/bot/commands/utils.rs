//! Shared helpers for command implementations: guild config lookup, admin
//! gating, and posting approval embeds.

use crate::bot::Context;
use crate::bot::handlers::reactions::{APPROVE_EMOJI, DENY_EMOJI};
use crate::core::currency::{self, CurrencySymbols};
use crate::core::guild;
use crate::core::request::{self, RequestKind};
use crate::entities::guild_config::Model as GuildConfigModel;
use crate::entities::request::Model as RequestModel;
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use tracing::warn;

const REQUEST_EMBED_COLOUR: u32 = 0x00F1_C40F;

/// Resolves display symbols for the current guild.
pub fn symbols(ctx: &Context<'_>, config: Option<&GuildConfigModel>) -> CurrencySymbols {
    CurrencySymbols::resolve(config, &ctx.data().config.currency)
}

/// The invoking member's role ids as strings.
pub async fn author_roles(ctx: &Context<'_>) -> Vec<String> {
    match ctx.author_member().await {
        Some(member) => member.roles.iter().map(|r| r.to_string()).collect(),
        None => Vec::new(),
    }
}

/// Fetches the guild config, telling the user to run `/setup` when absent.
pub async fn require_setup(
    ctx: &Context<'_>,
    guild_id: &str,
) -> Result<Option<GuildConfigModel>> {
    let config = guild::get_config(&ctx.data().database, guild_id).await?;
    if config.is_none() {
        ctx.say("⚠️ This server isn't configured yet. An admin needs to run `/setup` first.")
            .await?;
    }
    Ok(config)
}

/// Errors with [`Error::Unauthorized`] unless the invoking member holds the
/// guild's admin role. Direct admin commands surface the violation
/// explicitly; reaction approvals stay silent instead.
pub async fn ensure_admin(ctx: &Context<'_>, config: &GuildConfigModel) -> Result<()> {
    let roles = author_roles(ctx).await;
    if guild::is_authorized(config, &roles) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// Posts the approval embed for a request, seeds the ✅/❌ reactions, and
/// records the message handle on the request row so reaction events can be
/// mapped back without parsing display text.
///
/// Returns `false` when the embed could not be posted (for example when the
/// bot cannot send in the configured request channel); the request stays
/// queued without a handle and `/pending` re-posts it later.
pub async fn post_request_embed(
    ctx: &Context<'_>,
    req: &RequestModel,
    symbols: &CurrencySymbols,
    config: Option<&GuildConfigModel>,
) -> Result<bool> {
    let channel_id = config
        .and_then(|c| c.request_channel_id.as_ref())
        .and_then(|raw| raw.parse::<u64>().ok())
        .map_or_else(|| ctx.channel_id(), serenity::ChannelId::new);

    let amount = currency::format_copper(req.amount, symbols);
    let (title, description) = match RequestKind::parse(&req.kind) {
        Some(RequestKind::Transfer) => (
            "Transfer Request",
            format!(
                "<@{}> wants to transfer {amount} to <@{}>\nReason: {}",
                req.requester_id,
                req.counterparty_id.as_deref().unwrap_or("?"),
                req.reason
            ),
        ),
        _ => (
            "Grant Request",
            format!(
                "<@{}> requests {amount} into their {} balance\nReason: {}",
                req.requester_id, req.bucket, req.reason
            ),
        ),
    };

    // The footer is display-only; linkage happens through the stored handle
    let embed = serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(REQUEST_EMBED_COLOUR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Request #{}",
            req.id
        )));

    let message = match channel_id
        .send_message(
            ctx.serenity_context(),
            serenity::CreateMessage::new().embed(embed),
        )
        .await
    {
        Ok(message) => message,
        Err(e) => {
            warn!(request_id = req.id, %channel_id, "could not post approval embed: {e}");
            return Ok(false);
        }
    };
    for emoji in [APPROVE_EMOJI, DENY_EMOJI] {
        // Admins can still react by hand if seeding fails
        if let Err(e) = message
            .react(
                ctx.serenity_context(),
                serenity::ReactionType::Unicode(emoji.to_string()),
            )
            .await
        {
            warn!(request_id = req.id, "could not seed approval reaction: {e}");
        }
    }

    request::attach_message(
        &ctx.data().database,
        req.id,
        &channel_id.to_string(),
        &message.id.to_string(),
    )
    .await?;
    Ok(true)
}
