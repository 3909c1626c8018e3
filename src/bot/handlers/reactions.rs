//! Reaction-based approval handling.
//!
//! Maps a platform-native reaction event onto a structured approval signal:
//! the request is looked up by the stored `(channel, message)` handle of its
//! approval embed, never by parsing embed text. Everything that can go wrong
//! with a reaction (wrong emoji, bot echo, unrelated message, unauthorized
//! actor, stale request) ends in a silent no-op; only real infrastructure
//! failures bubble up to the caller, which logs them.

use crate::bot::BotData;
use crate::core::approval::{self, Signal, SignalOutcome};
use crate::core::currency::{self, CurrencySymbols};
use crate::core::guild;
use crate::core::request::{self, RequestKind};
use crate::errors::Result;
use poise::serenity_prelude as serenity;
use tracing::debug;

/// Emoji that signals approval on a request embed.
pub const APPROVE_EMOJI: &str = "✅";
/// Emoji that signals denial on a request embed.
pub const DENY_EMOJI: &str = "❌";

/// Maps a reaction emoji onto an approval signal, `None` for anything else.
pub fn signal_from_emoji(emoji: &serenity::ReactionType) -> Option<Signal> {
    match emoji {
        serenity::ReactionType::Unicode(s) if s == APPROVE_EMOJI => Some(Signal::Approve),
        serenity::ReactionType::Unicode(s) if s == DENY_EMOJI => Some(Signal::Deny),
        _ => None,
    }
}

/// Handles one `ReactionAdd` event.
pub async fn handle_reaction_add(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
    data: &BotData,
) -> Result<()> {
    let Some(guild_id) = reaction.guild_id else {
        return Ok(());
    };
    let Some(user_id) = reaction.user_id else {
        return Ok(());
    };
    // The bot seeds both reaction emoji on every embed; ignore its own echo
    if user_id == ctx.cache.current_user().id {
        return Ok(());
    }
    let Some(signal) = signal_from_emoji(&reaction.emoji) else {
        return Ok(());
    };

    let db = &data.database;
    let Some(req) = request::find_by_message(
        db,
        &reaction.channel_id.to_string(),
        &reaction.message_id.to_string(),
    )
    .await?
    else {
        // Not one of our approval embeds
        return Ok(());
    };

    let member = match guild_id.member(ctx, user_id).await {
        Ok(member) => member,
        Err(e) => {
            debug!(%user_id, "could not fetch reacting member: {e}");
            return Ok(());
        }
    };
    let actor_roles: Vec<String> = member.roles.iter().map(|r| r.to_string()).collect();
    let actor_id = user_id.to_string();

    let outcome = approval::handle_signal(db, req.id, &actor_id, &actor_roles, signal).await?;

    let SignalOutcome::Ignored(reason) = &outcome else {
        let config = guild::get_config(db, &req.guild_id).await?;
        let symbols = CurrencySymbols::resolve(config.as_ref(), &data.config.currency);
        reaction
            .channel_id
            .say(ctx, render_outcome(&outcome, &symbols))
            .await?;
        return Ok(());
    };
    debug!(request_id = req.id, ?reason, "approval signal ignored");
    Ok(())
}

/// Outcome confirmation wording, distinct per outcome so a failed approval
/// never reads like a generic error.
fn render_outcome(outcome: &SignalOutcome, symbols: &CurrencySymbols) -> String {
    match outcome {
        SignalOutcome::Approved { request } => {
            let amount = currency::format_copper(request.amount, symbols);
            match RequestKind::parse(&request.kind) {
                Some(RequestKind::Transfer) => format!(
                    "✅ Transfer approved: {amount} from <@{}> to <@{}>.",
                    request.requester_id,
                    request.counterparty_id.as_deref().unwrap_or("?"),
                ),
                _ => format!(
                    "✅ Request approved: {amount} granted to <@{}>.",
                    request.requester_id
                ),
            }
        }
        SignalOutcome::Denied { request } => {
            format!("❌ Request #{} denied.", request.id)
        }
        SignalOutcome::InsufficientFunds { request, available } => format!(
            "⚠️ Transfer not completed: <@{}> has {}, but {} is required. The request is closed.",
            request.requester_id,
            currency::format_copper(*available, symbols),
            currency::format_copper(request.amount, symbols),
        ),
        SignalOutcome::Ignored(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CurrencyConfig;
    use crate::core::request::RequestStatus;
    use crate::entities::request::Model as RequestModel;

    fn plain_symbols() -> CurrencySymbols {
        CurrencySymbols::from(&CurrencyConfig::default())
    }

    fn transfer_model() -> RequestModel {
        RequestModel {
            id: 7,
            guild_id: "g1".to_string(),
            kind: RequestKind::Transfer.as_str().to_string(),
            requester_id: "alice".to_string(),
            counterparty_id: Some("bob".to_string()),
            amount: 15_000,
            reason: "repairs".to_string(),
            bucket: "banked".to_string(),
            status: RequestStatus::Approved.as_str().to_string(),
            channel_id: None,
            message_id: None,
            created_at: chrono::Utc::now(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    #[test]
    fn test_signal_from_emoji() {
        assert_eq!(
            signal_from_emoji(&serenity::ReactionType::Unicode(APPROVE_EMOJI.to_string())),
            Some(Signal::Approve)
        );
        assert_eq!(
            signal_from_emoji(&serenity::ReactionType::Unicode(DENY_EMOJI.to_string())),
            Some(Signal::Deny)
        );
        assert_eq!(
            signal_from_emoji(&serenity::ReactionType::Unicode("👍".to_string())),
            None
        );
    }

    #[test]
    fn test_outcome_wording_is_distinct() {
        let request = transfer_model();
        let approved = render_outcome(
            &SignalOutcome::Approved {
                request: request.clone(),
            },
            &plain_symbols(),
        );
        assert!(approved.contains("Transfer approved"));
        assert!(approved.contains("1g50s00c"));

        let failed = render_outcome(
            &SignalOutcome::InsufficientFunds {
                request,
                available: 100,
            },
            &plain_symbols(),
        );
        assert!(failed.contains("not completed"));
        assert!(failed.contains("0g01s00c"));
        assert_ne!(approved, failed);
    }
}
