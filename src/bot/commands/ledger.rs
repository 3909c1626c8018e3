//! Ledger Discord commands - `balance`, `give`, `take`, and `history`.
//!
//! `give` and `take` are the direct admin mutation path: they flow through
//! the same `core::ledger` choke point the approval state machine uses, but
//! are gated on the guild's admin role up front and surface authorization
//! failures explicitly.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::bot::Context;
    use crate::bot::commands::utils;
    use crate::core::currency;
    use crate::core::guild;
    use crate::core::ledger::{self, Bucket};
    use poise::serenity_prelude as serenity;

    use crate::errors::Result;

    /// Shows a member's banked and debt balances.
    #[poise::command(slash_command, guild_only)]
    pub async fn balance(
        ctx: Context<'_>,
        #[description = "Member to look up (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let target = user.as_ref().unwrap_or_else(|| ctx.author());

        let db = &ctx.data().database;
        let config = guild::get_config(db, &guild_id).await?;
        let symbols = utils::symbols(&ctx, config.as_ref());

        let account = ledger::get_account(db, &guild_id, &target.id.to_string()).await?;
        let (banked, debt) = account.map_or((0, 0), |a| (a.banked, a.debt));

        let mut line = format!(
            "<@{}> has {}",
            target.id,
            currency::format_copper(banked, &symbols)
        );
        if debt > 0 {
            line.push_str(&format!(
                " (debt: {})",
                currency::format_copper(debt, &symbols)
            ));
        }
        ctx.say(line).await?;
        Ok(())
    }

    /// Grants currency to a member directly. Admin only.
    #[poise::command(slash_command, guild_only)]
    pub async fn give(
        ctx: Context<'_>,
        #[description = "Member to give currency to"] user: serenity::User,
        #[description = "Amount, e.g. 15000 or 1g50s"] amount: String,
        #[description = "Reason for the grant"] reason: String,
    ) -> Result<()> {
        direct_adjust(ctx, &user, &amount, &reason, Direction::Give).await
    }

    /// Deducts currency from a member directly, stopping at zero. Admin only.
    #[poise::command(slash_command, guild_only)]
    pub async fn take(
        ctx: Context<'_>,
        #[description = "Member to take currency from"] user: serenity::User,
        #[description = "Amount, e.g. 15000 or 1g50s"] amount: String,
        #[description = "Reason for the deduction"] reason: String,
    ) -> Result<()> {
        direct_adjust(ctx, &user, &amount, &reason, Direction::Take).await
    }

    /// Shows a member's recent ledger activity, newest first.
    #[poise::command(slash_command, guild_only)]
    pub async fn history(
        ctx: Context<'_>,
        #[description = "Member to look up (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        const PAGE_SIZE: u64 = 10;

        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let target = user.as_ref().unwrap_or_else(|| ctx.author());

        let db = &ctx.data().database;
        let config = guild::get_config(db, &guild_id).await?;
        let symbols = utils::symbols(&ctx, config.as_ref());

        let entries =
            ledger::recent_entries(db, &guild_id, &target.id.to_string(), PAGE_SIZE).await?;
        if entries.is_empty() {
            ctx.say(format!("<@{}> has no ledger activity yet.", target.id))
                .await?;
            return Ok(());
        }

        let mut lines = vec![format!("**Recent activity for <@{}>**", target.id)];
        for entry in entries {
            lines.push(format!(
                "{} {} [{}] {} — by <@{}>",
                if entry.amount < 0 { "−" } else { "+" },
                currency::format_copper(entry.amount.abs(), &symbols),
                entry.entry_type,
                entry.reason,
                entry.actor_id,
            ));
        }
        ctx.say(lines.join("\n")).await?;
        Ok(())
    }

    enum Direction {
        Give,
        Take,
    }

    async fn direct_adjust(
        ctx: Context<'_>,
        user: &serenity::User,
        amount_input: &str,
        reason: &str,
        direction: Direction,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();

        let Some(config) = utils::require_setup(&ctx, &guild_id).await? else {
            return Ok(());
        };
        utils::ensure_admin(&ctx, &config).await?;

        let amount = currency::parse_amount(amount_input)?;
        let symbols = utils::symbols(&ctx, Some(&config));
        let db = &ctx.data().database;
        let actor_id = ctx.author().id.to_string();
        let user_id = user.id.to_string();

        let reply = match direction {
            Direction::Give => {
                ledger::grant(db, &guild_id, &user_id, Bucket::Banked, amount, reason, &actor_id)
                    .await?;
                format!(
                    "Granted {} to <@{}>.\nReason: {reason}",
                    currency::format_copper(amount, &symbols),
                    user.id
                )
            }
            Direction::Take => {
                ledger::deduct(db, &guild_id, &user_id, Bucket::Banked, amount, reason, &actor_id)
                    .await?;
                format!(
                    "Deducted {} from <@{}>.\nReason: {reason}",
                    currency::format_copper(amount, &symbols),
                    user.id
                )
            }
        };
        ctx.say(reply).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::{balance, give, history, take};
