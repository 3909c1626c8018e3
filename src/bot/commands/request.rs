//! Request Discord commands - `request`, `transfer`, and `pending`.
//!
//! Submissions validate synchronously and then post an approval embed that
//! admins resolve by reacting. The embed's message id is stored on the
//! request row, which is the only linkage the reaction handler uses.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::bot::Context;
    use crate::bot::commands::utils;
    use crate::core::currency;
    use crate::core::ledger::Bucket;
    use crate::core::request::{self, NewRequest, RequestKind};
    use poise::serenity_prelude as serenity;

    use crate::errors::Result;

    /// Balance bucket a grant request can target.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum BucketChoice {
        #[name = "banked"]
        Banked,
        #[name = "debt"]
        Debt,
    }

    impl From<BucketChoice> for Bucket {
        fn from(choice: BucketChoice) -> Self {
            match choice {
                BucketChoice::Banked => Self::Banked,
                BucketChoice::Debt => Self::Debt,
            }
        }
    }

    /// Submission confirmation wording. A failed embed post still leaves the
    /// request queued, so the submitter is pointed at the `/pending` re-post
    /// path instead of getting a generic error.
    pub(crate) fn submission_reply(amount_display: &str, posted: bool) -> String {
        if posted {
            format!("Your request for {amount_display} has been submitted for approval.")
        } else {
            format!(
                "Your request for {amount_display} is queued, but the approval embed \
                 could not be posted. An admin can re-post it with `/pending`."
            )
        }
    }

    /// Submits a currency grant request for admin approval.
    #[poise::command(slash_command, guild_only)]
    pub async fn request(
        ctx: Context<'_>,
        #[description = "Amount, e.g. 15000 or 1g50s"] amount: String,
        #[description = "Reason for the request"] reason: String,
        #[description = "Bucket to credit (defaults to banked)"] bucket: Option<BucketChoice>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let Some(config) = utils::require_setup(&ctx, &guild_id).await? else {
            return Ok(());
        };

        let amount = currency::parse_amount(&amount)?;
        let bucket = bucket.map_or(Bucket::Banked, Into::into);

        let submitted = request::submit(
            &ctx.data().database,
            NewRequest {
                guild_id,
                kind: RequestKind::Grant,
                requester_id: ctx.author().id.to_string(),
                counterparty_id: None,
                amount,
                reason,
                bucket,
            },
        )
        .await?;

        let symbols = utils::symbols(&ctx, Some(&config));
        let posted = utils::post_request_embed(&ctx, &submitted, &symbols, Some(&config)).await?;

        ctx.send(
            poise::CreateReply::default()
                .content(submission_reply(
                    &currency::format_copper(amount, &symbols),
                    posted,
                ))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Submits a transfer to another member for admin approval.
    #[poise::command(slash_command, guild_only)]
    pub async fn transfer(
        ctx: Context<'_>,
        #[description = "Member to transfer to"] user: serenity::User,
        #[description = "Amount, e.g. 15000 or 1g50s"] amount: String,
        #[description = "Reason for the transfer"] reason: String,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let Some(config) = utils::require_setup(&ctx, &guild_id).await? else {
            return Ok(());
        };

        if user.id == ctx.author().id {
            ctx.say("❌ You can't transfer currency to yourself.").await?;
            return Ok(());
        }
        if user.bot {
            ctx.say("❌ Bots don't carry coin.").await?;
            return Ok(());
        }

        let amount = currency::parse_amount(&amount)?;
        let submitted = request::submit(
            &ctx.data().database,
            NewRequest {
                guild_id,
                kind: RequestKind::Transfer,
                requester_id: ctx.author().id.to_string(),
                counterparty_id: Some(user.id.to_string()),
                amount,
                reason,
                bucket: Bucket::Banked,
            },
        )
        .await?;

        let symbols = utils::symbols(&ctx, Some(&config));
        let posted = utils::post_request_embed(&ctx, &submitted, &symbols, Some(&config)).await?;

        ctx.send(
            poise::CreateReply::default()
                .content(submission_reply(
                    &currency::format_copper(amount, &symbols),
                    posted,
                ))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Re-posts approval embeds for every pending request. Admin only.
    ///
    /// Useful after the original embeds scrolled away or were deleted; each
    /// re-posted embed becomes the request's new reaction target.
    #[poise::command(slash_command, guild_only)]
    pub async fn pending(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let guild_id = guild_id.to_string();
        let Some(config) = utils::require_setup(&ctx, &guild_id).await? else {
            return Ok(());
        };
        utils::ensure_admin(&ctx, &config).await?;

        let symbols = utils::symbols(&ctx, Some(&config));
        let open = request::list_pending(&ctx.data().database, &guild_id).await?;
        let count = open.len();
        let mut posted = 0_usize;
        for req in open {
            if utils::post_request_embed(&ctx, &req, &symbols, Some(&config)).await? {
                posted += 1;
            }
        }

        ctx.send(
            poise::CreateReply::default()
                .content(format!("Re-posted {posted} of {count} pending request(s)."))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::{pending, request, transfer};
