//! Client Discord commands - menu, order, myorders and register.
//!
//! These commands act on behalf of the account bound to the caller's Discord
//! identity. Ordering is limited to the offerings of the caller's ordering window.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, format,
            handlers::{autocomplete, checks, reply},
        },
        core::{
            confirmation, group, invite,
            order::{self, OrderRequest},
            report,
            user::ClientInput,
            week::WeekKey,
            window,
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use tracing::{info, warn};

    const NOT_REGISTERED: &str =
        "❌ Your Discord account is not registered yet. Use `/register` with an invite token.";

    /// Sends the order confirmation by DM. Failures are logged, never reported.
    async fn send_confirmation(ctx: poise::Context<'_, BotData, Error>, user_id: i64, week: WeekKey) {
        let text = match confirmation::build_confirmation(&ctx.data().database, user_id, week)
            .await
            .and_then(|c| c.render_text())
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not build order confirmation for user {user_id}: {e}");
                return;
            }
        };

        let message = serenity::CreateMessage::new().content(text);
        if let Err(e) = ctx
            .author()
            .direct_message(ctx.serenity_context(), message)
            .await
        {
            warn!(
                "Could not send order confirmation to {}: {e}",
                ctx.author().id
            );
        }
    }

    /// Shows what can be ordered right now.
    ///
    /// When the current week has nothing left, the earliest week opened for
    /// pre-order is shown instead.
    #[poise::command(slash_command)]
    pub async fn menu(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let group_id = checks::caller_account(ctx)
            .await?
            .and_then(|account| account.group_id);

        let ordering_window = window::resolve_ordering_window_now(db, group_id).await?;
        let text = format::format_window(&ordering_window)?;
        reply::say_long(ctx, &text, false).await
    }

    /// Orders a dish from the current menu or the pre-order menu.
    #[poise::command(slash_command)]
    pub async fn order(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Dish to order"]
        #[autocomplete = "autocomplete::autocomplete_offering"]
        dish: i64,
        #[description = "Number of portions"]
        #[min = 1]
        quantity: i32,
        #[description = "Optional notes (allergies, delivery details)"] notes: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let Some(account) = checks::caller_account(ctx).await? else {
            reply::say_private(ctx, NOT_REGISTERED).await?;
            return Ok(());
        };

        let ordering_window = window::resolve_ordering_window_now(db, account.group_id).await?;
        let Some(offering) = ordering_window
            .offerings()
            .iter()
            .find(|offering| offering.weekmenu.id == dish)
        else {
            reply::say_private(
                ctx,
                "❌ That dish cannot be ordered right now. Use `/menu` to see what can.",
            )
            .await?;
            return Ok(());
        };
        let label = offering.menu.label.clone();

        let placement = order::place_client_orders(
            db,
            ctx.data().settings.stock_policy,
            account.id,
            &[OrderRequest {
                weekmenu_id: dish,
                quantity,
                notes,
            }],
        )
        .await?;

        let Some(placed) = placement.placed.first() else {
            return Ok(());
        };

        let mut message = format!(
            "✅ Ordered **{}x {label}** for {}.",
            placed.committed, placement.week
        );
        if ordering_window.is_pre_order() {
            message.push_str(" This is a pre-order.");
        }
        if placed.was_clamped() {
            message.push_str(&format!(
                "\n⚠️ Only {} of the {} portions you asked for were still available.",
                placed.committed, placed.requested
            ));
        }
        ctx.say(message).await?;

        info!(
            "Client {} ordered {} of weekmenu {} via Discord",
            account.id, placed.committed, dish
        );
        send_confirmation(ctx, account.id, placement.week).await;
        Ok(())
    }

    /// Shows your orders, newest week first.
    #[poise::command(slash_command)]
    pub async fn myorders(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(account) = checks::caller_account(ctx).await? else {
            reply::say_private(ctx, NOT_REGISTERED).await?;
            return Ok(());
        };

        let history = report::client_order_history(&ctx.data().database, account.id).await?;
        let text = format::format_history(&history)?;
        reply::say_long(ctx, &text, true).await
    }

    /// Creates your client account with an invite token.
    #[poise::command(slash_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Invite token you received"] token: String,
        #[description = "Your name"] name: String,
        #[description = "Your e-mail address"] email: String,
        #[description = "Your delivery group"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        ctx.defer_ephemeral().await?;

        if checks::caller_account(ctx).await?.is_some() {
            reply::say_private(ctx, "ℹ️ Your Discord account is already registered.").await?;
            return Ok(());
        }

        let group_id = match group {
            Some(slug) => Some(group::require_group_by_slug(db, &slug).await?.id),
            None => None,
        };

        let client = invite::register_with_token(
            db,
            &token,
            ClientInput {
                name,
                username: email,
                phone: None,
                group_id,
                discord_id: Some(ctx.author().id.to_string()),
            },
            Utc::now(),
        )
        .await?;

        reply::say_private(
            ctx,
            format!(
                "✅ Welcome, {}! You are registered as {}. Use `/menu` to see what you can order.",
                client.name, client.username
            ),
        )
        .await
    }
}

// Re-export all commands
pub use inner::*;
