//! Order Discord commands - the back office side of the order ledger.
//!
//! Admins list a week's orders per client, place and edit orders on a client's
//! behalf, hand orders over to another client and export a week as CSV.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, format,
            handlers::{autocomplete, checks::require_admin, reply},
        },
        core::{
            group,
            order::{self as order_core, OrderEdit, OrderFilter, ReassignMode},
            report,
            week::WeekKey,
            weekmenu,
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;

    /// How `/orders reassign` hands the orders over.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum ReassignChoice {
        #[name = "copy"]
        Copy,
        #[name = "move"]
        Move,
    }

    impl From<ReassignChoice> for ReassignMode {
        fn from(choice: ReassignChoice) -> Self {
            match choice {
                ReassignChoice::Copy => Self::Copy,
                ReassignChoice::Move => Self::Move,
            }
        }
    }

    async fn order_filter(
        ctx: poise::Context<'_, BotData, Error>,
        group: Option<String>,
        search: Option<String>,
    ) -> Result<OrderFilter> {
        let group_id = match group {
            Some(slug) => Some(
                group::require_group_by_slug(&ctx.data().database, &slug)
                    .await?
                    .id,
            ),
            None => None,
        };
        Ok(OrderFilter { group_id, search })
    }

    /// Parent command for the back office order ledger.
    #[poise::command(
        slash_command,
        subcommands(
            "orders_list",
            "orders_add",
            "orders_edit",
            "orders_delete",
            "orders_reassign",
            "orders_export"
        )
    )]
    pub async fn orders(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Order management command. Available subcommands:\n\
            `/orders list` - Orders of a week per client\n\
            `/orders add` - Place an order for a client\n\
            `/orders edit` - Change quantity or special price (0 deletes)\n\
            `/orders delete` - Delete an order and return its portions to stock\n\
            `/orders reassign` - Copy or move a client's orders to another client\n\
            `/orders export` - Download a week as CSV";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists the orders of a week, grouped per client.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn orders_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ISO week (defaults to this week)"] week: Option<i32>,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
        #[description = "Only clients of this group"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: Option<String>,
        #[description = "Search client name or menu label"] search: Option<String>,
    ) -> Result<()> {
        let week = WeekKey::resolve(week, year, Utc::now())?;
        let filter = order_filter(ctx, group, search).await?;

        let overview = report::aggregate_by_user_week(&ctx.data().database, week, &filter).await?;
        let text = format::format_overview(&overview)?;
        reply::say_long(ctx, &text, false).await
    }

    /// Places an order for a client, or adds to the existing one.
    #[poise::command(slash_command, rename = "add", check = "require_admin")]
    pub async fn orders_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client to order for"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        client: i64,
        #[description = "Weekmenu to order"]
        #[autocomplete = "autocomplete::autocomplete_weekmenu"]
        weekmenu: i64,
        #[description = "Number of portions"]
        #[min = 1]
        quantity: i32,
        #[description = "Optional notes"] notes: Option<String>,
        #[description = "Record in this ISO week (defaults to the weekmenu's week)"] week: Option<
            i32,
        >,
        #[description = "Record in this year (defaults to the weekmenu's year)"] year: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let offered = weekmenu::get_weekmenu_by_id(db, weekmenu)
            .await?
            .ok_or(Error::WeekmenuNotFound { id: weekmenu })?;
        let week = WeekKey::validated(
            week.unwrap_or(offered.week),
            year.unwrap_or(offered.year),
        )?;

        let placed = order_core::place_or_update(
            db,
            ctx.data().settings.stock_policy,
            client,
            weekmenu,
            week,
            quantity,
            notes,
        )
        .await?;

        let mut message = format!(
            "✅ Order #{} now holds {} portions for {week}.",
            placed.order.id, placed.order.quantity
        );
        if placed.was_clamped() {
            message.push_str(&format!(
                "\n⚠️ Only {} of {} requested portions were available.",
                placed.committed, placed.requested
            ));
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Overwrites the quantity and special price of an order. Quantity 0 deletes it.
    #[poise::command(slash_command, rename = "edit", check = "require_admin")]
    pub async fn orders_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order id (see /orders list)"] order: i64,
        #[description = "New quantity, 0 deletes the order"]
        #[min = 0]
        quantity: i32,
        #[description = "Special unit price for this order (empty uses the menu price)"]
        special_price: Option<f64>,
    ) -> Result<()> {
        let edit = order_core::update_quantity_and_price(
            &ctx.data().database,
            order,
            quantity,
            special_price,
        )
        .await?;

        let message = match edit {
            OrderEdit::Updated(updated) => format!(
                "✅ Order #{} updated to {} portions{}.",
                updated.id,
                updated.quantity,
                updated
                    .special_price
                    .map_or_else(String::new, |price| format!(" at {price:.2}"))
            ),
            OrderEdit::Deleted { released } => {
                format!("🗑️ Order #{order} deleted, {released} portions back in stock.")
            }
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Deletes an order and returns its portions to stock.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn orders_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order id (see /orders list)"] order: i64,
    ) -> Result<()> {
        let released = order_core::delete_order(&ctx.data().database, order).await?;
        ctx.say(format!(
            "🗑️ Order #{order} deleted, {released} portions back in stock."
        ))
        .await?;
        Ok(())
    }

    /// Copies or moves all of a client's orders in a week to another client.
    #[poise::command(slash_command, rename = "reassign", check = "require_admin")]
    pub async fn orders_reassign(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client whose orders are handed over"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        from: i64,
        #[description = "Client receiving the orders"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        to: i64,
        #[description = "Copy keeps the original orders, move hands them over"] mode: ReassignChoice,
        #[description = "ISO week (defaults to this week)"] week: Option<i32>,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
    ) -> Result<()> {
        let week = WeekKey::resolve(week, year, Utc::now())?;
        let count =
            order_core::reassign(&ctx.data().database, from, week, to, mode.into()).await?;

        let verb = match mode {
            ReassignChoice::Copy => "Copied",
            ReassignChoice::Move => "Moved",
        };
        ctx.say(format!("✅ {verb} {count} orders of {week}.")).await?;
        Ok(())
    }

    /// Exports a week as a client x menu CSV file.
    #[poise::command(slash_command, rename = "export", check = "require_admin")]
    pub async fn orders_export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ISO week (defaults to this week)"] week: Option<i32>,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
        #[description = "Only clients of this group"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: Option<String>,
    ) -> Result<()> {
        ctx.defer().await?;
        let week = WeekKey::resolve(week, year, Utc::now())?;
        let filter = order_filter(ctx, group, None).await?;

        let matrix = report::export_matrix(&ctx.data().database, week, &filter).await?;
        let csv = matrix.to_csv()?;
        let attachment = serenity::CreateAttachment::bytes(
            csv.into_bytes(),
            format!("orders-{}-week{:02}.csv", week.year, week.week),
        );

        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "📎 Orders for {week}: {} clients, {:.2} total.",
                    matrix.rows.len(),
                    matrix.totals.total_price
                ))
                .attachment(attachment),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
