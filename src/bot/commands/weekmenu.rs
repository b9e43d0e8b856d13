//! Weekmenu Discord commands - weekly offerings and their remaining stock.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, format,
            handlers::{args, autocomplete, checks::require_admin, reply},
        },
        core::{
            group,
            week::WeekKey,
            weekmenu::{self as weekmenu_core, GroupFilter},
        },
        errors::{Error, Result},
    };
    use chrono::Utc;

    async fn group_id(ctx: poise::Context<'_, BotData, Error>, slug: Option<&str>) -> Result<Option<i64>> {
        match slug {
            Some(slug) => Ok(Some(
                group::require_group_by_slug(&ctx.data().database, slug)
                    .await?
                    .id,
            )),
            None => Ok(None),
        }
    }

    /// Parent command for managing weekly offerings.
    #[poise::command(
        slash_command,
        subcommands(
            "weekmenu_add",
            "weekmenu_list",
            "weekmenu_close",
            "weekmenu_toggle_invitation",
            "weekmenu_reorder",
            "weekmenu_restock",
            "weekmenu_delete"
        )
    )]
    pub async fn weekmenu(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Weekmenu management command. Available subcommands:\n\
            `/weekmenu add` - Offer a menu in a week\n\
            `/weekmenu list` - List the offerings of a week\n\
            `/weekmenu close` - Set the remaining stock of a week to zero\n\
            `/weekmenu toggle_invitation` - Open or close a week for pre-orders\n\
            `/weekmenu reorder` - Set the display order of offerings\n\
            `/weekmenu restock` - Add stock or set it to an exact amount\n\
            `/weekmenu delete` - Remove an offering";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Offers a menu in a week, optionally for one group only.
    #[poise::command(slash_command, rename = "add", check = "require_admin")]
    pub async fn weekmenu_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Menu to offer"]
        #[autocomplete = "autocomplete::autocomplete_menu"]
        menu: i64,
        #[description = "Portions available"]
        #[min = 1]
        quantity: i32,
        #[description = "ISO week (defaults to this week)"] week: Option<i32>,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
        #[description = "Only for this group (defaults to all groups)"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let week = WeekKey::resolve(week, year, Utc::now())?;
        let group_id = group_id(ctx, group.as_deref()).await?;

        let created = weekmenu_core::create_weekmenu(db, menu, week, group_id, quantity).await?;
        ctx.say(format!(
            "✅ Weekmenu #{} added for {week} with {} portions.",
            created.id, created.quantity
        ))
        .await?;
        Ok(())
    }

    /// Lists the offerings of a week.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn weekmenu_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ISO week (defaults to this week)"] week: Option<i32>,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
        #[description = "Only offerings assigned to this group"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let week = WeekKey::resolve(week, year, Utc::now())?;
        let filter = group_id(ctx, group.as_deref())
            .await?
            .map_or(GroupFilter::All, GroupFilter::Group);

        let rows = weekmenu_core::get_weekmenus_for_week(db, week, filter).await?;
        let text = format::format_weekmenus(week, &rows)?;
        reply::say_long(ctx, &text, false).await
    }

    /// Closes ordering for a week by setting every remaining stock to zero.
    #[poise::command(slash_command, rename = "close", check = "require_admin")]
    pub async fn weekmenu_close(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ISO week (defaults to this week)"] week: Option<i32>,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
    ) -> Result<()> {
        let week = WeekKey::resolve(week, year, Utc::now())?;
        let closed = weekmenu_core::close_ordering(&ctx.data().database, week).await?;
        ctx.say(format!("🔒 Closed ordering for {week} ({closed} weekmenus)."))
            .await?;
        Ok(())
    }

    /// Opens a week for pre-orders, or closes it again.
    #[poise::command(slash_command, rename = "toggle_invitation", check = "require_admin")]
    pub async fn weekmenu_toggle_invitation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ISO week"] week: i32,
        #[description = "Year (defaults to this year)"] year: Option<i32>,
    ) -> Result<()> {
        let week = WeekKey::resolve(Some(week), year, Utc::now())?;
        let toggled =
            weekmenu_core::toggle_invitation_visibility(&ctx.data().database, week).await?;
        ctx.say(format!(
            "🔁 Toggled pre-order visibility of {toggled} weekmenus in {week}."
        ))
        .await?;
        Ok(())
    }

    /// Sets the display order: the listed weekmenus get positions 0, 1, 2, ...
    #[poise::command(slash_command, rename = "reorder", check = "require_admin")]
    pub async fn weekmenu_reorder(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Weekmenu ids in display order, comma-separated (e.g. 12,7,9)"] ids: String,
    ) -> Result<()> {
        let items = args::parse_id_list(&ids, "ids")?
            .into_iter()
            .enumerate()
            .map(|(position, id)| Ok((id, i32::try_from(position)?)))
            .collect::<Result<Vec<(i64, i32)>>>()?;

        let updated = weekmenu_core::set_ordering(&ctx.data().database, &items).await?;
        ctx.say(format!("✅ Reordered {updated} weekmenus.")).await?;
        Ok(())
    }

    /// Adds stock to a weekmenu, or sets it to an exact amount.
    #[poise::command(slash_command, rename = "restock", check = "require_admin")]
    pub async fn weekmenu_restock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Weekmenu to restock"]
        #[autocomplete = "autocomplete::autocomplete_weekmenu"]
        weekmenu: i64,
        #[description = "Portions to add, or the new total with exact"]
        #[min = 1]
        amount: i32,
        #[description = "Set the stock to exactly this amount (default: add)"] exact: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let updated = if exact.unwrap_or(false) {
            weekmenu_core::set_quantity(db, weekmenu, amount).await?
        } else {
            weekmenu_core::adjust_availability(db, weekmenu, amount).await?
        };

        ctx.say(format!(
            "📦 Weekmenu #{} now has {} portions left.",
            updated.id, updated.quantity
        ))
        .await?;
        Ok(())
    }

    /// Removes an offering together with its orders.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn weekmenu_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Weekmenu to delete"]
        #[autocomplete = "autocomplete::autocomplete_weekmenu"]
        weekmenu: i64,
    ) -> Result<()> {
        weekmenu_core::delete_weekmenu(&ctx.data().database, weekmenu).await?;
        ctx.say(format!("🗑️ Weekmenu #{weekmenu} deleted.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

