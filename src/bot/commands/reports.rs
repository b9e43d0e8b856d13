//! Invoice and dashboard Discord commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, format,
            handlers::{args, autocomplete, checks::require_admin, reply},
        },
        core::{invoice, report, user},
        errors::{Error, Result},
    };
    use chrono::Utc;

    /// Parent command for invoices.
    #[poise::command(
        slash_command,
        subcommands("invoices_save", "invoices_list", "invoices_show")
    )]
    pub async fn invoices(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Invoice command. Available subcommands:\n\
            `/invoices save` - Create or replace an invoice for a client's orders\n\
            `/invoices list` - List a client's invoices\n\
            `/invoices show` - Show an invoice with its VAT breakdown";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates an invoice, or replaces the one with the same number.
    #[poise::command(slash_command, rename = "save", check = "require_admin")]
    pub async fn invoices_save(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client to invoice"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        client: i64,
        #[description = "Invoice number"] number: String,
        #[description = "Order ids, comma-separated (see /orders list)"] orders: String,
        #[description = "Invoice date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let order_ids = args::parse_id_list(&orders, "orders")?;
        let invoice_date = match date {
            Some(raw) => args::parse_date(&raw, "date")?,
            None => Utc::now().date_naive(),
        };

        let saved =
            invoice::save_invoice(&ctx.data().database, client, number, invoice_date, &order_ids)
                .await?;
        ctx.say(format!(
            "✅ Invoice #{} **{}** saved with {} orders.",
            saved.id,
            saved.invoice_number,
            order_ids.len()
        ))
        .await?;
        Ok(())
    }

    /// Lists a client's invoices, newest first.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn invoices_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        client: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let found = user::get_user_by_id(db, client)
            .await?
            .ok_or(Error::UserNotFound { id: client })?;

        let summaries = invoice::get_invoices_for_user(db, client).await?;
        let text = format::format_invoice_list(&found.name, &summaries)?;
        reply::say_long(ctx, &text, false).await
    }

    /// Shows an invoice with its VAT breakdown.
    #[poise::command(slash_command, rename = "show", check = "require_admin")]
    pub async fn invoices_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Invoice id (see /invoices list)"] invoice: i64,
    ) -> Result<()> {
        let detail =
            invoice::invoice_detail(&ctx.data().database, invoice, ctx.data().settings.vat_rate)
                .await?;
        let text = format::format_invoice(&detail)?;
        reply::say_long(ctx, &text, false).await
    }

    /// Shows this week's orders, quarterly revenue, pre-orders and recent activity.
    #[poise::command(slash_command, check = "require_admin")]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;
        let stats = report::aggregate_dashboard_stats(&ctx.data().database, Utc::now()).await?;
        let text = format::format_dashboard(&stats)?;
        reply::say_long(ctx, &text, false).await
    }
}

// Re-export all commands
pub use inner::*;
