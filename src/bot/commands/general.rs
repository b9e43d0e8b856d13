//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**MenuBuddy Help**\n\
        Order this week's dishes, or pre-order next week's, right here in Discord.\n\n\
        **Ordering**\n\
        • `/register <token> <name> <email> [group]` - Create your account with an invite token.\n\
        • `/menu` - Shows what can be ordered right now.\n\
        • `/order <dish> <quantity> [notes]` - Orders a dish; you get a confirmation by DM.\n\
        • `/myorders` - Shows your orders per week.\n\n\
        **Back office** (admins only)\n\
        • `/weekmenu <subcommand>` - Weekly offerings and stock (add, list, close, toggle_invitation, reorder, restock, delete).\n\
        • `/orders <subcommand>` - Orders per week (list, add, edit, reassign, export).\n\
        • `/menus`, `/groups`, `/clients`, `/invites` - Manage the catalog, groups, clients and invite tokens.\n\
        • `/invoices <subcommand>` - Save, list and show invoices.\n\
        • `/dashboard` - Weekly and quarterly figures.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
