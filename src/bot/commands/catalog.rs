//! Catalog Discord commands - menus and delivery groups.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, checks::require_admin, reply},
        },
        core::{
            group as group_core,
            menu::{self as menu_core, MenuType},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Menu type as offered in slash command choices.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum MenuTypeChoice {
        #[name = "normal"]
        Normal,
        #[name = "menuset"]
        Menuset,
    }

    impl From<MenuTypeChoice> for MenuType {
        fn from(choice: MenuTypeChoice) -> Self {
            match choice {
                MenuTypeChoice::Normal => Self::Normal,
                MenuTypeChoice::Menuset => Self::Menuset,
            }
        }
    }

    /// Parent command for the menu catalog.
    #[poise::command(
        slash_command,
        subcommands("menus_add", "menus_update", "menus_delete", "menus_list")
    )]
    pub async fn menus(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Menu catalog command. Available subcommands:\n\
            `/menus add` - Add a dish or menu set\n\
            `/menus update` - Change label, description, price or type\n\
            `/menus delete` - Delete a menu with its weekmenus and orders\n\
            `/menus list` - List the catalog";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a dish or menu set to the catalog.
    #[poise::command(slash_command, rename = "add", check = "require_admin")]
    pub async fn menus_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Label shown to clients"] label: String,
        #[description = "Price per portion"] price: f64,
        #[description = "Dish or menu set (default: normal)"] menutype: Option<MenuTypeChoice>,
        #[description = "Optional description"] description: Option<String>,
    ) -> Result<()> {
        let menutype = menutype.map_or(MenuType::Normal, MenuType::from);
        let created =
            menu_core::create_menu(&ctx.data().database, label, description, price, menutype)
                .await?;

        ctx.say(format!(
            "✅ Menu #{} **{}** added at {:.2}.",
            created.id, created.label, created.price
        ))
        .await?;
        Ok(())
    }

    /// Replaces label, description, price and type of a menu.
    #[poise::command(slash_command, rename = "update", check = "require_admin")]
    pub async fn menus_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Menu to update"]
        #[autocomplete = "autocomplete::autocomplete_menu"]
        menu: i64,
        #[description = "Label shown to clients"] label: String,
        #[description = "Price per portion"] price: f64,
        #[description = "Dish or menu set"] menutype: MenuTypeChoice,
        #[description = "Description (empty clears it)"] description: Option<String>,
    ) -> Result<()> {
        let updated = menu_core::update_menu(
            &ctx.data().database,
            menu,
            label,
            description,
            price,
            menutype.into(),
        )
        .await?;

        ctx.say(format!(
            "✅ Menu #{} is now **{}** ({}) at {:.2}.",
            updated.id, updated.label, updated.menutype, updated.price
        ))
        .await?;
        Ok(())
    }

    /// Deletes a menu together with its weekmenus and their orders.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn menus_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Menu to delete"]
        #[autocomplete = "autocomplete::autocomplete_menu"]
        menu: i64,
    ) -> Result<()> {
        menu_core::delete_menu(&ctx.data().database, menu).await?;
        ctx.say(format!("🗑️ Menu #{menu} deleted.")).await?;
        Ok(())
    }

    /// Lists the catalog.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn menus_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this type"] menutype: Option<MenuTypeChoice>,
        #[description = "Search label or description"] search: Option<String>,
    ) -> Result<()> {
        let menus = menu_core::list_menus(
            &ctx.data().database,
            menutype.map(MenuType::from),
            search.as_deref(),
        )
        .await?;

        if menus.is_empty() {
            ctx.say("📭 No menus found. Use `/menus add` to create one!")
                .await?;
            return Ok(());
        }

        let mut text = String::from("📖 **Menus**");
        for m in &menus {
            write!(
                text,
                "\n• #{} **{}** ({}) - {:.2}",
                m.id, m.label, m.menutype, m.price
            )?;
        }
        reply::say_long(ctx, &text, false).await
    }

    /// Parent command for delivery groups.
    #[poise::command(
        slash_command,
        subcommands("groups_add", "groups_list", "groups_delete")
    )]
    pub async fn groups(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Group management command. Available subcommands:\n\
            `/groups add` - Add a delivery group\n\
            `/groups list` - List groups\n\
            `/groups delete` - Delete a group (its clients keep their account)";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a delivery group.
    #[poise::command(slash_command, rename = "add", check = "require_admin")]
    pub async fn groups_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] name: String,
        #[description = "Unique short name used in commands"] slug: String,
    ) -> Result<()> {
        let created = group_core::create_group(&ctx.data().database, name, slug).await?;
        ctx.say(format!(
            "✅ Group **{}** (`{}`) added.",
            created.name, created.slug
        ))
        .await?;
        Ok(())
    }

    /// Lists delivery groups.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn groups_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search name or slug"] search: Option<String>,
    ) -> Result<()> {
        let groups = group_core::list_groups(&ctx.data().database, search.as_deref()).await?;

        if groups.is_empty() {
            ctx.say("📭 No groups found. Use `/groups add` to create one!")
                .await?;
            return Ok(());
        }

        let mut text = String::from("👥 **Groups**");
        for g in &groups {
            write!(
                text,
                "\n• **{}** (`{}`){}",
                g.name,
                g.slug,
                if g.active { "" } else { " - inactive" }
            )?;
        }
        reply::say_long(ctx, &text, false).await
    }

    /// Deletes a delivery group. Its clients and orders are kept without a group.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn groups_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to delete"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let found = group_core::require_group_by_slug(db, &group).await?;
        group_core::delete_group(db, found.id).await?;
        ctx.say(format!("🗑️ Group **{}** deleted.", found.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
