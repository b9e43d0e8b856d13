//! Client and invite Discord commands.
//!
//! Admins create clients directly (a group is required) or hand out invite tokens
//! that let clients register themselves with `/register`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{autocomplete, checks::require_admin, reply},
        },
        core::{
            group, invite,
            user::{self, ClientInput},
        },
        errors::{Error, Result},
    };
    use chrono::{Duration, Utc};
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for client accounts.
    #[poise::command(
        slash_command,
        subcommands("clients_add", "clients_list", "clients_link", "clients_delete")
    )]
    pub async fn clients(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Client management command. Available subcommands:\n\
            `/clients add` - Create a client in a group\n\
            `/clients list` - List clients\n\
            `/clients link` - Link a client to a Discord account\n\
            `/clients delete` - Delete a client with their orders and invoices";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates an active client in a group.
    #[poise::command(slash_command, rename = "add", check = "require_admin")]
    pub async fn clients_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client name"] name: String,
        #[description = "E-mail address, used as login"] email: String,
        #[description = "Delivery group"]
        #[autocomplete = "autocomplete::autocomplete_group_slug"]
        group: String,
        #[description = "Phone number"] phone: Option<String>,
        #[description = "Discord account to link"] discord: Option<serenity::User>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let group = group::require_group_by_slug(db, &group).await?;

        let client = user::create_client(
            db,
            ClientInput {
                name,
                username: email,
                phone,
                group_id: Some(group.id),
                discord_id: discord.map(|u| u.id.to_string()),
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Client #{} **{}** <{}> added to {}.",
            client.id, client.name, client.username, group.name
        ))
        .await?;
        Ok(())
    }

    /// Lists clients.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn clients_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search name or e-mail"] search: Option<String>,
    ) -> Result<()> {
        let clients = user::list_clients(&ctx.data().database, search.as_deref()).await?;

        if clients.is_empty() {
            ctx.say("📭 No clients found.").await?;
            return Ok(());
        }

        let mut text = String::from("🧑‍🍳 **Clients**");
        for c in &clients {
            write!(text, "\n• #{} **{}** <{}>", c.id, c.name, c.username)?;
            if let Some(phone) = &c.phone {
                write!(text, " {phone}")?;
            }
            if c.discord_id.is_some() {
                write!(text, " 🔗")?;
            }
            if !c.active {
                write!(text, " - inactive")?;
            }
        }
        reply::say_long(ctx, &text, false).await
    }

    /// Links a client to the Discord account that orders on their behalf.
    #[poise::command(slash_command, rename = "link", check = "require_admin")]
    pub async fn clients_link(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client to link"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        client: i64,
        #[description = "Discord account"] discord: serenity::User,
    ) -> Result<()> {
        let linked =
            user::link_discord_id(&ctx.data().database, client, discord.id.to_string()).await?;
        ctx.say(format!(
            "🔗 **{}** is now linked to {}.",
            linked.name, discord.name
        ))
        .await?;
        Ok(())
    }

    /// Deletes a client with their orders and invoices.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn clients_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client to delete"]
        #[autocomplete = "autocomplete::autocomplete_client"]
        client: i64,
    ) -> Result<()> {
        user::delete_client(&ctx.data().database, client).await?;
        ctx.say(format!("🗑️ Client #{client} deleted.")).await?;
        Ok(())
    }

    /// Parent command for registration invites.
    #[poise::command(
        slash_command,
        subcommands("invites_create", "invites_list", "invites_delete")
    )]
    pub async fn invites(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Invite management command. Available subcommands:\n\
            `/invites create` - Create a registration token valid for 3 days\n\
            `/invites list` - List tokens\n\
            `/invites delete` - Delete a token";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a registration token.
    #[poise::command(slash_command, rename = "create", check = "require_admin")]
    pub async fn invites_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Days from now until the token becomes valid (default: 0)"]
        #[min = 0]
        starts_in_days: Option<i64>,
    ) -> Result<()> {
        let valid_at = Utc::now() + Duration::days(starts_in_days.unwrap_or(0));
        let token = invite::generate_token(&ctx.data().database, valid_at).await?;

        reply::say_private(
            ctx,
            format!(
                "🎟️ Invite #{} valid from {} until {}:\n`{}`",
                token.id,
                token.valid_at.format("%Y-%m-%d %H:%M"),
                token.expires_at().format("%Y-%m-%d %H:%M"),
                token.token
            ),
        )
        .await
    }

    /// Lists registration tokens, newest first.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn invites_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let tokens = invite::list_tokens(&ctx.data().database).await?;

        if tokens.is_empty() {
            reply::say_private(ctx, "📭 No invites yet. Use `/invites create`.").await?;
            return Ok(());
        }

        let now = Utc::now();
        let mut text = String::from("🎟️ **Invites**");
        for token in &tokens {
            write!(
                text,
                "\n• #{} `{}` {} until {}",
                token.id,
                token.token,
                if token.is_valid_at(now) { "✅" } else { "⌛" },
                token.expires_at().format("%Y-%m-%d %H:%M")
            )?;
        }
        reply::say_long(ctx, &text, true).await
    }

    /// Deletes a registration token.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn invites_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Invite id (see /invites list)"] invite: i64,
    ) -> Result<()> {
        invite::delete_token(&ctx.data().database, invite).await?;
        reply::say_private(ctx, format!("🗑️ Invite #{invite} deleted.")).await
    }
}

// Re-export all commands
pub use inner::*;
