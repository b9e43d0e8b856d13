//! Access checks and caller resolution.

use crate::{
    bot::BotData,
    core::user,
    entities::user::Model as UserModel,
    errors::{Error, Result},
};
use tracing::debug;

/// Poise check that lets only active admins through.
///
/// The failure carries `Error::Forbidden`, which `on_error` reports to the caller.
pub async fn require_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    let discord_id = ctx.author().id.to_string();
    let admin = user::authorize_admin(&ctx.data().database, &discord_id).await?;
    debug!("Admin {} authorized for `{}`", admin.id, ctx.command().name);
    Ok(true)
}

/// Finds the account bound to the caller's Discord identity.
pub async fn caller_account(ctx: poise::Context<'_, BotData, Error>) -> Result<Option<UserModel>> {
    let discord_id = ctx.author().id.to_string();
    user::get_user_by_discord_id(&ctx.data().database, &discord_id).await
}
