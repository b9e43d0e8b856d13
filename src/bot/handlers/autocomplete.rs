//! Autocomplete handlers for Discord slash command parameters.
//!
//! Offerings, menus and clients are chosen by id, so their handlers return
//! labelled choices whose value is the row id. Groups are chosen by slug.

use crate::{
    bot::BotData,
    core::{group, menu, user, weekmenu, week::WeekKey, window},
    errors::Error,
};
use poise::serenity_prelude as serenity;

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;
/// Discord choice name limit
const MAX_NAME_LEN: usize = 100;

fn choice_name(text: String) -> String {
    if text.chars().count() <= MAX_NAME_LEN {
        text
    } else {
        text.chars().take(MAX_NAME_LEN - 1).chain(['…']).collect()
    }
}

fn matches(haystack: &str, partial: &str) -> bool {
    haystack.to_lowercase().contains(&partial.to_lowercase())
}

/// Suggests the offerings of the caller's ordering window.
///
/// The window is resolved for the caller's group, the same way `/menu` shows it,
/// so only weekmenus that can actually be ordered are offered.
pub async fn autocomplete_offering(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let db = &ctx.data().database;
    let discord_id = ctx.author().id.to_string();

    let group_id = match user::get_user_by_discord_id(db, &discord_id).await {
        Ok(Some(client)) => client.group_id,
        _ => return Vec::new(),
    };
    let Ok(ordering_window) = window::resolve_ordering_window_now(db, group_id).await else {
        return Vec::new();
    };

    ordering_window
        .offerings()
        .iter()
        .filter(|offering| matches(&offering.menu.label, partial))
        .take(MAX_CHOICES)
        .map(|offering| {
            serenity::AutocompleteChoice::new(
                choice_name(format!(
                    "{} - {:.2} ({} left)",
                    offering.menu.label, offering.menu.price, offering.weekmenu.quantity
                )),
                offering.weekmenu.id,
            )
        })
        .collect()
}

/// Suggests menus by label or description.
pub async fn autocomplete_menu(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let db = &ctx.data().database;
    let Ok(menus) = menu::list_menus(db, None, Some(partial)).await else {
        return Vec::new();
    };

    menus
        .into_iter()
        .take(MAX_CHOICES)
        .map(|m| {
            serenity::AutocompleteChoice::new(
                choice_name(format!("{} ({}, {:.2})", m.label, m.menutype, m.price)),
                m.id,
            )
        })
        .collect()
}

/// Suggests the weekmenus of the current week.
pub async fn autocomplete_weekmenu(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let db = &ctx.data().database;
    let Ok(rows) =
        weekmenu::get_weekmenus_for_week(db, WeekKey::current(), weekmenu::GroupFilter::All).await
    else {
        return Vec::new();
    };

    rows.into_iter()
        .filter(|(_, m)| matches(&m.label, partial))
        .take(MAX_CHOICES)
        .map(|(wm, m)| {
            serenity::AutocompleteChoice::new(
                choice_name(format!("#{} {} ({} left)", wm.id, m.label, wm.quantity)),
                wm.id,
            )
        })
        .collect()
}

/// Suggests clients by name or username.
pub async fn autocomplete_client(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let db = &ctx.data().database;
    let Ok(clients) = user::list_clients(db, Some(partial)).await else {
        return Vec::new();
    };

    clients
        .into_iter()
        .take(MAX_CHOICES)
        .map(|c| serenity::AutocompleteChoice::new(choice_name(format!("{} <{}>", c.name, c.username)), c.id))
        .collect()
}

/// Suggests active group slugs.
pub async fn autocomplete_group_slug(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(groups) = group::list_active_groups(db).await else {
        return Vec::new();
    };

    groups
        .into_iter()
        .filter(|g| matches(&g.slug, partial) || matches(&g.name, partial))
        .map(|g| g.slug)
        .take(MAX_CHOICES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_name_truncates_long_labels() {
        assert_eq!(choice_name("Rendang".to_string()), "Rendang");

        let long = "x".repeat(150);
        let name = choice_name(long);
        assert_eq!(name.chars().count(), MAX_NAME_LEN);
        assert!(name.ends_with('…'));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        assert!(matches("Nasi Rames", "rames"));
        assert!(matches("Nasi Rames", ""));
        assert!(!matches("Soto", "rames"));
    }
}
