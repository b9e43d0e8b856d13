//! Admin bootstrap configuration.
//!
//! Discord user IDs listed in `ADMIN_DISCORD_IDS` (comma-separated) are promoted to
//! admins on start, so a fresh database always has someone who can run the back office.

/// Splits a comma-separated list of Discord user IDs, dropping blanks.
#[must_use]
pub fn parse_admin_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads the admin Discord user IDs from the `ADMIN_DISCORD_IDS` environment variable.
///
/// Returns an empty list when the variable is not set.
#[must_use]
pub fn get_admin_discord_ids() -> Vec<String> {
    std::env::var("ADMIN_DISCORD_IDS")
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}
