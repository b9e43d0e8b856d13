//! Reply helpers.

use crate::{bot::BotData, errors::{Error, Result}};

/// Discord message content limit, with headroom for code fences.
pub const MESSAGE_LIMIT: usize = 1900;

/// Splits `text` into chunks of at most `limit` characters, breaking on line ends.
///
/// A single line longer than `limit` is split mid-line.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line = line;
        while line.chars().count() > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let cut = line
                .char_indices()
                .nth(limit)
                .map_or(line.len(), |(i, _)| i);
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }

        let needed = current.chars().count() + line.chars().count() + usize::from(!current.is_empty());
        if needed > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Sends `text`, split over several messages when it is too long for one.
pub async fn say_long(
    ctx: poise::Context<'_, BotData, Error>,
    text: &str,
    ephemeral: bool,
) -> Result<()> {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        ctx.send(
            poise::CreateReply::default()
                .content(chunk)
                .ephemeral(ephemeral),
        )
        .await?;
    }
    Ok(())
}

/// Sends a reply only the caller can see.
pub async fn say_private(ctx: poise::Context<'_, BotData, Error>, text: impl Into<String>) -> Result<()> {
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}
