//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests valid category names and saved snapshot names as the user types.

use crate::{
    bot::BotData,
    core::{category, snapshot},
    errors::Error,
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

/// Keeps the names containing `partial` (case-insensitive), at most 25.
fn matching<I>(names: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for expense category names.
///
/// Categories come back from the store already sorted by name.
pub async fn autocomplete_category_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(categories) = category::list_categories(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(categories.into_iter().map(|c| c.name), partial)
}

/// Provides autocomplete suggestions for saved snapshot names, newest first.
pub async fn autocomplete_snapshot_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(snapshots) = snapshot::list_snapshots(&ctx.data().store).await else {
        return Vec::new();
    };
    matching(snapshots.into_iter().map(|s| s.name), partial)
}
