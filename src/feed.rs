//! # Feed
//!
//! The home feed's filtering. Unlike the explore screen it filters on every
//! input without caching or debouncing, and search covers name and
//! description only.

use crate::category::matches_category;
use crate::Activity;

/// Rows skipped at the top of the filtered feed before the carousels start.
pub const FEED_SECTION_OFFSET: usize = 15;
/// Rows shown per carousel.
pub const FEED_SECTION_LEN: usize = 20;

/// Activities for the feed, in source order.
pub fn feed_results(activities: &[Activity], category: Option<&str>, query: &str) -> Vec<Activity> {
    let needle = query.trim().to_lowercase();
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    activities
        .iter()
        .filter(|a| {
            needle.is_empty()
                || [&a.name, &a.description]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .filter(|a| category.map_or(true, |selected| matches_category(a.category.as_deref(), selected)))
        .cloned()
        .collect()
}

/// The slice of feed results shown in the "Popular right now" and
/// "New hot spots" carousels. Short feeds yield a short or empty section.
pub fn feed_section(results: &[Activity]) -> &[Activity] {
    let start = FEED_SECTION_OFFSET.min(results.len());
    let end = (FEED_SECTION_OFFSET + FEED_SECTION_LEN).min(results.len());
    &results[start..end]
}
