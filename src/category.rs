//! # Categories
//!
//! UI filter buttons are coarser than the categories stored on activity rows.
//! A single button (e.g. "see") can roll up several stored categories, and
//! stored values outside the whitelist are treated as data-entry errors and
//! never match any filter.

use log::trace;
use serde::{Deserialize, Serialize};

/// Stored category strings accepted by the filters (lowercase).
pub const VALID_CATEGORIES: &[&str] = &[
    "nightlife",
    "tour & learn",
    "eat & drink",
    "shop & stroll",
    "move & play",
    "watch & enjoy",
];

const DEFAULT_COLOR: &str = "#95A5A6";

/// A filter button on the explore screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum UiCategory {
    Eat,
    Shop,
    See,
    Tour,
    Move,
    Watch,
    Nightlife,
}

impl UiCategory {
    /// Buttons shown in the explore filter bar, in display order.
    pub const EXPLORE_BAR: [UiCategory; 4] = [
        UiCategory::Eat,
        UiCategory::Shop,
        UiCategory::See,
        UiCategory::Nightlife,
    ];

    /// The key used in cache keys and passed to [`matches_category`].
    pub fn as_key(self) -> &'static str {
        match self {
            UiCategory::Eat => "eat",
            UiCategory::Shop => "shop",
            UiCategory::See => "see",
            UiCategory::Tour => "tour",
            UiCategory::Move => "move",
            UiCategory::Watch => "watch",
            UiCategory::Nightlife => "nightlife",
        }
    }

    /// Parse a key, ignoring case and surrounding whitespace.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "eat" => Some(UiCategory::Eat),
            "shop" => Some(UiCategory::Shop),
            "see" => Some(UiCategory::See),
            "tour" => Some(UiCategory::Tour),
            "move" => Some(UiCategory::Move),
            "watch" => Some(UiCategory::Watch),
            "nightlife" => Some(UiCategory::Nightlife),
            _ => None,
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            UiCategory::Eat => "Eat",
            UiCategory::Shop => "Shop",
            UiCategory::See => "See",
            UiCategory::Tour => "Tour",
            UiCategory::Move => "Move",
            UiCategory::Watch => "Watch",
            UiCategory::Nightlife => "Nightlife",
        }
    }

    /// Stored categories this button selects.
    pub fn stored_categories(self) -> &'static [&'static str] {
        match self {
            UiCategory::Eat => &["eat & drink"],
            UiCategory::Shop => &["shop & stroll"],
            UiCategory::See => &["tour & learn", "watch & enjoy"],
            UiCategory::Tour => &["tour & learn"],
            UiCategory::Move => &["move & play"],
            UiCategory::Watch => &["watch & enjoy"],
            UiCategory::Nightlife => &["nightlife"],
        }
    }
}

/// Check whether a stored category is selected by a UI filter key.
///
/// Both sides are trimmed and lowercased. Absent categories, categories
/// outside [`VALID_CATEGORIES`] and unknown UI keys never match.
pub fn matches_category(activity_category: Option<&str>, selected: &str) -> bool {
    let Some(raw) = activity_category else {
        return false;
    };

    let category = raw.trim().to_lowercase();
    if !VALID_CATEGORIES.contains(&category.as_str()) {
        trace!("category {:?} is not in the whitelist", category);
        return false;
    }

    UiCategory::from_key(selected)
        .map(|ui| ui.stored_categories().contains(&category.as_str()))
        .unwrap_or(false)
}

/// Marker/card colour for a stored category.
///
/// Exact match first, then a keyword fallback for near-miss spellings.
pub fn category_color(category: Option<&str>) -> &'static str {
    let Some(raw) = category else {
        return DEFAULT_COLOR;
    };
    let category = raw.trim().to_lowercase();

    match category.as_str() {
        "eat & drink" => return "#CC432E",
        "shop & stroll" => return "#4D98CD",
        "tour & learn" => return "#115B37",
        "move & play" => return "#738FB9",
        "watch & enjoy" => return "#005692",
        "nightlife" => return "#7D4556",
        _ => {}
    }

    const FALLBACKS: [(&str, &str); 6] = [
        ("eat", "#CC432E"),
        ("shop", "#4D98CD"),
        ("tour", "#115B37"),
        ("move", "#738FB9"),
        ("watch", "#005692"),
        ("nightlife", "#7D4556"),
    ];

    FALLBACKS
        .iter()
        .find(|(keyword, _)| category.contains(keyword))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}
