//! # Filter Engine
//!
//! Category and search filtering of activity lists, memoized per filter
//! combination.
//!
//! Two caches are kept: one for filtered lists and one for their mappable
//! (coordinate-valid) subsets. Keys are deterministic strings built from the
//! selected category and the normalized query. A cached list is shared as an
//! `Arc` and handed back verbatim on every hit, so callers can detect reuse
//! with [`Arc::ptr_eq`].
//!
//! Entries are never invalidated by new upstream data within a session; they
//! only leave the cache through insertion-order eviction or [`FilterEngine::clear`].

use std::sync::Arc;

use log::debug;

use crate::bounded_cache::BoundedCache;
use crate::category::matches_category;
use crate::geo_utils::has_valid_coordinates;
use crate::{Activity, DEFAULT_CACHE_CAPACITY};

const ALL_CATEGORIES: &str = "all";
const EMPTY_QUERY: &str = "none";
const MAPPABLE_PREFIX: &str = "map-";

/// Trimmed, lowercased query; empty means "no search".
fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
}

/// Cache key for a filtered result set: `"{category|all}-{query|none}"`.
///
/// A search for the literal text "none" shares its key with the empty query,
/// so it resolves to the unfiltered entry for that category.
pub fn cache_key(category: Option<&str>, query: &str) -> String {
    let category = normalize_category(category);
    let query = normalize_query(query);
    format!(
        "{}-{}",
        category.as_deref().unwrap_or(ALL_CATEGORIES),
        if query.is_empty() { EMPTY_QUERY } else { query.as_str() }
    )
}

/// Cache key for a mappable result set; namespaced apart from [`cache_key`].
pub fn mappable_cache_key(category: Option<&str>, query: &str) -> String {
    format!("{}{}", MAPPABLE_PREFIX, cache_key(category, query))
}

/// Whether the activity's name, description or address contains `needle`.
///
/// `needle` must already be lowercased.
fn matches_search(activity: &Activity, needle: &str) -> bool {
    [&activity.name, &activity.description, &activity.address]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Stable filter over `activities` for the given criteria.
///
/// A blank category means "no category filter", the same as in [`cache_key`].
fn apply_filters(activities: &[Activity], category: Option<&str>, query: &str) -> Vec<Activity> {
    let category = normalize_category(category);
    let needle = normalize_query(query);

    activities
        .iter()
        .filter(|a| match category.as_deref() {
            Some(selected) => matches_category(a.category.as_deref(), selected),
            None => true,
        })
        .filter(|a| needle.is_empty() || matches_search(a, &needle))
        .cloned()
        .collect()
}

/// Memoizing filter engine with separate filtered and mappable caches.
#[derive(Debug)]
pub struct FilterEngine {
    filtered_cache: BoundedCache<String, Arc<Vec<Activity>>>,
    mappable_cache: BoundedCache<String, Arc<Vec<Activity>>>,
    hits: u64,
    misses: u64,
}

impl FilterEngine {
    /// Create an engine whose caches each hold at most `capacity` result sets.
    pub fn new(capacity: usize) -> Self {
        Self {
            filtered_cache: BoundedCache::new(capacity),
            mappable_cache: BoundedCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Activities matching the category and search query.
    ///
    /// Returns the cached list if this combination was computed before.
    /// An empty input yields an empty list that is not cached.
    pub fn compute_filtered(
        &mut self,
        activities: &[Activity],
        category: Option<&str>,
        query: &str,
    ) -> Arc<Vec<Activity>> {
        let key = cache_key(category, query);

        if let Some(cached) = self.filtered_cache.get_cloned(&key) {
            self.hits += 1;
            debug!("[FilterEngine] Using cached results for: {}", key);
            return cached;
        }

        if activities.is_empty() {
            return Arc::new(Vec::new());
        }

        self.misses += 1;
        let result = Arc::new(apply_filters(activities, category, query));
        debug!(
            "[FilterEngine] {}: {} of {} activities",
            key,
            result.len(),
            activities.len()
        );

        self.filtered_cache.insert(key, Arc::clone(&result));
        result
    }

    /// The subset of `filtered` that can be placed on the map.
    ///
    /// `filtered` is expected to be the output of [`compute_filtered`](Self::compute_filtered)
    /// for the same criteria; the criteria are re-applied anyway, so the result
    /// is always a subset of that output.
    pub fn compute_mappable(
        &mut self,
        filtered: &[Activity],
        category: Option<&str>,
        query: &str,
    ) -> Arc<Vec<Activity>> {
        let key = mappable_cache_key(category, query);

        if let Some(cached) = self.mappable_cache.get_cloned(&key) {
            self.hits += 1;
            debug!("[FilterEngine] Using cached mappable results for: {}", key);
            return cached;
        }

        if filtered.is_empty() {
            return Arc::new(Vec::new());
        }

        self.misses += 1;
        let mut result = apply_filters(filtered, category, query);
        result.retain(has_valid_coordinates);
        debug!(
            "[FilterEngine] {}: {} mappable of {}",
            key,
            result.len(),
            filtered.len()
        );

        let result = Arc::new(result);
        self.mappable_cache.insert(key, Arc::clone(&result));
        result
    }

    /// Seed the unfiltered entries with a freshly loaded list.
    pub fn prime(&mut self, activities: &[Activity]) {
        if activities.is_empty() {
            return;
        }
        let all: Vec<Activity> = activities.to_vec();
        let mappable: Vec<Activity> = all
            .iter()
            .filter(|a| has_valid_coordinates(a))
            .cloned()
            .collect();

        debug!(
            "[FilterEngine] Primed {} activities ({} mappable)",
            all.len(),
            mappable.len()
        );
        self.filtered_cache
            .insert(cache_key(None, ""), Arc::new(all));
        self.mappable_cache
            .insert(mappable_cache_key(None, ""), Arc::new(mappable));
    }

    /// Whether a filtered result set is cached for these criteria.
    pub fn is_cached(&self, category: Option<&str>, query: &str) -> bool {
        self.filtered_cache.contains(&cache_key(category, query))
    }

    /// Drop every cached result set.
    pub fn clear(&mut self) {
        self.filtered_cache.clear();
        self.mappable_cache.clear();
    }

    /// Cache statistics for monitoring.
    pub fn stats(&self) -> FilterStats {
        FilterStats {
            filtered_entries: self.filtered_cache.len() as u32,
            mappable_entries: self.mappable_cache.len() as u32,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Filter cache statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct FilterStats {
    pub filtered_entries: u32,
    pub mappable_entries: u32,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activities() -> Vec<Activity> {
        vec![
            Activity::new(1, "Reading Terminal Market", "Eat & Drink")
                .with_address("51 N 12th St")
                .with_coordinates(39.9533, -75.1593),
            Activity::new(2, "Franklin Institute", "tour & learn")
                .with_description("Hands-on science museum")
                .with_coordinates(39.9582, -75.1731),
            Activity::new(3, "Film Society", "watch & enjoy").with_address("Market St"),
            Activity::new(4, "Dive Bar", "nightlife").with_coordinates(999.0, 0.0),
            Activity::new(5, "Typo Diner", "eat and drink").with_coordinates(39.95, -75.16),
        ]
    }

    fn ids(list: &[Activity]) -> Vec<i64> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(cache_key(None, ""), "all-none");
        assert_eq!(cache_key(None, "   "), "all-none");
        assert_eq!(cache_key(Some("eat"), " Market "), "eat-market");
        assert_eq!(cache_key(Some("EAT"), "MARKET"), "eat-market");
        assert_eq!(mappable_cache_key(Some("see"), ""), "map-see-none");
    }

    #[test]
    fn test_blank_category_means_all() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        let blank = engine.compute_filtered(&activities, Some(""), "");
        assert_eq!(ids(&blank), vec![1, 2, 3, 4, 5]);
        let spaces = engine.compute_filtered(&activities, Some("  "), "");
        assert!(Arc::ptr_eq(&blank, &spaces));

        let all = engine.compute_filtered(&activities, None, "");
        assert!(Arc::ptr_eq(&blank, &all));
        assert_eq!(all.len(), 5);

        let mappable = engine.compute_mappable(&blank, Some(" "), "");
        assert_eq!(ids(&mappable), vec![1, 2, 5]);
    }

    #[test]
    fn test_query_none_shares_unfiltered_key() {
        assert_eq!(cache_key(None, "none"), cache_key(None, ""));
        assert_eq!(cache_key(Some("eat"), " NONE "), "eat-none");

        let mut engine = FilterEngine::default();
        let activities = sample_activities();
        let all = engine.compute_filtered(&activities, None, "");
        let literal = engine.compute_filtered(&activities, None, "none");
        assert!(Arc::ptr_eq(&all, &literal));
    }

    #[test]
    fn test_no_criteria_keeps_everything_in_order() {
        let mut engine = FilterEngine::default();
        let result = engine.compute_filtered(&sample_activities(), None, "");
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_category_filter() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        assert_eq!(ids(&engine.compute_filtered(&activities, Some("eat"), "")), vec![1]);
        assert_eq!(ids(&engine.compute_filtered(&activities, Some("see"), "")), vec![2, 3]);
        assert_eq!(ids(&engine.compute_filtered(&activities, Some("nightlife"), "")), vec![4]);
        assert!(engine.compute_filtered(&activities, Some("brunch"), "").is_empty());
    }

    #[test]
    fn test_search_across_fields() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        // name (1), address (3)
        assert_eq!(ids(&engine.compute_filtered(&activities, None, "MARKET")), vec![1, 3]);
        // description only
        assert_eq!(ids(&engine.compute_filtered(&activities, None, " science ")), vec![2]);
        assert!(engine.compute_filtered(&activities, None, "zzz").is_empty());
    }

    #[test]
    fn test_category_and_search_combined() {
        let mut engine = FilterEngine::default();
        let result = engine.compute_filtered(&sample_activities(), Some("see"), "market");
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn test_repeat_call_returns_same_arc() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        let first = engine.compute_filtered(&activities, Some("see"), "");
        let second = engine.compute_filtered(&activities, Some("see"), "");
        assert!(Arc::ptr_eq(&first, &second));

        let stats = engine.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_cached_entry_ignores_new_data() {
        let mut engine = FilterEngine::default();
        let first = engine.compute_filtered(&sample_activities(), Some("eat"), "");

        let mut more = sample_activities();
        more.push(Activity::new(6, "Cafe", "eat & drink"));
        let second = engine.compute_filtered(&more, Some("eat"), "");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ids(&second), vec![1]);
    }

    #[test]
    fn test_mappable_subset() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        let filtered = engine.compute_filtered(&activities, None, "");
        let mappable = engine.compute_mappable(&filtered, None, "");
        assert_eq!(ids(&mappable), vec![1, 2, 5]);
        assert!(mappable.iter().all(|a| filtered.contains(a)));

        let filtered = engine.compute_filtered(&activities, Some("see"), "");
        let mappable = engine.compute_mappable(&filtered, Some("see"), "");
        assert_eq!(ids(&mappable), vec![2]);
    }

    #[test]
    fn test_mappable_namespace_is_separate() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        let filtered = engine.compute_filtered(&activities, None, "");
        let mappable = engine.compute_mappable(&filtered, None, "");
        assert!(!Arc::ptr_eq(&filtered, &mappable));
        assert_eq!(engine.stats().filtered_entries, 1);
        assert_eq!(engine.stats().mappable_entries, 1);
    }

    #[test]
    fn test_empty_input_not_cached() {
        let mut engine = FilterEngine::default();

        assert!(engine.compute_filtered(&[], Some("eat"), "").is_empty());
        assert!(!engine.is_cached(Some("eat"), ""));

        let result = engine.compute_filtered(&sample_activities(), Some("eat"), "");
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_cache_bound_evicts_first_insert() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();

        for i in 0..11 {
            engine.compute_filtered(&activities, None, &format!("query {}", i));
        }

        assert_eq!(engine.stats().filtered_entries, 10);
        assert!(!engine.is_cached(None, "query 0"));
        assert!(engine.is_cached(None, "query 1"));
        assert!(engine.is_cached(None, "query 10"));
    }

    #[test]
    fn test_prime_seeds_unfiltered_entries() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();
        engine.prime(&activities);

        let filtered = engine.compute_filtered(&[], None, "");
        assert_eq!(filtered.len(), 5);
        let mappable = engine.compute_mappable(&[], None, "");
        assert_eq!(ids(&mappable), vec![1, 2, 5]);
        assert_eq!(engine.stats().misses, 0);
    }

    #[test]
    fn test_input_not_mutated() {
        let mut engine = FilterEngine::default();
        let activities = sample_activities();
        let before = activities.clone();
        engine.compute_filtered(&activities, Some("eat"), "market");
        assert_eq!(activities, before);
    }
}
