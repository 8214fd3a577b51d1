//! # Explore Session
//!
//! State for one lifetime of the explore screen: the loaded activity list,
//! raw and debounced filter inputs, the filter caches, the map region and the
//! detail sheet.
//!
//! ## Architecture
//!
//! The session is owned by whoever owns the screen and is dropped with it, so
//! its caches never outlive the screen or leak into another one. Nothing here
//! runs on its own: input events and a logical clock come in through method
//! calls, and the host calls [`ExploreSession::tick`] (at the latest by
//! [`ExploreSession::next_deadline`]) to settle debounced inputs.
//!
//! Filtered and mappable lists are recomputed only when the *debounced*
//! criteria change or a new activity list is loaded, never per keystroke.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::category::{category_color, UiCategory};
use crate::debounce::{Debounced, Timer};
use crate::filter::{FilterEngine, FilterStats};
use crate::geo_utils::{fit_activities, focus_region};
use crate::sheet::ActivitySheet;
use crate::{Activity, ExploreConfig, MapRegion, Result};

/// Whether results are shown on the map or as a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

/// A map pin for one mappable activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Marker {
    /// Stable key; changes with the category so pins re-render on filter change
    pub key: String,
    pub activity_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub subtitle: String,
    pub color: String,
}

/// Session statistics for monitoring.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ExploreStats {
    pub activity_count: u32,
    pub filtered_count: u32,
    pub mappable_count: u32,
    pub filter: FilterStats,
}

/// The explore screen's filter, cache and map state.
pub struct ExploreSession {
    config: ExploreConfig,

    // Source data
    activities: Vec<Activity>,
    loading: bool,

    // Raw inputs as the user enters them
    raw_category: Option<UiCategory>,
    raw_query: String,

    // Settled inputs that drive recomputation
    category: Debounced<Option<UiCategory>>,
    query: Debounced<String>,

    // Results
    engine: FilterEngine,
    filtered: Arc<Vec<Activity>>,
    mappable: Arc<Vec<Activity>>,

    // Map and presentation state
    view_mode: ViewMode,
    region: MapRegion,
    updating_markers: bool,
    marker_timer: Timer,
    fit_timer: Timer,
    sheet: ActivitySheet,

    mounted: bool,
}

impl ExploreSession {
    /// Create a session with the given configuration.
    ///
    /// Starts in the loading state with no activities.
    pub fn new(config: ExploreConfig) -> Self {
        // No filters are active yet, so inputs settle immediately until one is.
        Self {
            engine: FilterEngine::new(config.cache_capacity as usize),
            activities: Vec::new(),
            loading: true,
            raw_category: None,
            raw_query: String::new(),
            category: Debounced::new(None, Duration::ZERO),
            query: Debounced::new(String::new(), Duration::ZERO),
            filtered: Arc::new(Vec::new()),
            mappable: Arc::new(Vec::new()),
            view_mode: ViewMode::Map,
            region: MapRegion::initial(),
            updating_markers: false,
            marker_timer: Timer::new(),
            fit_timer: Timer::new(),
            sheet: ActivitySheet::new(),
            mounted: true,
            config,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Mark the session as waiting for data.
    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Accept the result of fetching activities.
    ///
    /// A failed fetch is logged and treated as an empty list. Invalid
    /// coordinates are cleared, and the unfiltered cache entries are seeded
    /// with the new list.
    pub fn load(&mut self, fetched: Result<Vec<Activity>>) {
        if !self.mounted {
            return;
        }

        let activities = match fetched {
            Ok(activities) => activities,
            Err(e) => {
                error!("[ExploreSession] Error loading activities: {}", e);
                Vec::new()
            }
        };

        let cleaned: Vec<Activity> = activities.iter().map(Activity::sanitized).collect();
        info!(
            "[ExploreSession] Loaded {} activities ({} with coordinates)",
            cleaned.len(),
            cleaned.iter().filter(|a| a.latitude.is_some()).count()
        );

        self.engine.prime(&cleaned);
        self.activities = cleaned;
        self.loading = false;
        self.recompute();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Update the search text at time `now`.
    ///
    /// Returns `true` if the results changed immediately (no debounce active).
    pub fn set_search_query(&mut self, query: &str, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        self.raw_query = query.to_string();
        self.apply_inputs(now)
    }

    /// Toggle a category button at time `now`.
    ///
    /// Pressing the selected category clears the filter. Markers are hidden
    /// until the marker settle delay has passed.
    pub fn press_category(&mut self, category: UiCategory, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }

        self.raw_category = if self.raw_category == Some(category) {
            None
        } else {
            Some(category)
        };
        debug!(
            "[ExploreSession] {} filter: {}",
            category.as_key(),
            if self.raw_category.is_some() { "ON" } else { "OFF" }
        );

        self.updating_markers = true;
        self.marker_timer.start(now, self.config.marker_settle());
        self.apply_inputs(now)
    }

    pub fn selected_category(&self) -> Option<UiCategory> {
        self.raw_category
    }

    pub fn search_query(&self) -> &str {
        &self.raw_query
    }

    /// Settle debounced inputs and timers that are due at `now`.
    ///
    /// A due map-ready fit moves [`region`](Self::region). Returns `true` if
    /// the filtered or mappable results changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }

        if self.marker_timer.fire(now) {
            self.updating_markers = false;
        }
        if self.fit_timer.fire(now) {
            self.fit_all();
        }

        let category_changed = self.category.poll(now);
        let query_changed = self.query.poll(now);
        if category_changed || query_changed {
            self.recompute()
        } else {
            false
        }
    }

    /// The earliest time at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.category.deadline(),
            self.query.deadline(),
            self.marker_timer.deadline(),
            self.fit_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn apply_inputs(&mut self, now: Instant) -> bool {
        // Debounce only while some filter is active, so returning to the
        // unfiltered view is instant.
        let filtering = self.raw_category.is_some() || !self.raw_query.is_empty();
        let (category_delay, search_delay) = if filtering {
            (self.config.category_debounce(), self.config.search_debounce())
        } else {
            (Duration::ZERO, Duration::ZERO)
        };

        let mut settled = self.category.set_delay(category_delay, now);
        settled |= self.query.set_delay(search_delay, now);
        settled |= self.category.set(self.raw_category, now);
        settled |= self.query.set(self.raw_query.clone(), now);

        if settled {
            self.recompute()
        } else {
            false
        }
    }

    // ========================================================================
    // Results
    // ========================================================================

    fn recompute(&mut self) -> bool {
        let category = self.category.get().map(UiCategory::as_key);
        let query = self.query.get().clone();

        let filtered = self
            .engine
            .compute_filtered(&self.activities, category, &query);
        let mappable = self.engine.compute_mappable(&filtered, category, &query);

        let changed =
            !Arc::ptr_eq(&filtered, &self.filtered) || !Arc::ptr_eq(&mappable, &self.mappable);
        self.filtered = filtered;
        self.mappable = mappable;
        changed
    }

    /// Activities matching the settled criteria, in source order.
    pub fn filtered(&self) -> &Arc<Vec<Activity>> {
        &self.filtered
    }

    /// The subset of [`filtered`](Self::filtered) with valid coordinates.
    pub fn mappable(&self) -> &Arc<Vec<Activity>> {
        &self.mappable
    }

    /// Map pins for the mappable activities; empty while markers are updating.
    pub fn markers(&self) -> Vec<Marker> {
        if self.updating_markers {
            return Vec::new();
        }

        let category_key = self
            .category
            .get()
            .map(UiCategory::as_key)
            .unwrap_or("all");

        self.mappable
            .iter()
            .filter_map(|activity| {
                let position = activity.coordinate()?;
                Some(Marker {
                    key: format!("{}-{}", activity.id, category_key),
                    activity_id: activity.id,
                    latitude: position.latitude,
                    longitude: position.longitude,
                    title: activity
                        .name
                        .clone()
                        .unwrap_or_else(|| "Unknown Activity".to_string()),
                    subtitle: format!(
                        "{} • ${}-${}",
                        activity.category.as_deref().unwrap_or("Uncategorized"),
                        activity.price_min.unwrap_or(0.0),
                        activity.price_max.unwrap_or(0.0)
                    ),
                    color: category_color(activity.category.as_deref()).to_string(),
                })
            })
            .collect()
    }

    pub fn is_updating_markers(&self) -> bool {
        self.updating_markers
    }

    // ========================================================================
    // View and map
    // ========================================================================

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// The region the map should currently show.
    pub fn region(&self) -> MapRegion {
        self.region
    }

    /// Record a region change made by the user panning or zooming.
    ///
    /// Regions with a non-finite component are ignored.
    pub fn set_region(&mut self, region: MapRegion) {
        if !region.is_finite() {
            warn!("[ExploreSession] Ignoring invalid region {:?}", region);
            return;
        }
        self.region = region;
    }

    /// The map finished loading at time `now`.
    ///
    /// If anything is mappable, schedules a fit to all markers after the
    /// map-ready delay; the fit happens in [`tick`](Self::tick). Returns
    /// whether a fit was scheduled.
    pub fn map_ready(&mut self, now: Instant) -> bool {
        if !self.mounted || self.mappable.is_empty() {
            return false;
        }
        debug!("[ExploreSession] Map ready, fitting {} markers", self.mappable.len());
        self.fit_timer.start(now, self.config.map_ready_fit());
        true
    }

    /// Open the detail sheet for `activity`.
    ///
    /// In map mode, an activity with a valid position also moves the map to a
    /// tight region around it; that region is returned for animation.
    pub fn select_activity(&mut self, activity: Activity) -> Option<MapRegion> {
        let focus = match self.view_mode {
            ViewMode::Map => focus_region(&activity, self.config.focus_span),
            ViewMode::List => None,
        };
        self.sheet.open(activity);

        if let Some(region) = focus {
            self.region = region;
        }
        focus
    }

    pub fn close_sheet(&mut self) {
        self.sheet.close();
    }

    pub fn sheet(&self) -> &ActivitySheet {
        &self.sheet
    }

    /// Move the map to frame every mappable activity.
    ///
    /// Returns the new region, or `None` (map untouched) if nothing is mappable.
    pub fn fit_all(&mut self) -> Option<MapRegion> {
        let region = fit_activities(&self.mappable, &self.config)?;
        self.region = region;
        Some(region)
    }

    /// Whether the "fit all" control should be offered.
    pub fn can_fit_all(&self) -> bool {
        !self.updating_markers && self.mappable.len() > 1
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Tear down: cancel every pending update and drop the caches.
    ///
    /// After this, inputs and ticks are ignored.
    pub fn unmount(&mut self) {
        self.category.cancel();
        self.query.cancel();
        self.marker_timer.cancel();
        self.fit_timer.cancel();
        self.engine.clear();
        self.mounted = false;
        debug!("[ExploreSession] Unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    /// Session statistics.
    pub fn stats(&self) -> ExploreStats {
        ExploreStats {
            activity_count: self.activities.len() as u32,
            filtered_count: self.filtered.len() as u32,
            mappable_count: self.mappable.len() as u32,
            filter: self.engine.stats(),
        }
    }
}

impl Default for ExploreSession {
    fn default() -> Self {
        Self::new(ExploreConfig::default())
    }
}

impl Drop for ExploreSession {
    fn drop(&mut self) {
        if self.mounted {
            self.unmount();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
