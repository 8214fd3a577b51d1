//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose the explore session,
//! the pure helpers and the backend fetch to Kotlin and Swift. Free functions
//! are prefixed with `ffi_` where they would clash with the internal API.
//!
//! Each explore screen creates its own [`ExploreHandle`] and drops it on
//! unmount, so caches and pending timers live exactly as long as the screen.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use log::{info, warn};
use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

use crate::explore::{ExploreStats, Marker};
use crate::http::{fetch_or_empty, public_image_url, ActivityClient, BackendConfig};
use crate::{
    category_color, fit_region, init_logging, matches_category, Activity, Coordinate,
    ExploreConfig, ExploreSession, MapRegion, UiCategory, ViewMode,
};

/// Runtime shared by all blocking fetch wrappers.
static RUNTIME: Lazy<std::result::Result<Runtime, String>> =
    Lazy::new(|| Runtime::new().map_err(|e| format!("Failed to create tokio runtime: {}", e)));

// ============================================================================
// Explore Session Handle
// ============================================================================

/// One explore screen's session, owned by the mobile side.
#[derive(uniffi::Object)]
pub struct ExploreHandle {
    session: Mutex<ExploreSession>,
}

impl ExploreHandle {
    fn session(&self) -> MutexGuard<'_, ExploreSession> {
        // A panic mid-update leaves plain data behind; keep serving it.
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[uniffi::export]
impl ExploreHandle {
    /// Create a session; `None` uses the default configuration.
    #[uniffi::constructor]
    pub fn new(config: Option<ExploreConfig>) -> Arc<Self> {
        init_logging();
        info!("[ExploreHandle] Created");
        Arc::new(Self {
            session: Mutex::new(ExploreSession::new(config.unwrap_or_default())),
        })
    }

    pub fn begin_loading(&self) {
        self.session().begin_loading();
    }

    /// Hand over activities fetched by the app.
    pub fn load(&self, activities: Vec<Activity>) {
        self.session().load(Ok(activities));
    }

    /// Report a failed fetch; the session shows an empty list.
    pub fn load_failed(&self, message: String) {
        self.session().load(Err(crate::OutAbtError::Http {
            message,
            status_code: None,
        }));
    }

    /// Fetch from the backend and load the result. Blocks the calling thread.
    pub fn fetch_and_load(&self, url: String, anon_key: String) {
        self.session().begin_loading();
        let activities = ffi_fetch_activities(url, anon_key);
        self.session().load(Ok(activities));
    }

    pub fn is_loading(&self) -> bool {
        self.session().is_loading()
    }

    /// Returns true if results changed immediately.
    pub fn set_search_query(&self, query: String) -> bool {
        self.session().set_search_query(&query, Instant::now())
    }

    /// Returns true if results changed immediately.
    pub fn press_category(&self, category: UiCategory) -> bool {
        self.session().press_category(category, Instant::now())
    }

    pub fn selected_category(&self) -> Option<UiCategory> {
        self.session().selected_category()
    }

    /// Settle due inputs; returns true if results changed.
    pub fn tick(&self) -> bool {
        self.session().tick(Instant::now())
    }

    /// Milliseconds until `tick` next has work, or `None` if nothing is pending.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let now = Instant::now();
        self.session()
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now).as_millis() as u64)
    }

    pub fn filtered(&self) -> Vec<Activity> {
        self.session().filtered().to_vec()
    }

    pub fn mappable(&self) -> Vec<Activity> {
        self.session().mappable().to_vec()
    }

    /// Filtered activities as JSON, for list rendering without record conversion.
    pub fn filtered_json(&self) -> String {
        serde_json::to_string(self.session().filtered().as_slice())
            .unwrap_or_else(|_| "[]".to_string())
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.session().markers()
    }

    pub fn is_updating_markers(&self) -> bool {
        self.session().is_updating_markers()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.session().view_mode()
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.session().set_view_mode(mode);
    }

    pub fn region(&self) -> MapRegion {
        self.session().region()
    }

    pub fn set_region(&self, region: MapRegion) {
        self.session().set_region(region);
    }

    /// Open the sheet; returns the region to animate to, if any.
    pub fn select_activity(&self, activity: Activity) -> Option<MapRegion> {
        self.session().select_activity(activity)
    }

    pub fn close_sheet(&self) {
        self.session().close_sheet();
    }

    pub fn sheet_activity(&self) -> Option<Activity> {
        self.session().sheet().activity().cloned()
    }

    /// The map view finished loading; schedules the initial fit.
    pub fn map_ready(&self) -> bool {
        self.session().map_ready(Instant::now())
    }

    pub fn fit_all(&self) -> Option<MapRegion> {
        self.session().fit_all()
    }

    pub fn can_fit_all(&self) -> bool {
        self.session().can_fit_all()
    }

    pub fn stats(&self) -> ExploreStats {
        self.session().stats()
    }

    /// Cancel pending updates and drop caches. Call when the screen unmounts.
    pub fn unmount(&self) {
        self.session().unmount();
        info!("[ExploreHandle] Unmounted");
    }
}

// ============================================================================
// Pure Helpers
// ============================================================================

/// Region framing all points, or `None` for an empty list.
#[uniffi::export]
pub fn ffi_fit_region(points: Vec<Coordinate>) -> Option<MapRegion> {
    fit_region(&points)
}

#[uniffi::export]
pub fn ffi_matches_category(activity_category: Option<String>, selected: String) -> bool {
    matches_category(activity_category.as_deref(), &selected)
}

#[uniffi::export]
pub fn ffi_category_color(category: Option<String>) -> String {
    category_color(category.as_deref()).to_string()
}

#[uniffi::export]
pub fn ffi_public_image_url(url: String, anon_key: String, path: Option<String>) -> Option<String> {
    public_image_url(&BackendConfig::new(&url, &anon_key), path.as_deref())
}

// ============================================================================
// Backend Fetch
// ============================================================================

/// Fetch all activities, blocking. Any failure yields an empty list.
#[uniffi::export]
pub fn ffi_fetch_activities(url: String, anon_key: String) -> Vec<Activity> {
    init_logging();

    let runtime = match RUNTIME.as_ref() {
        Ok(rt) => rt,
        Err(e) => {
            warn!("{}", e);
            return Vec::new();
        }
    };

    let client = match ActivityClient::new(BackendConfig::new(&url, &anon_key)) {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to create activity client: {}", e);
            return Vec::new();
        }
    };

    runtime.block_on(fetch_or_empty(&client))
}
