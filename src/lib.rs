//! # out&abt core
//!
//! Activity filtering, caching and map fitting for the out&abt explore screen.
//!
//! This library provides:
//! - Category and free-text filtering of activity records
//! - Bounded memoization of filtered and mappable result sets
//! - Debounced filter inputs driven by a caller-supplied clock
//! - Coordinate validation and map viewport fitting
//! - A thin client for the hosted activities backend
//!
//! ## Features
//!
//! - **`http`** - Enable HTTP client for the activities backend
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use outabt_core::{Activity, FilterEngine};
//!
//! let activities = vec![
//!     Activity::new(1, "Reading Terminal Market", "eat & drink")
//!         .with_coordinates(39.9533, -75.1593),
//!     Activity::new(2, "Franklin Institute", "tour & learn"),
//! ];
//!
//! let mut engine = FilterEngine::default();
//! let filtered = engine.compute_filtered(&activities, Some("eat"), "");
//! let mappable = engine.compute_mappable(&filtered, Some("eat"), "");
//!
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(mappable.len(), 1);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OutAbtError, Result};

// Insertion-ordered bounded cache
pub mod bounded_cache;
pub use bounded_cache::BoundedCache;

// UI category keys, stored category whitelist and colours
pub mod category;
pub use category::{category_color, matches_category, UiCategory, VALID_CATEGORIES};

// Geographic utilities (coordinate validation, bounds, viewport fitting)
pub mod geo_utils;
pub use geo_utils::{fit_region, focus_region, has_valid_coordinates};

// Debounced values and cancellable timers
pub mod debounce;
pub use debounce::{Debounced, Timer};

// Filter/cache engine
pub mod filter;
pub use filter::{cache_key, mappable_cache_key, FilterEngine, FilterStats};

// Home feed filtering
pub mod feed;
pub use feed::{feed_results, feed_section};

// Activity detail sheet state
pub mod sheet;
pub use sheet::ActivitySheet;

// Explore screen session (owns caches and debouncers)
pub mod explore;
pub use explore::{ExploreSession, ExploreStats, Marker, ViewMode};

// HTTP module for the activities backend
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{fetch_or_empty, public_image_url, ActivityClient, BackendConfig};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("OutAbtRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

/// Number of result sets each filter cache retains.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use outabt_core::Coordinate;
/// let point = Coordinate::new(39.9526, -75.1652); // Philadelphia
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

/// A map region: a center plus the visible span on each axis, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Region centered on `center` with the same span on both axes.
    pub fn centered(center: Coordinate, span: f64) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            latitude_delta: span,
            longitude_delta: span,
        }
    }

    /// The region the explore map opens on (central Philadelphia).
    pub fn initial() -> Self {
        Self {
            latitude: 39.9526,
            longitude: -75.1652,
            latitude_delta: 0.0922,
            longitude_delta: 0.0421,
        }
    }

    /// Center of the region.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::initial()
    }
}

/// A discoverable place or event, as stored in the activities table.
///
/// Numeric columns are parsed leniently: the stored schema has held prices as
/// text and coordinates as nulls or strings, so anything that is not a number
/// (or a string holding one) becomes `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Activity {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub price_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub price_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub google_maps_link: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Storage path of the cover image, relative to the images bucket
    #[serde(default)]
    pub images: Option<String>,
    /// Public URL resolved from `images` by the backend client
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
}

impl Activity {
    /// Create an activity with a name and stored category; all other fields empty.
    pub fn new(id: i64, name: &str, category: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            description: None,
            address: None,
            price_min: None,
            price_max: None,
            rating: None,
            latitude: None,
            longitude: None,
            postal_code: None,
            google_maps_link: None,
            link: None,
            images: None,
            image_url: None,
            created_at: None,
            activity_type: None,
        }
    }

    /// Builder: set latitude and longitude.
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Builder: set the street address.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// The activity's position, if it has a valid one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)).filter(Coordinate::is_valid),
            _ => None,
        }
    }

    /// Price shown on cards: a range, a starting price, or "Free".
    pub fn price_label(&self) -> String {
        let positive = |p: Option<f64>| p.filter(|v| *v > 0.0);
        match (positive(self.price_min), positive(self.price_max)) {
            (Some(min), Some(max)) => format!("${}–${}", min, max),
            (Some(min), None) => format!("From ${}", min),
            _ => "Free".to_string(),
        }
    }

    /// Copy with invalid coordinates cleared, so downstream code can treat
    /// "present" as "valid".
    pub fn sanitized(&self) -> Self {
        let mut cleaned = self.clone();
        if self.coordinate().is_none() {
            cleaned.latitude = None;
            cleaned.longitude = None;
        }
        cleaned
    }
}

/// Tuning for an explore session.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ExploreConfig {
    /// Settle delay for category taps while a filter is active.
    /// Default: 300 ms
    pub category_debounce_ms: u64,

    /// Settle delay for search keystrokes while a filter is active.
    /// Default: 500 ms
    pub search_debounce_ms: u64,

    /// How long the "updating markers" indicator stays up after a category tap.
    /// Default: 500 ms
    pub marker_settle_ms: u64,

    /// Result sets retained per cache.
    /// Default: 10
    pub cache_capacity: u32,

    /// Multiplier applied to the bounding box when fitting all markers.
    /// Default: 1.2 (20% padding)
    pub fit_padding: f64,

    /// Smallest span the fitter will produce, in degrees.
    /// Default: 0.01
    pub min_span: f64,

    /// Span used when zooming to a single activity, in degrees.
    /// Default: 0.01
    pub focus_span: f64,

    /// Delay between the map becoming ready and the initial fit to all markers.
    /// Default: 500 ms
    pub map_ready_fit_ms: u64,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            category_debounce_ms: 300,
            search_debounce_ms: 500,
            marker_settle_ms: 500,
            cache_capacity: DEFAULT_CACHE_CAPACITY as u32,
            fit_padding: 1.2,
            min_span: 0.01,
            focus_span: 0.01,
            map_ready_fit_ms: 500,
        }
    }
}

impl ExploreConfig {
    pub fn category_debounce(&self) -> Duration {
        Duration::from_millis(self.category_debounce_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn marker_settle(&self) -> Duration {
        Duration::from_millis(self.marker_settle_ms)
    }

    pub fn map_ready_fit(&self) -> Duration {
        Duration::from_millis(self.map_ready_fit_ms)
    }
}

/// Serde helpers for the duck-typed numeric columns.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(crate) fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(39.9526, -75.1652).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_activity_row_lenient_numbers() {
        let json = r#"{
            "id": 7,
            "name": "Night Market",
            "category": "Eat & Drink",
            "price_min": "12",
            "price_max": 30,
            "rating": null,
            "latitude": "39.95",
            "longitude": -75.16,
            "type": "event",
            "unknown_column": true
        }"#;

        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id, 7);
        assert_eq!(activity.price_min, Some(12.0));
        assert_eq!(activity.price_max, Some(30.0));
        assert_eq!(activity.rating, None);
        assert_eq!(activity.latitude, Some(39.95));
        assert_eq!(activity.activity_type.as_deref(), Some("event"));
        assert!(activity.description.is_none());
    }

    #[test]
    fn test_activity_row_garbage_numbers() {
        let json = r#"{"id": 1, "price_min": "free", "latitude": {"x": 1}}"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.price_min, None);
        assert_eq!(activity.latitude, None);
    }

    #[test]
    fn test_sanitized_clears_invalid_coordinates() {
        let bad = Activity::new(1, "Somewhere", "nightlife").with_coordinates(120.0, 10.0);
        let cleaned = bad.sanitized();
        assert_eq!(cleaned.latitude, None);
        assert_eq!(cleaned.longitude, None);

        let good = Activity::new(2, "Elsewhere", "nightlife").with_coordinates(40.0, -75.0);
        assert_eq!(good.sanitized(), good);
    }

    #[test]
    fn test_price_label() {
        let mut activity = Activity::new(1, "Tasting", "eat & drink");
        assert_eq!(activity.price_label(), "Free");

        activity.price_min = Some(12.0);
        assert_eq!(activity.price_label(), "From $12");

        activity.price_max = Some(30.5);
        assert_eq!(activity.price_label(), "$12–$30.5");

        activity.price_min = Some(0.0);
        assert_eq!(activity.price_label(), "Free");
    }

    #[test]
    fn test_region_finiteness() {
        assert!(MapRegion::initial().is_finite());

        let mut region = MapRegion::initial();
        region.longitude_delta = f64::NAN;
        assert!(!region.is_finite());
    }

    #[test]
    fn test_half_coordinate_is_not_a_position() {
        let mut activity = Activity::new(1, "Half", "nightlife");
        activity.latitude = Some(40.0);
        assert!(activity.coordinate().is_none());
    }
}
