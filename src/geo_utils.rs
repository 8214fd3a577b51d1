//! # Geographic Utilities
//!
//! Coordinate validation and map viewport computation for the explore map.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`has_valid_coordinates`] | Whether an activity can be placed on the map |
//! | [`compute_bounds`] | Bounding box of a set of coordinates |
//! | [`fit_region`] | Region framing every coordinate, with padding |
//! | [`focus_region`] | Tight region centered on one activity |
//!
//! ## Example
//!
//! ```rust
//! use outabt_core::{Coordinate, geo_utils};
//!
//! let points = vec![
//!     Coordinate::new(39.95, -75.16),
//!     Coordinate::new(40.05, -75.06),
//! ];
//!
//! let region = geo_utils::fit_region(&points).unwrap();
//! assert!((region.latitude - 40.0).abs() < 1e-9);
//! assert!((region.latitude_delta - 0.12).abs() < 1e-9);
//! ```
//!
//! All functions are pure; moving the map to a computed region is up to the
//! caller.

use geo::{BoundingRect, MultiPoint, Point};

use crate::{Activity, Bounds, Coordinate, ExploreConfig, MapRegion};

/// Whether the activity has a renderable position.
///
/// Both coordinates must be present, finite and inside ±90 / ±180.
/// Malformed values are treated as "no position", never as an error.
#[inline]
pub fn has_valid_coordinates(activity: &Activity) -> bool {
    activity.coordinate().is_some()
}

/// Compute the bounding box of a set of coordinates.
///
/// Returns `None` for an empty slice.
pub fn compute_bounds(points: &[Coordinate]) -> Option<Bounds> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();

    multi.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

/// Region framing all points, using the default padding and span floor.
pub fn fit_region(points: &[Coordinate]) -> Option<MapRegion> {
    fit_region_with_config(points, &ExploreConfig::default())
}

/// Region framing all points.
///
/// - No points: `None` (leave the map where it is).
/// - One point: centered on it with `focus_span` on both axes.
/// - Otherwise: bounding-box midpoint, each span = extent × `fit_padding`,
///   floored at `min_span` so coincident points don't over-zoom.
pub fn fit_region_with_config(points: &[Coordinate], config: &ExploreConfig) -> Option<MapRegion> {
    if let [only] = points {
        return Some(MapRegion::centered(*only, config.focus_span));
    }

    let bounds = compute_bounds(points)?;
    let center = bounds.center();

    Some(MapRegion {
        latitude: center.latitude,
        longitude: center.longitude,
        latitude_delta: (bounds.lat_span() * config.fit_padding).max(config.min_span),
        longitude_delta: (bounds.lng_span() * config.fit_padding).max(config.min_span),
    })
}

/// Region framing every activity with a valid position; invalid ones are skipped.
pub fn fit_activities(activities: &[Activity], config: &ExploreConfig) -> Option<MapRegion> {
    let points: Vec<Coordinate> = activities.iter().filter_map(Activity::coordinate).collect();
    fit_region_with_config(&points, config)
}

/// Tight region centered on a single activity, or `None` if it has no position.
pub fn focus_region(activity: &Activity, span: f64) -> Option<MapRegion> {
    activity
        .coordinate()
        .map(|center| MapRegion::centered(center, span))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_has_valid_coordinates() {
        let base = Activity::new(1, "Spot", "nightlife");
        assert!(!has_valid_coordinates(&base));
        assert!(has_valid_coordinates(&base.clone().with_coordinates(39.95, -75.16)));
        assert!(has_valid_coordinates(&base.clone().with_coordinates(-90.0, 180.0)));
        assert!(!has_valid_coordinates(&base.clone().with_coordinates(f64::NAN, -75.16)));
        assert!(!has_valid_coordinates(&base.clone().with_coordinates(39.95, 181.0)));
        assert!(!has_valid_coordinates(&base.with_coordinates(-91.0, 0.0)));
    }

    #[test]
    fn test_compute_bounds() {
        let points = vec![
            Coordinate::new(40.0, -75.0),
            Coordinate::new(39.0, -74.0),
            Coordinate::new(39.5, -76.0),
        ];
        let bounds = compute_bounds(&points).unwrap();
        assert_eq!(bounds.min_lat, 39.0);
        assert_eq!(bounds.max_lat, 40.0);
        assert_eq!(bounds.min_lng, -76.0);
        assert_eq!(bounds.max_lng, -74.0);

        assert!(compute_bounds(&[]).is_none());
    }

    #[test]
    fn test_fit_two_points() {
        let points = vec![Coordinate::new(39.95, -75.16), Coordinate::new(40.05, -75.06)];
        let region = fit_region(&points).unwrap();

        assert!((region.latitude - 40.00).abs() < EPS);
        assert!((region.longitude - -75.11).abs() < EPS);
        assert!((region.latitude_delta - 0.12).abs() < EPS);
        assert!((region.longitude_delta - 0.12).abs() < EPS);
    }

    #[test]
    fn test_fit_single_point() {
        let region = fit_region(&[Coordinate::new(39.9526, -75.1652)]).unwrap();
        assert_eq!(region.latitude, 39.9526);
        assert_eq!(region.longitude, -75.1652);
        assert_eq!(region.latitude_delta, 0.01);
        assert_eq!(region.longitude_delta, 0.01);
    }

    #[test]
    fn test_fit_coincident_points_floors_span() {
        let p = Coordinate::new(39.9526, -75.1652);
        let region = fit_region(&[p, p, p]).unwrap();
        assert_eq!(region.latitude_delta, 0.01);
        assert_eq!(region.longitude_delta, 0.01);
        assert!((region.latitude - p.latitude).abs() < EPS);
    }

    #[test]
    fn test_fit_empty_is_noop() {
        assert!(fit_region(&[]).is_none());
    }

    #[test]
    fn test_fit_activities_skips_invalid() {
        let activities = vec![
            Activity::new(1, "A", "nightlife").with_coordinates(39.95, -75.16),
            Activity::new(2, "B", "nightlife").with_coordinates(400.0, -75.16),
            Activity::new(3, "C", "nightlife"),
        ];
        let region = fit_activities(&activities, &ExploreConfig::default()).unwrap();
        assert_eq!(region.latitude, 39.95);
        assert_eq!(region.latitude_delta, 0.01);
    }

    #[test]
    fn test_focus_region() {
        let activity = Activity::new(1, "A", "nightlife").with_coordinates(39.95, -75.16);
        let region = focus_region(&activity, 0.01).unwrap();
        assert_eq!(region.center(), Coordinate::new(39.95, -75.16));
        assert_eq!(region.latitude_delta, 0.01);

        assert!(focus_region(&Activity::new(2, "B", "nightlife"), 0.01).is_none());
    }
}
