// Geo projection and viewport tracking
//
// Maps (longitude, latitude) pairs onto the plot area of the attack map
// using the Equal Earth projection, centered on the viewport. Plot
// coordinates grow rightwards and downwards like screen coordinates.

use crate::app::config::{ProjectionConfig, FALLBACK_VIEWPORT};

// Equal Earth polynomial coefficients (Šavrič, Patterson & Jenny, 2018)
const A1: f64 = 1.340264;
const A2: f64 = -0.081106;
const A3: f64 = 0.000893;
const A4: f64 = 0.003796;

/// sqrt(3) / 2
const M: f64 = 0.866_025_403_784_438_6;

/// Size of the plot area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(FALLBACK_VIEWPORT.0, FALLBACK_VIEWPORT.1)
    }
}

/// A projected point in plot coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    /// Linear interpolation towards `other` (t is clamped to 0.0 ~ 1.0)
    pub fn lerp(self, other: PlotPoint, t: f64) -> PlotPoint {
        let t = t.clamp(0.0, 1.0);
        PlotPoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Project a geographic coordinate onto the viewport
///
/// Returns `None` when the coordinate is outside the projection domain
/// (non-finite, |lon| > 180 or |lat| > 90) or the viewport has no area.
pub fn project(
    lon: f64,
    lat: f64,
    viewport: Viewport,
    config: &ProjectionConfig,
) -> Option<PlotPoint> {
    if !lon.is_finite() || !lat.is_finite() || lon.abs() > 180.0 || lat.abs() > 90.0 {
        return None;
    }
    if !viewport.is_measurable() {
        return None;
    }

    let lambda = lon.to_radians();
    let theta = (M * lat.to_radians().sin()).asin();
    let l2 = theta * theta;
    let l6 = l2 * l2 * l2;

    let x = lambda * theta.cos() / (M * (A1 + 3.0 * A2 * l2 + l6 * (7.0 * A3 + 9.0 * A4 * l2)));
    let y = theta * (A1 + A2 * l2 + l6 * (A3 + A4 * l2));

    let scale = viewport.width.min(viewport.height) * config.scale_factor;
    Some(PlotPoint {
        x: viewport.width / 2.0 + x * scale,
        y: viewport.height / 2.0 - y * scale,
    })
}

/// Tracks the size of the map's drawing surface
///
/// Before the first measurement the fallback viewport is published.
/// Zero-sized measurements (e.g. a collapsed terminal pane) are ignored
/// so a zero viewport is never handed to the projector.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    current: Viewport,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently published viewport
    #[allow(dead_code)]
    pub fn current(&self) -> Viewport {
        self.current
    }

    /// Observe a surface size
    ///
    /// Returns the newly published viewport when it differs from the
    /// current one, `None` when nothing changed or the size was unusable.
    pub fn observe(&mut self, width: f64, height: f64) -> Option<Viewport> {
        let next = Viewport::new(width, height);
        if !next.is_measurable() || next == self.current {
            return None;
        }
        tracing::debug!(width, height, "viewport changed");
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(1200.0, 800.0)
    }

    #[test]
    fn test_origin_projects_to_center() {
        let p = project(0.0, 0.0, viewport(), &ProjectionConfig::default()).unwrap();
        assert!((p.x - 600.0).abs() < 1e-9);
        assert!((p.y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation() {
        let config = ProjectionConfig::default();
        let east = project(90.0, 0.0, viewport(), &config).unwrap();
        let north = project(0.0, 45.0, viewport(), &config).unwrap();
        assert!(east.x > 600.0);
        assert!(north.y < 400.0);
    }

    #[test]
    fn test_out_of_domain_is_none() {
        let config = ProjectionConfig::default();
        assert_eq!(project(181.0, 0.0, viewport(), &config), None);
        assert_eq!(project(0.0, -90.5, viewport(), &config), None);
        assert_eq!(project(f64::NAN, 0.0, viewport(), &config), None);
        assert_eq!(project(0.0, f64::INFINITY, viewport(), &config), None);
    }

    #[test]
    fn test_zero_viewport_is_none() {
        let config = ProjectionConfig::default();
        assert_eq!(project(0.0, 0.0, Viewport::new(0.0, 800.0), &config), None);
    }

    #[test]
    fn test_scale_follows_smaller_dimension() {
        let config = ProjectionConfig::default();
        let wide = project(180.0, 0.0, Viewport::new(2000.0, 400.0), &config).unwrap();
        let narrow = project(180.0, 0.0, Viewport::new(400.0, 400.0), &config).unwrap();
        // Same scale (min = 400), only the center differs
        assert!(((wide.x - 1000.0) - (narrow.x - 200.0)).abs() < 1e-9);
    }

    #[test]
    fn test_domain_edges_are_projectable() {
        let config = ProjectionConfig::default();
        for (lon, lat) in [(-180.0, 0.0), (180.0, 0.0), (0.0, 90.0), (0.0, -90.0)] {
            assert!(project(lon, lat, viewport(), &config).is_some());
        }
    }

    #[test]
    fn test_tracker_fallback_before_measurement() {
        let tracker = ViewportTracker::new();
        assert_eq!(tracker.current(), Viewport::new(1200.0, 800.0));
    }

    #[test]
    fn test_tracker_ignores_zero_size() {
        let mut tracker = ViewportTracker::new();
        assert_eq!(tracker.observe(0.0, 0.0), None);
        assert_eq!(tracker.observe(160.0, 0.0), None);
        assert_eq!(tracker.current(), Viewport::new(1200.0, 800.0));

        assert_eq!(tracker.observe(160.0, 96.0), Some(Viewport::new(160.0, 96.0)));
        assert_eq!(tracker.observe(0.0, 96.0), None);
        assert_eq!(tracker.current(), Viewport::new(160.0, 96.0));
    }

    #[test]
    fn test_tracker_publishes_only_changes() {
        let mut tracker = ViewportTracker::new();
        assert!(tracker.observe(100.0, 50.0).is_some());
        assert!(tracker.observe(100.0, 50.0).is_none());
        assert!(tracker.observe(120.0, 50.0).is_some());
    }

    #[test]
    fn test_lerp_clamps() {
        let a = PlotPoint { x: 0.0, y: 0.0 };
        let b = PlotPoint { x: 10.0, y: -10.0 };
        assert_eq!(a.lerp(b, 0.5), PlotPoint { x: 5.0, y: -5.0 });
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every in-domain coordinate lands inside the viewport and
        /// projecting twice gives the same point.
        #[test]
        fn prop_projection_inside_viewport(
            lon in -180.0f64..=180.0,
            lat in -90.0f64..=90.0,
            width in 10.0f64..4000.0,
            height in 10.0f64..4000.0,
        ) {
            let vp = Viewport::new(width, height);
            let config = ProjectionConfig::default();
            let p = project(lon, lat, vp, &config).unwrap();
            prop_assert!(p.x >= 0.0 && p.x <= width);
            prop_assert!(p.y >= 0.0 && p.y <= height);
            prop_assert_eq!(Some(p), project(lon, lat, vp, &config));
        }
    }
}
