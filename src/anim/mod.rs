// Attack animation scheduler
//
// Every valid attack becomes one AnimatedElement with a fixed timeline:
//
//   0 ──── draw ────▶ Drawing   (line head travels source -> destination)
//   draw ── fade ───▶ FadingOut (line opacity decays to 0)
//   draw + fade ────▶ Terminal  (element is dropped)
//
// Markers: the source marker grows during the first `marker_grow`, the
// destination marker grows starting at `destination_delay`; both shrink
// to 0 over the fade phase starting at `marker_shrink_delay`.
//
// Phases are pure functions of elapsed time, so the scheduler is driven
// by `advance(now)` on each frame tick and tests can jump to any instant.

use crate::app::config::{AnimationConfig, ProjectionConfig, DRAWN_OPACITY, MARKER_RADIUS};
use crate::feed::AttackEvent;
use crate::geo::{project, PlotPoint, Viewport};
use crate::stats::UNKNOWN_GROUP;
use std::time::{Duration, Instant};

/// Lifecycle stage of an animated element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Drawing,
    FadingOut,
    Terminal,
}

impl Phase {
    /// Phase reached after `elapsed` time on the given timeline
    pub fn at(elapsed: Duration, config: &AnimationConfig) -> Phase {
        if elapsed < config.draw {
            Phase::Drawing
        } else if elapsed < config.lifetime() {
            Phase::FadingOut
        } else {
            Phase::Terminal
        }
    }
}

/// One in-flight attack visualization
#[derive(Debug, Clone)]
pub struct AnimatedElement {
    #[allow(dead_code)]
    pub id: u64,
    pub start: PlotPoint,
    pub end: PlotPoint,
    pub created_at: Instant,
    pub phase: Phase,
    pub attack_type: String,
    pub src_label: String,
    pub dst_label: String,
    /// (lon, lat) of both endpoints, kept for re-projection on resize
    src_geo: (f64, f64),
    dst_geo: (f64, f64),
}

/// Render state of an element at a given instant
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFrame {
    pub phase: Phase,
    pub start: PlotPoint,
    /// Current end of the visible line
    pub head: PlotPoint,
    pub end: PlotPoint,
    /// Line opacity (0.0 ~ 1.0)
    pub opacity: f64,
    pub source_radius: f64,
    pub destination_radius: f64,
}

impl AnimatedElement {
    pub fn frame_at(&self, now: Instant, config: &AnimationConfig) -> ElementFrame {
        let elapsed = now.saturating_duration_since(self.created_at);
        let phase = Phase::at(elapsed, config);

        let (head, opacity) = match phase {
            Phase::Drawing => (
                self.start.lerp(self.end, ratio(elapsed, config.draw)),
                DRAWN_OPACITY,
            ),
            Phase::FadingOut => (
                self.end,
                DRAWN_OPACITY * (1.0 - ratio(elapsed - config.draw, config.fade)),
            ),
            Phase::Terminal => (self.end, 0.0),
        };

        ElementFrame {
            phase,
            start: self.start,
            head,
            end: self.end,
            opacity,
            source_radius: marker_radius(elapsed, Duration::ZERO, config),
            destination_radius: marker_radius(elapsed, config.destination_delay, config),
        }
    }
}

/// part / whole clamped to 0.0 ~ 1.0; a zero-length span counts as done
fn ratio(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        return 1.0;
    }
    (part.as_secs_f64() / whole.as_secs_f64()).clamp(0.0, 1.0)
}

fn marker_radius(elapsed: Duration, appear: Duration, config: &AnimationConfig) -> f64 {
    if elapsed < appear {
        return 0.0;
    }
    let grown = MARKER_RADIUS * ratio(elapsed - appear, config.marker_grow);
    if elapsed < config.marker_shrink_delay {
        return grown;
    }
    grown * (1.0 - ratio(elapsed - config.marker_shrink_delay, config.fade))
}

/// Owns every live AnimatedElement
pub struct AnimationScheduler {
    config: AnimationConfig,
    projection: ProjectionConfig,
    viewport: Viewport,
    elements: Vec<AnimatedElement>,
    next_id: u64,
}

impl AnimationScheduler {
    pub fn new(config: AnimationConfig, projection: ProjectionConfig) -> Self {
        Self {
            config,
            projection,
            viewport: Viewport::default(),
            elements: Vec::new(),
            next_id: 0,
        }
    }

    /// Start animating one attack
    ///
    /// Returns the element id, or `None` when either endpoint cannot be
    /// projected (no partial element is created).
    pub fn spawn(&mut self, event: &AttackEvent, now: Instant) -> Option<u64> {
        let start = project(event.src.lon, event.src.lat, self.viewport, &self.projection);
        let end = project(event.dst.lon, event.dst.lat, self.viewport, &self.projection);
        let (Some(start), Some(end)) = (start, end) else {
            tracing::debug!(id = %event.id, "skipping attack outside projection domain");
            return None;
        };

        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(AnimatedElement {
            id,
            start,
            end,
            created_at: now,
            phase: Phase::Drawing,
            attack_type: event
                .attack_type
                .clone()
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
            src_label: event.src.place(),
            dst_label: event.dst.place(),
            src_geo: (event.src.lon, event.src.lat),
            dst_geo: (event.dst.lon, event.dst.lat),
        });
        Some(id)
    }

    /// Spawn an element per event; returns how many were created
    pub fn spawn_batch(&mut self, events: &[AttackEvent], now: Instant) -> usize {
        events
            .iter()
            .filter(|event| self.spawn(event, now).is_some())
            .count()
    }

    /// Move every element to its phase at `now` and drop terminal ones
    ///
    /// Returns the number of elements released.
    pub fn advance(&mut self, now: Instant) -> usize {
        let before = self.elements.len();
        for element in &mut self.elements {
            element.phase = Phase::at(now.saturating_duration_since(element.created_at), &self.config);
        }
        self.elements.retain(|element| element.phase != Phase::Terminal);
        before - self.elements.len()
    }

    /// Adopt a new viewport and re-project all live elements
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for element in &mut self.elements {
            let (src_lon, src_lat) = element.src_geo;
            let (dst_lon, dst_lat) = element.dst_geo;
            if let (Some(start), Some(end)) = (
                project(src_lon, src_lat, viewport, &self.projection),
                project(dst_lon, dst_lat, viewport, &self.projection),
            ) {
                element.start = start;
                element.end = end;
            }
        }
    }

    /// Release every element immediately, without finishing timelines
    pub fn dispose(&mut self) {
        if !self.elements.is_empty() {
            tracing::debug!(released = self.elements.len(), "disposing animations");
        }
        self.elements.clear();
    }

    #[allow(dead_code)]
    pub fn active(&self) -> &[AnimatedElement] {
        &self.elements
    }

    /// Render state of every live element at `now`
    pub fn frames(&self, now: Instant) -> impl Iterator<Item = (&AnimatedElement, ElementFrame)> + '_ {
        self.elements
            .iter()
            .map(move |element| (element, element.frame_at(now, &self.config)))
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }
}
