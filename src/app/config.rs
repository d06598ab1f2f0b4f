// Application configuration types
//
// This module contains configuration structs and constants for:
// - The feed connection (endpoint, reconnection, buffer size)
// - Animation timelines
// - Map projection
// - Refresh intervals and map toggles

use std::time::{Duration, Instant};

// ============================================================================
// Constants
// ============================================================================

/// Minimum frame interval in milliseconds
pub const MIN_REFRESH_MS: u64 = 16;

/// Maximum frame interval in milliseconds
pub const MAX_REFRESH_MS: u64 = 500;

/// Frame interval adjustment step in milliseconds
pub const REFRESH_STEP: u64 = 16;

/// Default frame interval (~30 fps keeps line drawing smooth)
pub const DEFAULT_REFRESH_MS: u64 = 33;

/// Duration to highlight recently changed refresh intervals
pub const CHANGE_HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);

/// Pulse step for the live indicator, applied once per tick
pub const PULSE_STEP: f32 = 0.05;

/// Default delay before a reconnection attempt
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Default number of reconnection attempts before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Default rolling buffer capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Default projection scale factor (scale = min(width, height) * factor)
pub const DEFAULT_SCALE_FACTOR: f64 = 0.15;

/// Viewport published before the map area has been measured
/// (width, height) in plot units
pub const FALLBACK_VIEWPORT: (f64, f64) = (1200.0, 800.0);

/// Radius that endpoint markers grow to, in plot units
pub const MARKER_RADIUS: f64 = 3.0;

/// Line opacity at the end of the drawing phase
pub const DRAWN_OPACITY: f64 = 1.0;

/// Number of buffered events listed in the live feed panel
pub const LIVE_FEED_ROWS: usize = 50;

/// Number of groups listed per ranking in the stats panel
pub const TOP_GROUPS: usize = 8;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Connection and ingestion settings for the attack feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// WebSocket endpoint (`ws://` or `wss://`); `None` surfaces as an error
    pub endpoint: Option<String>,

    /// Delay between a disconnect and the next connection attempt
    pub reconnect_delay: Duration,

    /// Attempts allowed before the connection is considered exhausted
    pub max_retries: u32,

    /// Rolling buffer capacity (always at least 1)
    pub buffer_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Timeline of a single animated attack
///
/// All offsets are measured from the moment the element is created.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Duration of the line drawing phase
    pub draw: Duration,

    /// Duration of the fade-out phase that follows drawing
    pub fade: Duration,

    /// Time for a marker to grow from radius 0 to full size
    pub marker_grow: Duration,

    /// Offset at which both markers start shrinking back to 0
    pub marker_shrink_delay: Duration,

    /// Offset at which the destination marker appears
    pub destination_delay: Duration,
}

impl AnimationConfig {
    /// Build a timeline from the two phase durations, deriving marker offsets
    ///
    /// Markers shrink over the fade phase and the destination marker
    /// finishes growing exactly when the line reaches it.
    pub fn with_durations(draw: Duration, fade: Duration) -> Self {
        let marker_grow = Duration::from_millis(500).min(draw);
        Self {
            draw,
            fade,
            marker_grow,
            marker_shrink_delay: draw,
            destination_delay: draw.saturating_sub(marker_grow),
        }
    }

    /// Total lifetime of an element
    pub fn lifetime(&self) -> Duration {
        self.draw + self.fade
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::with_durations(Duration::from_millis(2000), Duration::from_millis(3000))
    }
}

/// Projection settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Scale relative to the smaller viewport dimension
    pub scale_factor: f64,
}

impl ProjectionConfig {
    pub fn new(scale_factor: f64) -> Self {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            DEFAULT_SCALE_FACTOR
        };
        Self { scale_factor }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE_FACTOR)
    }
}

/// Visual toggles for the attack map
#[derive(Debug, Clone)]
pub struct MapSettings {
    /// Animate incoming attacks (toggle with 'a' key)
    pub animations_enabled: bool,

    /// Show country/city captions on markers (toggle with 't' key)
    pub labels_enabled: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            labels_enabled: true,
        }
    }
}

/// Configuration for the frame interval
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Frame interval in milliseconds (16-500ms)
    pub refresh_ms: u64,

    /// Timestamp of last interval change (for visual feedback)
    pub last_change: Option<Instant>,
}

impl RefreshConfig {
    /// Create a new RefreshConfig with default values
    pub fn new() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
            last_change: None,
        }
    }

    /// Get frame interval as Duration
    pub fn ui_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything needed to build an [`AppState`](super::AppState)
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub animation: AnimationConfig,
    pub projection: ProjectionConfig,
}
