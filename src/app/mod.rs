// Application state management
//
// This module contains the main AppState struct, which wires the feed
// connection to the attack map, and re-exports configuration types from
// the config submodule.

pub mod config;
pub mod event;

// Re-export config types for convenience
pub use config::{AppConfig, MapSettings, RefreshConfig, CHANGE_HIGHLIGHT_DURATION};

use crate::anim::AnimationScheduler;
use crate::feed::connection::{Connector, SessionId, TransportEvent};
use crate::feed::{AttackEvent, ConnectionManager, ConnectionState, FeedObserver};
use crate::geo::ViewportTracker;
use crate::stats::StatsSnapshot;
use chrono::{DateTime, Utc};
use config::PULSE_STEP;
use std::time::Instant;

/// Attack map state: live animations, the measured viewport and toggles
///
/// Receives accepted events from the feed and turns them into animated
/// elements while animations are enabled.
pub struct MapView {
    pub scheduler: AnimationScheduler,
    viewport: ViewportTracker,
    pub settings: MapSettings,
}

impl MapView {
    pub fn new(scheduler: AnimationScheduler) -> Self {
        Self {
            scheduler,
            viewport: ViewportTracker::new(),
            settings: MapSettings::default(),
        }
    }

    /// Report the measured size of the map surface
    pub fn observe_area(&mut self, width: f64, height: f64) {
        if let Some(viewport) = self.viewport.observe(width, height) {
            self.scheduler.set_viewport(viewport);
        }
    }

    /// Flip animations; turning them off clears whatever is on screen
    pub fn toggle_animations(&mut self) {
        self.settings.animations_enabled = !self.settings.animations_enabled;
        if !self.settings.animations_enabled {
            self.scheduler.dispose();
        }
    }

    pub fn toggle_labels(&mut self) {
        self.settings.labels_enabled = !self.settings.labels_enabled;
    }
}

impl FeedObserver for MapView {
    fn on_events(&mut self, events: &[AttackEvent], received_at: Instant) {
        if self.settings.animations_enabled {
            self.scheduler.spawn_batch(events, received_at);
        }
    }

    fn on_state_change(&mut self, state: ConnectionState, error: Option<&str>) {
        if state == ConnectionState::Exhausted {
            tracing::warn!(error = error.unwrap_or("unknown"), "feed is offline");
        }
    }
}

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// Feed connection, rolling buffer and statistics
    pub feed: ConnectionManager,

    /// Attack map animations and toggles
    pub map: MapView,

    /// Frame interval configuration
    pub refresh_config: RefreshConfig,

    /// Pulse phase for the live indicator (0.0 ~ 1.0)
    pub pulse_phase: f32,
}

impl AppState {
    /// Create a new AppState; nothing connects until [`AppState::start`]
    pub fn new(config: AppConfig, connector: Box<dyn Connector>) -> Self {
        let feed = ConnectionManager::new(config.feed, connector, Utc::now());
        let scheduler = AnimationScheduler::new(config.animation, config.projection);
        Self {
            running: true,
            feed,
            map: MapView::new(scheduler),
            refresh_config: RefreshConfig::new(),
            pulse_phase: 0.0,
        }
    }

    /// Open the feed connection
    pub fn start(&mut self) {
        self.feed.open(&mut self.map);
    }

    /// Reconnect on request, starting a fresh retry budget
    pub fn reconnect(&mut self) {
        tracing::info!(state = ?self.feed.state(), "manual reconnect requested");
        self.feed.open(&mut self.map);
    }

    /// Apply an event reported by the transport
    pub fn on_transport_event(
        &mut self,
        session: SessionId,
        event: TransportEvent,
        now: Instant,
        wall: DateTime<Utc>,
    ) {
        self.feed.handle(session, event, now, wall, &mut self.map);
    }

    /// Update state on each tick
    ///
    /// Fires a due reconnect, advances animation phases and the pulse.
    pub fn on_tick(&mut self, now: Instant) {
        self.feed.poll(now, &mut self.map);
        self.map.scheduler.advance(now);

        self.pulse_phase += PULSE_STEP;
        if self.pulse_phase >= 1.0 {
            self.pulse_phase = 0.0;
        }
    }

    /// Report the measured map area (in plot units)
    pub fn observe_map_area(&mut self, width: f64, height: f64) {
        self.map.observe_area(width, height);
    }

    /// Statistics over the rolling buffer, with the daily overlay
    pub fn stats(&self, now: DateTime<Utc>) -> StatsSnapshot {
        self.feed.stats_snapshot(now)
    }

    /// Close the feed and release every animation
    pub fn shutdown(&mut self) {
        self.running = false;
        self.feed.close(&mut self.map);
        self.map.scheduler.dispose();
    }

    /// Increase frame rate (decrease interval, clamp to minimum)
    pub fn increase_refresh_rate(&mut self) {
        let new_interval = self
            .refresh_config
            .refresh_ms
            .saturating_sub(config::REFRESH_STEP);
        self.refresh_config.refresh_ms = new_interval.max(config::MIN_REFRESH_MS);
        self.refresh_config.last_change = Some(Instant::now());
    }

    /// Decrease frame rate (increase interval, clamp to maximum)
    pub fn decrease_refresh_rate(&mut self) {
        let new_interval = self
            .refresh_config
            .refresh_ms
            .saturating_add(config::REFRESH_STEP);
        self.refresh_config.refresh_ms = new_interval.min(config::MAX_REFRESH_MS);
        self.refresh_config.last_change = Some(Instant::now());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::config::FeedConfig;
    use crate::feed::connection::{TransportSender, TransportSession};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;
    use url::Url;

    /// Connector that never touches the network; remembers the last session id
    #[derive(Default, Clone)]
    pub(crate) struct NullConnector {
        pub(crate) last_session: Rc<Cell<SessionId>>,
    }

    struct NullSession;

    impl TransportSession for NullSession {
        fn close(&mut self) {}
    }

    impl Connector for NullConnector {
        fn connect(
            &mut self,
            _endpoint: &Url,
            session: SessionId,
            _events: TransportSender,
        ) -> Box<dyn TransportSession> {
            self.last_session.set(session);
            Box::new(NullSession)
        }
    }

    pub(crate) fn test_app() -> (AppState, NullConnector) {
        let connector = NullConnector::default();
        let config = AppConfig {
            feed: FeedConfig {
                endpoint: Some("ws://localhost:9000".to_string()),
                ..FeedConfig::default()
            },
            ..AppConfig::default()
        };
        let app = AppState::new(config, Box::new(connector.clone()));
        (app, connector)
    }

    pub(crate) const ONE_ATTACK: &str = r#"[{"id":"1","src_ip":"1.2.3.4",
        "src_geo":{"lat":10,"lon":20,"country":"A"},"dst_geo":{"lat":-10,"lon":-20,"country":"B"},
        "type":"ddos"}]"#;

    /// Start the app and complete the handshake
    pub(crate) fn live_app() -> (AppState, NullConnector) {
        let (mut app, connector) = test_app();
        app.start();
        let session = connector.last_session.get();
        app.on_transport_event(session, TransportEvent::Opened, Instant::now(), Utc::now());
        assert_eq!(app.feed.state(), ConnectionState::Connected);
        (app, connector)
    }

    fn send(app: &mut AppState, connector: &NullConnector, text: &str, now: Instant) {
        let session = connector.last_session.get();
        app.on_transport_event(session, TransportEvent::Text(text.to_string()), now, Utc::now());
    }

    #[test]
    fn test_accepted_events_are_animated() {
        let (mut app, connector) = live_app();
        send(&mut app, &connector, ONE_ATTACK, Instant::now());
        assert_eq!(app.feed.buffer().len(), 1);
        assert_eq!(app.map.scheduler.active().len(), 1);
        assert_eq!(app.stats(Utc::now()).total, 1);
    }

    #[test]
    fn test_out_of_domain_events_buffered_but_not_animated() {
        let (mut app, connector) = live_app();
        let far = r#"[{"id":"2","src_geo":{"lat":95,"lon":500},"dst_geo":{"lat":0,"lon":0}}]"#;
        send(&mut app, &connector, far, Instant::now());
        assert_eq!(app.feed.buffer().len(), 1);
        assert_eq!(app.feed.counters().rejected, 0);
        assert_eq!(app.stats(Utc::now()).total, 1);
        assert!(app.map.scheduler.active().is_empty());
    }

    #[test]
    fn test_lone_event_object_is_ignored() {
        let (mut app, connector) = live_app();
        let lone = ONE_ATTACK.trim().trim_start_matches('[').trim_end_matches(']');
        send(&mut app, &connector, lone, Instant::now());
        assert!(app.feed.buffer().is_empty());
        assert_eq!(app.feed.counters().ignored, 1);
    }

    #[test]
    fn test_animations_disabled_still_buffers() {
        let (mut app, connector) = live_app();
        app.map.toggle_animations();
        send(&mut app, &connector, ONE_ATTACK, Instant::now());
        assert_eq!(app.feed.buffer().len(), 1);
        assert!(app.map.scheduler.active().is_empty());
    }

    #[test]
    fn test_disabling_animations_clears_map() {
        let (mut app, connector) = live_app();
        send(&mut app, &connector, ONE_ATTACK, Instant::now());
        app.map.toggle_animations();
        assert!(app.map.scheduler.active().is_empty());
        app.map.toggle_animations();
        assert!(app.map.settings.animations_enabled);
    }

    #[test]
    fn test_tick_releases_finished_animations() {
        let (mut app, connector) = live_app();
        let t0 = Instant::now();
        send(&mut app, &connector, ONE_ATTACK, t0);

        app.on_tick(t0 + Duration::from_millis(4999));
        assert_eq!(app.map.scheduler.active().len(), 1);
        app.on_tick(t0 + Duration::from_millis(5000));
        assert!(app.map.scheduler.active().is_empty());
    }

    #[test]
    fn test_tick_fires_reconnect() {
        let (mut app, connector) = live_app();
        let t0 = Instant::now();
        let first = connector.last_session.get();
        app.on_transport_event(first, TransportEvent::Closed { reason: None }, t0, Utc::now());
        assert_eq!(app.feed.state(), ConnectionState::Disconnected);

        app.on_tick(t0 + Duration::from_millis(3000));
        assert_eq!(app.feed.state(), ConnectionState::Connecting);
        assert_ne!(connector.last_session.get(), first);
    }

    #[test]
    fn test_resize_reprojects_animations() {
        let (mut app, connector) = live_app();
        send(&mut app, &connector, ONE_ATTACK, Instant::now());
        let before = app.map.scheduler.active()[0].start;

        app.observe_map_area(400.0, 200.0);
        let after = app.map.scheduler.active()[0].start;
        assert_ne!(before, after);
        assert!(after.x <= 400.0 && after.y <= 200.0);

        // Zero-sized measurements are ignored
        app.observe_map_area(0.0, 0.0);
        assert_eq!(app.map.scheduler.active()[0].start, after);
    }

    #[test]
    fn test_shutdown_disposes_everything() {
        let (mut app, connector) = live_app();
        send(&mut app, &connector, ONE_ATTACK, Instant::now());
        app.shutdown();
        assert!(!app.running);
        assert_eq!(app.feed.state(), ConnectionState::Idle);
        assert!(app.map.scheduler.active().is_empty());
        assert_eq!(app.feed.reconnect_at(), None);
    }

    #[test]
    fn test_manual_reconnect_after_exhaustion() {
        let (mut app, _connector) = {
            let connector = NullConnector::default();
            let app = AppState::new(AppConfig::default(), Box::new(connector.clone()));
            (app, connector)
        };
        // No endpoint configured
        app.start();
        assert_eq!(app.feed.state(), ConnectionState::Exhausted);
        app.reconnect();
        assert_eq!(app.feed.state(), ConnectionState::Exhausted);
        assert!(app.feed.last_error().is_some());
    }

    #[test]
    fn test_pulse_wraps() {
        let (mut app, _) = test_app();
        let now = Instant::now();
        for _ in 0..100 {
            app.on_tick(now);
            assert!((0.0..1.0).contains(&app.pulse_phase));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The frame interval stays within bounds for any key sequence.
        #[test]
        fn prop_refresh_interval_bounded(steps in proptest::collection::vec(any::<bool>(), 0..80)) {
            let (mut app, _) = test_app();
            for faster in steps {
                if faster {
                    app.increase_refresh_rate();
                } else {
                    app.decrease_refresh_rate();
                }
                prop_assert!(app.refresh_config.refresh_ms >= config::MIN_REFRESH_MS);
                prop_assert!(app.refresh_config.refresh_ms <= config::MAX_REFRESH_MS);
            }
        }
    }
}
