// Feed connection manager
//
// Owns the connection state machine, the rolling buffer and the stats
// accumulator. The transport itself runs elsewhere (see transport.rs) and
// only reports TransportEvents tagged with the session they belong to;
// events from any session other than the current one are discarded.
//
//   Idle ──open──▶ Connecting ──Opened──▶ Connected
//                     │                      │
//                     └──Closed──▶ Disconnected ◀──Closed──┘
//                                     │
//            retries < max: after reconnect_delay ──▶ Connecting
//            retries = max: ─────────────────────────▶ Exhausted
//
// The reconnect timer is a deadline checked by `poll(now)`.

use super::error::FeedError;
use super::validate::validate_batch;
use super::{decode_message, AttackEvent, InboundMessage, TodayStats};
use crate::app::config::FeedConfig;
use crate::stats::{RollingBuffer, StatsAccumulator, StatsSnapshot};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Exhausted,
}

impl ConnectionState {
    /// The only source of the "live" indicator
    pub fn is_live(self) -> bool {
        self == ConnectionState::Connected
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Idle => "Idle",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Live",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Exhausted => "Offline",
        }
    }
}

/// Identifies one transport session
pub type SessionId = u64;

/// What a transport session reports back
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// A text frame
    Text(String),
    /// The session ended (handshake failure, error, or remote close)
    Closed { reason: Option<String> },
}

pub type TransportSender = UnboundedSender<(SessionId, TransportEvent)>;

/// A live transport session
pub trait TransportSession {
    /// Tear the session down; no further events may be sent for it
    fn close(&mut self);
}

/// Creates transport sessions
pub trait Connector {
    fn connect(
        &mut self,
        endpoint: &Url,
        session: SessionId,
        events: TransportSender,
    ) -> Box<dyn TransportSession>;
}

/// Receives state changes from the manager
///
/// Called after the manager has updated its own state.
pub trait FeedObserver {
    fn on_state_change(&mut self, _state: ConnectionState, _error: Option<&str>) {}
    fn on_events(&mut self, _events: &[AttackEvent], _received_at: Instant) {}
    fn on_today(&mut self, _today: &TodayStats) {}
}

impl FeedObserver for () {}

/// Ingestion counters for the current process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedCounters {
    /// Text frames received
    pub messages: u64,
    /// Events that passed validation
    pub accepted: u64,
    /// Candidate events dropped by validation
    pub rejected: u64,
    /// Frames that were not valid JSON (or a malformed aggregate)
    pub decode_errors: u64,
    /// Well-formed frames of an unknown shape
    pub ignored: u64,
}

pub struct ConnectionManager {
    config: FeedConfig,
    connector: Box<dyn Connector>,
    endpoint: Option<Url>,
    state: ConnectionState,
    retry_count: u32,
    last_error: Option<String>,
    reconnect_at: Option<Instant>,
    session: Option<Box<dyn TransportSession>>,
    session_id: SessionId,
    events_tx: TransportSender,
    events_rx: UnboundedReceiver<(SessionId, TransportEvent)>,
    buffer: RollingBuffer,
    stats: StatsAccumulator,
    today: Option<TodayStats>,
    observation_start: DateTime<Utc>,
    counters: FeedCounters,
    last_message_at: Option<DateTime<Utc>>,
}

impl ConnectionManager {
    pub fn new(
        config: FeedConfig,
        connector: Box<dyn Connector>,
        observation_start: DateTime<Utc>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let buffer = RollingBuffer::new(config.buffer_capacity);
        Self {
            config,
            connector,
            endpoint: None,
            state: ConnectionState::Idle,
            retry_count: 0,
            last_error: None,
            reconnect_at: None,
            session: None,
            session_id: 0,
            events_tx,
            events_rx,
            buffer,
            stats: StatsAccumulator::new(),
            today: None,
            observation_start,
            counters: FeedCounters::default(),
            last_message_at: None,
        }
    }

    /// Open (or re-open) the feed at the configured endpoint
    ///
    /// Resets the retry counter. This is the only way out of `Exhausted`.
    /// Buffer, stats and the observation start are kept.
    pub fn open(&mut self, observer: &mut dyn FeedObserver) {
        self.teardown();
        self.retry_count = 0;
        self.last_error = None;
        self.set_state(ConnectionState::Connecting, observer);

        match parse_endpoint(self.config.endpoint.as_deref()) {
            Ok(url) => {
                self.endpoint = Some(url);
                self.start_session();
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot open feed");
                self.endpoint = None;
                self.last_error = Some(e.to_string());
                self.set_state(ConnectionState::Exhausted, observer);
            }
        }
    }

    /// Dispose the connection: close the transport and cancel the timer
    ///
    /// Events already queued for the closed session are discarded.
    pub fn close(&mut self, observer: &mut dyn FeedObserver) {
        self.teardown();
        self.set_state(ConnectionState::Idle, observer);
    }

    /// Wait for the next transport event
    pub async fn recv(&mut self) -> Option<(SessionId, TransportEvent)> {
        self.events_rx.recv().await
    }

    /// Apply one transport event
    pub fn handle(
        &mut self,
        session: SessionId,
        event: TransportEvent,
        now: Instant,
        wall: DateTime<Utc>,
        observer: &mut dyn FeedObserver,
    ) {
        if session != self.session_id || self.session.is_none() {
            tracing::trace!(session, current = self.session_id, "dropping stale transport event");
            return;
        }

        match event {
            TransportEvent::Opened => {
                if self.state == ConnectionState::Connecting {
                    self.retry_count = 0;
                    self.last_error = None;
                    self.set_state(ConnectionState::Connected, observer);
                }
            }
            TransportEvent::Text(text) => {
                if self.state == ConnectionState::Connected {
                    self.ingest(&text, now, wall, observer);
                }
            }
            TransportEvent::Closed { reason } => {
                if let Some(mut session) = self.session.take() {
                    session.close();
                }
                if let Some(reason) = reason {
                    self.last_error = Some(reason);
                }
                self.set_state(ConnectionState::Disconnected, observer);
                self.schedule_reconnect(now, observer);
            }
        }
    }

    /// Fire the reconnect timer if its deadline has passed
    pub fn poll(&mut self, now: Instant, observer: &mut dyn FeedObserver) {
        let Some(deadline) = self.reconnect_at else {
            return;
        };
        if now < deadline || self.state != ConnectionState::Disconnected {
            return;
        }

        self.reconnect_at = None;
        self.retry_count += 1;
        tracing::info!(
            attempt = self.retry_count,
            max = self.config.max_retries,
            "reconnecting to feed"
        );
        self.set_state(ConnectionState::Connecting, observer);
        self.start_session();
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Pending reconnect deadline, if any
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    pub fn buffer(&self) -> &RollingBuffer {
        &self.buffer
    }

    #[allow(dead_code)]
    pub fn today(&self) -> Option<&TodayStats> {
        self.today.as_ref()
    }

    pub fn counters(&self) -> &FeedCounters {
        &self.counters
    }

    pub fn last_message_at(&self) -> Option<DateTime<Utc>> {
        self.last_message_at
    }

    #[allow(dead_code)]
    pub fn observation_start(&self) -> DateTime<Utc> {
        self.observation_start
    }

    /// Current statistics, with the daily overlay attached
    pub fn stats_snapshot(&self, now: DateTime<Utc>) -> StatsSnapshot {
        self.stats
            .snapshot(self.observation_start, now)
            .with_today(self.today.clone())
    }

    fn set_state(&mut self, state: ConnectionState, observer: &mut dyn FeedObserver) {
        if self.state == state {
            return;
        }
        tracing::info!(from = ?self.state, to = ?state, "feed state changed");
        self.state = state;
        observer.on_state_change(state, self.last_error.as_deref());
    }

    fn start_session(&mut self) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        self.session_id += 1;
        tracing::info!(endpoint = %endpoint, session = self.session_id, "connecting to feed");
        let session = self
            .connector
            .connect(&endpoint, self.session_id, self.events_tx.clone());
        self.session = Some(session);
    }

    fn schedule_reconnect(&mut self, now: Instant, observer: &mut dyn FeedObserver) {
        if self.retry_count >= self.config.max_retries {
            let error = FeedError::Exhausted(self.retry_count);
            tracing::error!(attempts = self.retry_count, "giving up on feed");
            self.reconnect_at = None;
            self.last_error = Some(error.to_string());
            self.set_state(ConnectionState::Exhausted, observer);
            return;
        }
        if self.reconnect_at.is_none() {
            let deadline = now + self.config.reconnect_delay;
            tracing::info!(
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                next_attempt = self.retry_count + 1,
                "scheduling reconnect"
            );
            self.reconnect_at = Some(deadline);
        }
    }

    /// Close the live session (if any) and cancel the reconnect timer
    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.reconnect_at = None;
        // Invalidate anything the old session already queued
        self.session_id += 1;
    }

    fn ingest(
        &mut self,
        text: &str,
        now: Instant,
        wall: DateTime<Utc>,
        observer: &mut dyn FeedObserver,
    ) {
        self.counters.messages += 1;
        self.last_message_at = Some(wall);

        match decode_message(text) {
            Err(e) => {
                self.counters.decode_errors += 1;
                tracing::warn!(error = %e, "dropping undecodable message");
            }
            Ok(InboundMessage::Batch(candidates)) => {
                let outcome = validate_batch(&candidates);
                self.counters.rejected += outcome.rejected as u64;
                if outcome.rejected > 0 {
                    tracing::debug!(rejected = outcome.rejected, "dropped invalid events");
                }
                if outcome.accepted.is_empty() {
                    return;
                }

                self.counters.accepted += outcome.accepted.len() as u64;
                for event in &outcome.accepted {
                    self.stats.record(event);
                }
                for evicted in self.buffer.append(outcome.accepted.iter().cloned()) {
                    self.stats.evict(&evicted);
                }
                observer.on_events(&outcome.accepted, now);
            }
            Ok(InboundMessage::StatsToday(today)) => {
                tracing::debug!(total = today.total, countries = today.countries.len(), "daily stats updated");
                observer.on_today(&today);
                self.today = Some(today);
            }
            Ok(InboundMessage::Ignored) => {
                self.counters.ignored += 1;
                tracing::debug!("ignoring message of unknown shape");
            }
        }
    }
}

fn parse_endpoint(endpoint: Option<&str>) -> Result<Url, FeedError> {
    let raw = endpoint
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(FeedError::MissingEndpoint)?;
    let url = Url::parse(raw).map_err(|e| FeedError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(FeedError::UnsupportedScheme(other.to_string())),
    }
}
