// Command-line interface
//
// Every option can also come from the environment (or a .env file loaded
// at startup); flags win over the environment.

use crate::app::config::{
    AnimationConfig, AppConfig, FeedConfig, ProjectionConfig, DEFAULT_BUFFER_CAPACITY,
    DEFAULT_MAX_RETRIES, DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SCALE_FACTOR,
};
use clap::Parser;
use std::time::Duration;

/// Live terminal map of cyber attacks streamed over a WebSocket.
#[derive(Parser, Debug, Clone)]
#[command(name = "attackmap", version, about, long_about = None)]
pub struct Cli {
    // ── Feed ─────────────────────────────────────────────────────────────────

    /// WebSocket endpoint of the attack feed (ws:// or wss://).
    #[arg(short = 'e', long, env = "ATTACKMAP_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Delay before each reconnection attempt, in milliseconds.
    #[arg(long, env = "ATTACKMAP_RECONNECT_DELAY_MS", value_name = "MS",
          default_value_t = DEFAULT_RECONNECT_DELAY_MS)]
    pub reconnect_delay_ms: u64,

    /// Reconnection attempts before the feed is marked offline.
    #[arg(long, env = "ATTACKMAP_MAX_RETRIES", value_name = "N",
          default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Number of recent events kept for statistics and the live feed.
    #[arg(long, env = "ATTACKMAP_BUFFER_CAPACITY", value_name = "N",
          default_value_t = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    // ── Map ──────────────────────────────────────────────────────────────────

    /// Duration of the line drawing phase, in milliseconds.
    #[arg(long, env = "ATTACKMAP_DRAW_MS", value_name = "MS", default_value_t = 2000)]
    pub draw_ms: u64,

    /// Duration of the fade-out phase, in milliseconds.
    #[arg(long, env = "ATTACKMAP_FADE_MS", value_name = "MS", default_value_t = 3000)]
    pub fade_ms: u64,

    /// Projection scale relative to the smaller map dimension.
    #[arg(long, env = "ATTACKMAP_SCALE_FACTOR", value_name = "F",
          default_value_t = DEFAULT_SCALE_FACTOR)]
    pub scale_factor: f64,

    // ── Logging ──────────────────────────────────────────────────────────────

    /// Log file. The terminal is owned by the UI, so logs never go to stdout.
    #[arg(long, env = "ATTACKMAP_LOG", value_name = "PATH", default_value = "attackmap.log")]
    pub log_file: String,

    /// Log filter directive, e.g. `info` or `attackmap=debug`.
    #[arg(long, env = "RUST_LOG", value_name = "FILTER", default_value = "info")]
    pub log_filter: String,
}

impl Cli {
    /// Build the application configuration from the parsed options
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            feed: FeedConfig {
                endpoint: self.endpoint.clone(),
                reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
                max_retries: self.max_retries,
                buffer_capacity: self.buffer_capacity,
            },
            animation: AnimationConfig::with_durations(
                Duration::from_millis(self.draw_ms),
                Duration::from_millis(self.fade_ms),
            ),
            projection: ProjectionConfig::new(self.scale_factor),
        }
    }
}
