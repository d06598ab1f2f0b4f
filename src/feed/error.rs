// Feed error types
//
// Display strings double as the user-visible "last error" text in the
// status bar, so they are kept short and calm.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no feed endpoint configured (set --endpoint or ATTACKMAP_ENDPOINT)")]
    MissingEndpoint,

    #[error("invalid feed endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("unsupported endpoint scheme {0:?} (expected ws or wss)")]
    UnsupportedScheme(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("reconnection gave up after {0} attempts")]
    Exhausted(u32),

    #[error("malformed message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("malformed statsToday payload: {0}")]
    MalformedAggregate(#[source] serde_json::Error),
}
