// Attack feed module
//
// Types for attack events and the daily aggregate, decoding of inbound
// WebSocket messages, validation, and the connection state machine.

pub mod connection;
pub mod error;
pub mod transport;
pub mod validate;

pub use connection::{ConnectionManager, ConnectionState, FeedCounters, FeedObserver};
pub use error::FeedError;

use serde::Deserialize;
use serde_json::Value;

/// `type` tag of the out-of-band daily aggregate message
pub const STATS_TODAY_TAG: &str = "statsToday";

/// One end of an attack
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl GeoPoint {
    /// Short human-readable place name ("City, Country", "Country" or "?")
    pub fn place(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (None, Some(country)) => country.clone(),
            (Some(city), None) => city.clone(),
            (None, None) => "?".to_string(),
        }
    }
}

/// A validated attack event
///
/// Both geo points are guaranteed to carry finite coordinates. The `id`
/// is carried for display only; the feed does not guarantee uniqueness.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackEvent {
    pub id: String,
    pub timestamp: Option<String>,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub src: GeoPoint,
    pub dst: GeoPoint,
    pub attack_type: Option<String>,
}

/// Per-country entry of the daily aggregate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

/// Daily aggregate pushed by the event source
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodayStats {
    pub total: u64,
    #[serde(default)]
    pub countries: Vec<CountryCount>,
}

/// A decoded inbound message, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Array payload: candidate attack events
    Batch(Vec<Value>),
    /// `{ type: "statsToday", payload: {...} }`
    StatsToday(TodayStats),
    /// Any other well-formed JSON
    Ignored,
}

/// Decode a text frame into an [`InboundMessage`]
pub fn decode_message(text: &str) -> Result<InboundMessage, FeedError> {
    let value: Value = serde_json::from_str(text).map_err(FeedError::Decode)?;

    match value {
        Value::Array(items) => Ok(InboundMessage::Batch(items)),
        Value::Object(mut map) => {
            if map.get("type").and_then(Value::as_str) != Some(STATS_TODAY_TAG) {
                return Ok(InboundMessage::Ignored);
            }
            let payload = map.remove("payload").unwrap_or(Value::Null);
            let today = serde_json::from_value(payload).map_err(FeedError::MalformedAggregate)?;
            Ok(InboundMessage::StatsToday(today))
        }
        _ => Ok(InboundMessage::Ignored),
    }
}
