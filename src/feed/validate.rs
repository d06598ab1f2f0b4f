// Event validation
//
// Turns candidate JSON records into typed AttackEvents. A candidate is
// accepted iff it is an object with `src_geo` and `dst_geo` objects whose
// `lon`/`lat` are finite numbers. Everything else is optional.

use super::{AttackEvent, GeoPoint};
use serde_json::{Map, Value};

/// Result of validating one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Valid events, in arrival order
    pub accepted: Vec<AttackEvent>,
    /// Number of dropped candidates
    pub rejected: usize,
}

/// Validate a single candidate record
pub fn validate_event(candidate: &Value) -> Option<AttackEvent> {
    let record = candidate.as_object()?;
    let src = geo_point(record.get("src_geo")?)?;
    let dst = geo_point(record.get("dst_geo")?)?;

    Some(AttackEvent {
        id: text(record, "id").unwrap_or_default(),
        timestamp: text(record, "timestamp"),
        src_ip: text(record, "src_ip"),
        dst_ip: text(record, "dst_ip"),
        src,
        dst,
        attack_type: text(record, "type"),
    })
}

/// Validate every candidate of a batch, keeping arrival order
pub fn validate_batch(candidates: &[Value]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for candidate in candidates {
        match validate_event(candidate) {
            Some(event) => outcome.accepted.push(event),
            None => outcome.rejected += 1,
        }
    }
    outcome
}

fn geo_point(value: &Value) -> Option<GeoPoint> {
    let geo = value.as_object()?;
    Some(GeoPoint {
        lon: finite(geo.get("lon")?)?,
        lat: finite(geo.get("lat")?)?,
        country: text(geo, "country"),
        city: text(geo, "city"),
    })
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

/// Optional text field; numbers are rendered, blanks count as absent
fn text(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
