//! Strike feed data model.
//!
//! `RawStrike` is what `GET /api/lightning` returns. `normalize_strikes`
//! turns a response into `StrikeEvent`s with absolute timestamps, dropping
//! records that cannot be drawn.

use crate::core::geo::LatLng;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One strike as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStrike {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub coordinates: LatLng,
    pub intensity: f64,
    pub timestamp: String,
}

/// Identity of a strike within one poll. Not stable across polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum StrikeId {
    Server(String),
    Index(usize),
}

impl fmt::Display for StrikeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrikeId::Server(id) => write!(f, "{}", id),
            StrikeId::Index(i) => write!(f, "#{}", i),
        }
    }
}

/// One lightning detection, normalized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrikeEvent {
    pub id: StrikeId,
    pub coordinates: LatLng,
    pub intensity: i32,
    pub timestamp: DateTime<Utc>,
}

/// Why a raw record was left out of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    InvalidCoordinates { index: usize, coordinates: LatLng },
    InvalidIntensity { index: usize },
    InvalidTimestamp { index: usize, raw: String },
}

/// Result of normalizing one feed response
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub events: Vec<StrikeEvent>,
    pub dropped: Vec<DropReason>,
}

/// Parses a feed timestamp into an absolute instant.
///
/// RFC 3339 first; a timestamp without an offset is read as UTC.
pub fn parse_timestamp(raw: &str) -> crate::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| crate::StormError::Timestamp(raw.to_string()).into())
}

fn strike_id(raw: &Option<serde_json::Value>, index: usize) -> StrikeId {
    match raw {
        Some(serde_json::Value::String(s)) => StrikeId::Server(s.clone()),
        Some(serde_json::Value::Number(n)) => StrikeId::Server(n.to_string()),
        _ => StrikeId::Index(index),
    }
}

/// Normalizes a feed response. Records with out-of-range coordinates, a
/// non-finite intensity or an unparseable timestamp are dropped; intensity
/// is rounded and floored at zero.
pub fn normalize_strikes(raw: Vec<RawStrike>) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        events: Vec::with_capacity(raw.len()),
        dropped: Vec::new(),
    };

    for (index, strike) in raw.into_iter().enumerate() {
        if !strike.coordinates.is_valid() {
            batch.dropped.push(DropReason::InvalidCoordinates {
                index,
                coordinates: strike.coordinates,
            });
            continue;
        }
        if !strike.intensity.is_finite() {
            batch.dropped.push(DropReason::InvalidIntensity { index });
            continue;
        }
        let timestamp = match parse_timestamp(&strike.timestamp) {
            Ok(ts) => ts,
            Err(_) => {
                batch.dropped.push(DropReason::InvalidTimestamp {
                    index,
                    raw: strike.timestamp,
                });
                continue;
            }
        };

        let intensity = strike.intensity.round().clamp(0.0, i32::MAX as f64) as i32;
        batch.events.push(StrikeEvent {
            id: strike_id(&strike.id, index),
            coordinates: strike.coordinates,
            intensity,
            timestamp,
        });
    }

    batch
}

/// The complete set of strikes from the latest successful poll.
///
/// Cloning is cheap; the events are shared and never mutated in place.
#[derive(Debug, Clone)]
pub struct Snapshot {
    events: Arc<[StrikeEvent]>,
    fetched_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            events: Arc::from(Vec::new()),
            fetched_at: None,
            generation: 0,
        }
    }

    pub fn new(events: Vec<StrikeEvent>, fetched_at: DateTime<Utc>, generation: u64) -> Self {
        Self {
            events: Arc::from(events),
            fetched_at: Some(fetched_at),
            generation,
        }
    }

    pub fn events(&self) -> &[StrikeEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StrikeEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// When this snapshot was committed; `None` before the first success
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Increments on every successful replacement
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(lat: f64, lon: f64, intensity: f64, ts: &str) -> RawStrike {
        RawStrike {
            id: None,
            coordinates: LatLng::new(lat, lon),
            intensity,
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_deserialize_feed_response() {
        let json = r#"[
            {"id": 17, "coordinates": {"lat": 35.1, "lon": -97.4}, "intensity": 8, "timestamp": "2024-06-01T12:00:00Z"},
            {"coordinates": {"lat": 36.0, "lon": -96.0}, "intensity": 3, "timestamp": "2024-06-01T12:00:05.250Z"}
        ]"#;
        let strikes: Vec<RawStrike> = serde_json::from_str(json).unwrap();
        let batch = normalize_strikes(strikes);

        assert!(batch.dropped.is_empty());
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.events[0].id, StrikeId::Server("17".to_string()));
        assert_eq!(batch.events[1].id, StrikeId::Index(1));
        assert_eq!(
            batch.events[0].timestamp,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_timestamp_offsets_are_normalized_to_utc() {
        let ts = parse_timestamp("2024-05-01T08:00:00-05:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap());

        let naive = parse_timestamp("2024-05-01T13:00:00").unwrap();
        assert_eq!(naive, ts);

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_invalid_records_are_dropped() {
        let batch = normalize_strikes(vec![
            raw(95.0, 0.0, 5.0, "2024-06-01T12:00:00Z"),
            raw(10.0, 10.0, f64::NAN, "2024-06-01T12:00:00Z"),
            raw(10.0, 10.0, 5.0, "garbage"),
            raw(10.0, 10.0, 5.0, "2024-06-01T12:00:00Z"),
        ]);

        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.dropped.len(), 3);
        assert_eq!(batch.events[0].id, StrikeId::Index(3));
        assert!(matches!(
            batch.dropped[2],
            DropReason::InvalidTimestamp { index: 2, .. }
        ));
    }

    #[test]
    fn test_intensity_rounding_and_floor() {
        let batch = normalize_strikes(vec![
            raw(1.0, 1.0, 7.6, "2024-06-01T12:00:00Z"),
            raw(1.0, 1.0, -3.0, "2024-06-01T12:00:00Z"),
        ]);
        assert_eq!(batch.events[0].intensity, 8);
        assert_eq!(batch.events[1].intensity, 0);
    }

    #[test]
    fn test_snapshot_is_cheap_to_share() {
        let now = Utc::now();
        let snap = Snapshot::new(normalize_strikes(vec![raw(1.0, 1.0, 1.0, "2024-06-01T12:00:00Z")]).events, now, 3);
        let copy = snap.clone();
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.generation(), 3);
        assert_eq!(copy.fetched_at(), Some(now));
        assert!(Snapshot::empty().is_empty());
    }
}
