use crate::{
    constants::{HIGH_TIER_MIN_INTENSITY, MARKER_PULSE_PERIOD_MS, MEDIUM_TIER_MIN_INTENSITY},
    core::geo::LatLng,
    feed::model::{StrikeEvent, StrikeId},
};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Presentation tier derived from strike intensity.
///
/// Boundaries are inclusive on the lower end: 5 is medium, 8 is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTier {
    Low,
    Medium,
    High,
}

impl IntensityTier {
    pub const ALL: [IntensityTier; 3] = [IntensityTier::High, IntensityTier::Medium, IntensityTier::Low];

    pub fn from_intensity(intensity: i32) -> Self {
        if intensity >= HIGH_TIER_MIN_INTENSITY {
            IntensityTier::High
        } else if intensity >= MEDIUM_TIER_MIN_INTENSITY {
            IntensityTier::Medium
        } else {
            IntensityTier::Low
        }
    }

    /// Legend text for this tier
    pub fn label(&self) -> &'static str {
        match self {
            IntensityTier::High => "High Intensity (8+)",
            IntensityTier::Medium => "Medium Intensity (5-7)",
            IntensityTier::Low => "Low Intensity (1-4)",
        }
    }

    pub fn style(&self) -> MarkerStyle {
        let (size_px, color, pulse_color) = match self {
            IntensityTier::High => (24, "#ef4444", "#fca5a5"),
            IntensityTier::Medium => (20, "#f59e0b", "#fcd34d"),
            IntensityTier::Low => (16, "#eab308", "#fde047"),
        };
        MarkerStyle {
            tier: *self,
            size_px,
            color,
            pulse_color,
            pulse_period: Duration::from_millis(MARKER_PULSE_PERIOD_MS),
        }
    }
}

impl fmt::Display for IntensityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntensityTier::Low => write!(f, "low"),
            IntensityTier::Medium => write!(f, "medium"),
            IntensityTier::High => write!(f, "high"),
        }
    }
}

/// How a strike marker is drawn. Larger and redder for stronger strikes;
/// every marker pulses at the same rate regardless of tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub tier: IntensityTier,
    pub size_px: u32,
    pub color: &'static str,
    pub pulse_color: &'static str,
    pub pulse_period: Duration,
}

/// One marker to be placed on the render surface
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeMarker {
    pub strike_id: StrikeId,
    pub position: LatLng,
    pub style: MarkerStyle,
}

impl StrikeMarker {
    pub fn from_strike(strike: &StrikeEvent) -> Self {
        Self {
            strike_id: strike.id.clone(),
            position: strike.coordinates,
            style: IntensityTier::from_intensity(strike.intensity).style(),
        }
    }

    pub fn tier(&self) -> IntensityTier {
        self.style.tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(IntensityTier::from_intensity(4), IntensityTier::Low);
        assert_eq!(IntensityTier::from_intensity(5), IntensityTier::Medium);
        assert_eq!(IntensityTier::from_intensity(7), IntensityTier::Medium);
        assert_eq!(IntensityTier::from_intensity(8), IntensityTier::High);
        assert_eq!(IntensityTier::from_intensity(0), IntensityTier::Low);
        assert_eq!(IntensityTier::from_intensity(42), IntensityTier::High);
    }

    #[test]
    fn test_styles_grow_with_tier() {
        let low = IntensityTier::Low.style();
        let medium = IntensityTier::Medium.style();
        let high = IntensityTier::High.style();
        assert!(low.size_px < medium.size_px && medium.size_px < high.size_px);
        assert_eq!(high.color, "#ef4444");
        assert_eq!(low.pulse_period, high.pulse_period);
    }

    #[test]
    fn test_marker_from_strike() {
        let strike = StrikeEvent {
            id: StrikeId::Server("a1".to_string()),
            coordinates: LatLng::new(35.0, -97.0),
            intensity: 9,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        };
        let marker = StrikeMarker::from_strike(&strike);
        assert_eq!(marker.position, strike.coordinates);
        assert_eq!(marker.tier(), IntensityTier::High);
        assert_eq!(marker.strike_id, strike.id);
    }
}
