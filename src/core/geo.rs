use serde::{Deserialize, Serialize};
use std::fmt;

/// Web Mercator latitude limit; the render surface cannot center beyond it.
const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
///
/// On the wire the longitude is called `lon`; `lng` is accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    #[serde(rename = "lon", alias = "lng")]
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the range a Mercator viewport can center on
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Returns a copy usable as a viewport center
    pub fn to_view_center(self) -> Self {
        Self::new(Self::clamp_lat(self.lat), Self::wrap_lng(self.lng))
    }

    /// Linear interpolation, taking the short way around the antimeridian
    pub fn lerp(&self, other: &LatLng, t: f64) -> LatLng {
        let mut d_lng = other.lng - self.lng;
        if d_lng > 180.0 {
            d_lng -= 360.0;
        } else if d_lng < -180.0 {
            d_lng += 360.0;
        }
        LatLng::new(
            self.lat + (other.lat - self.lat) * t,
            Self::wrap_lng(self.lng + d_lng * t),
        )
    }

    /// Pointer readout, e.g. `37.7749°N, 122.4194°W`
    pub fn readout(&self) -> String {
        let ns = if self.lat < 0.0 { 'S' } else { 'N' };
        let ew = if self.lng < 0.0 { 'W' } else { 'E' };
        format!(
            "{:.4}°{}, {:.4}°{}",
            self.lat.abs(),
            ns,
            self.lng.abs(),
            ew
        )
    }
}

impl Default for LatLng {
    fn default() -> Self {
        let (lat, lng) = crate::constants::DEFAULT_CENTER;
        Self::new(lat, lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}
