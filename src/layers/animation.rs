use crate::core::geo::LatLng;
use crate::prelude::{Duration, Instant};

/// Cubic ease-in-out over a normalized time value (0.0 to 1.0)
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Interpolated viewport position at one instant of a flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightSample {
    pub center: LatLng,
    pub zoom: f64,
    pub progress: f64,
}

impl FlightSample {
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Animated recentering/zoom from one view to another.
///
/// The render surface draws the actual transition; this tracks where the
/// viewport is along it so `ViewportState` stays truthful mid-flight.
#[derive(Debug, Clone)]
pub struct FlyToAnimation {
    start_time: Instant,
    duration: Duration,
    from_center: LatLng,
    to_center: LatLng,
    from_zoom: f64,
    to_zoom: f64,
}

impl FlyToAnimation {
    pub fn new(
        from_center: LatLng,
        to_center: LatLng,
        from_zoom: f64,
        to_zoom: f64,
        duration: Duration,
        start_time: Instant,
    ) -> Self {
        Self {
            start_time,
            duration,
            from_center,
            to_center,
            from_zoom,
            to_zoom,
        }
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start_time);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn sample(&self, now: Instant) -> FlightSample {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return FlightSample {
                center: self.to_center,
                zoom: self.to_zoom,
                progress: 1.0,
            };
        }
        let eased = ease_in_out_cubic(progress);
        FlightSample {
            center: self.from_center.lerp(&self.to_center, eased),
            zoom: lerp(self.from_zoom, self.to_zoom, eased),
            progress,
        }
    }
}
