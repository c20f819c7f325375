//! Display helpers for strike lists and the status bar.

use crate::constants::INTENSITY_BAR_COUNT;
use chrono::{DateTime, Utc};

/// Human-readable age of a strike relative to `now`.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds();

    if secs < 60 {
        if secs <= 5 {
            "Just now".to_string()
        } else {
            format!("{}s ago", secs)
        }
    } else if secs < 3600 {
        format!("{} min ago", secs / 60)
    } else if secs < 86_400 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        if minutes > 0 {
            format!("{}h {}m ago", hours, minutes)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        timestamp.format("%b %-d, %H:%M").to_string()
    }
}

/// Ten-segment gauge; the first `intensity` segments are lit.
pub fn intensity_bars(intensity: i32) -> [bool; INTENSITY_BAR_COUNT] {
    let lit = intensity.clamp(0, INTENSITY_BAR_COUNT as i32) as usize;
    let mut bars = [false; INTENSITY_BAR_COUNT];
    bars[..lit].iter_mut().for_each(|bar| *bar = true);
    bars
}
