use crate::{layers::marker::IntensityTier, StormError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The overlay the dashboard is currently showing.
///
/// Only `Lightning` carries live markers; the other two are placeholders
/// that switch the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLayer {
    #[default]
    Lightning,
    Weather,
    Radar,
}

impl ActiveLayer {
    pub const ALL: [ActiveLayer; 3] = [ActiveLayer::Lightning, ActiveLayer::Weather, ActiveLayer::Radar];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveLayer::Lightning => "lightning",
            ActiveLayer::Weather => "weather",
            ActiveLayer::Radar => "radar",
        }
    }

    pub fn shows_markers(&self) -> bool {
        matches!(self, ActiveLayer::Lightning)
    }
}

impl fmt::Display for ActiveLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveLayer {
    type Err = StormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lightning" => Ok(ActiveLayer::Lightning),
            "weather" => Ok(ActiveLayer::Weather),
            "radar" => Ok(ActiveLayer::Radar),
            other => Err(StormError::Config(format!("unknown layer '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerTransition {
    pub from: ActiveLayer,
    pub to: ActiveLayer,
}

impl LayerTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Holds the active layer selection
#[derive(Debug, Clone, Default)]
pub struct LayerState {
    active: ActiveLayer,
}

impl LayerState {
    pub fn active(&self) -> ActiveLayer {
        self.active
    }

    pub fn shows_markers(&self) -> bool {
        self.active.shows_markers()
    }

    /// Switch layers. Selecting the current layer yields `None`.
    pub fn select(&mut self, layer: ActiveLayer) -> Option<LayerTransition> {
        let transition = LayerTransition {
            from: self.active,
            to: layer,
        };
        if !transition.changed() {
            return None;
        }
        self.active = layer;
        Some(transition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: &'static str,
}

/// Legend contents for one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendPanel {
    pub title: &'static str,
    pub entries: Vec<LegendEntry>,
    pub description: Option<&'static str>,
    pub note: &'static str,
}

pub fn legend_for(layer: ActiveLayer) -> LegendPanel {
    match layer {
        ActiveLayer::Lightning => LegendPanel {
            title: "Lightning Activity",
            entries: IntensityTier::ALL
                .iter()
                .map(|tier| LegendEntry {
                    label: tier.label(),
                    color: tier.style().color,
                })
                .collect(),
            description: None,
            note: "Live lightning strikes updated every 10 seconds",
        },
        ActiveLayer::Weather => LegendPanel {
            title: "Weather Data",
            entries: Vec::new(),
            description: Some("Shows temperature overlays, wind patterns, and weather conditions"),
            note: "Feature in development",
        },
        ActiveLayer::Radar => LegendPanel {
            title: "Radar View",
            entries: Vec::new(),
            description: Some("Displays precipitation radar and storm tracking data"),
            note: "Feature in development",
        },
    }
}
