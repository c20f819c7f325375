//! # Stormwatch
//!
//! The map engine behind a live lightning dashboard.
//!
//! This library owns the map viewport, polls the live strike feed, and keeps
//! the on-screen strike markers consistent with the latest snapshot and the
//! selected display layer. The map renderer itself is a capability supplied
//! by the caller through [`rendering::surface::RenderSurface`].

#[cfg(feature = "tokio-runtime")]
pub mod background;
pub mod core;
pub mod feed;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod search;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::DashboardConfig,
    dashboard::{Dashboard, DashboardStatus, SelectedLocation},
    geo::LatLng,
    viewport::{ViewportController, ViewportState},
};

pub use layers::{
    active::{ActiveLayer, LayerState},
    marker::{IntensityTier, MarkerStyle},
    reconcile::{MarkerReconciler, ReconcileOutcome},
};

pub use feed::{
    model::{RawStrike, Snapshot, StrikeEvent},
    poller::{FeedPoller, FeedStatus, PollOutcome},
    source::{HttpStrikeSource, StrikeSource},
};

pub use input::{events::DashboardEvent, handler::Command};

pub use rendering::{
    headless::{HeadlessProvider, SurfaceInspector},
    surface::{RenderSurface, SurfaceEvent, SurfaceProvider},
};

pub use search::client::{CityLookup, CitySearch, CitySearchResult, HttpCityLookup};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum StormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    #[error("No response from strike feed within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Render surface error: {0}")]
    Surface(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dashboard command channel closed")]
    ChannelClosed,
}

/// Error type alias for convenience
pub type Error = StormError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
