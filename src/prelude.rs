//! Prelude module for common stormwatch types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use stormwatch::prelude::*;`

pub use crate::core::{
    config::{DashboardConfig, FeedConfig, SearchConfig, ViewportConfig},
    dashboard::{ApiStatus, Dashboard, DashboardStatus, SelectedLocation},
    geo::LatLng,
    viewport::{ViewportController, ViewportState},
};

pub use crate::layers::{
    active::{legend_for, ActiveLayer, LayerState, LayerTransition, LegendPanel},
    animation::FlyToAnimation,
    marker::{IntensityTier, MarkerStyle, StrikeMarker},
    reconcile::{MarkerReconciler, ReconcileOutcome, RenderedMarker},
};

pub use crate::feed::{
    format::{intensity_bars, time_ago},
    model::{normalize_strikes, RawStrike, Snapshot, StrikeEvent, StrikeId},
    poller::{FeedPoller, FeedStatus, FetchTicket, PollOutcome},
    source::{HttpStrikeSource, StrikeSource},
};

pub use crate::input::{
    events::DashboardEvent,
    handler::{Command, EventManager},
};

pub use crate::rendering::{
    headless::{HeadlessProvider, HeadlessSurface, SurfaceInspector},
    surface::{MarkerHandle, RenderSurface, SurfaceEvent, SurfaceEventSender, SurfaceProvider},
};

pub use crate::search::{
    cache::QueryCache,
    client::{CityLookup, CitySearch, CitySearchResult, HttpCityLookup},
};

#[cfg(feature = "tokio-runtime")]
pub use crate::background::driver::{spawn_dashboard, DriverHandle};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::{Error as StormError, Result};

pub use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;
