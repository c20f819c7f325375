//! Configuration for the dashboard engine
//!
//! Every section deserializes with defaults, so a partial JSON file only
//! overrides the values it names. Durations are stored as plain
//! milliseconds/seconds to keep the file format readable.

use crate::constants::*;
use crate::core::geo::LatLng;
use crate::{Result, StormError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Live feed polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_ms: FEED_REQUEST_TIMEOUT_MS,
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Viewport behavior: initial view, zoom limits and transition timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_delta: f64,
    pub reset_center: LatLng,
    pub reset_zoom: f64,
    pub reset_duration_ms: u64,
    pub fly_to_zoom: f64,
    pub fly_to_duration_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        let (lat, lng) = DEFAULT_CENTER;
        Self {
            initial_center: LatLng::new(lat, lng),
            initial_zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            reset_center: LatLng::new(lat, lng),
            reset_zoom: DEFAULT_ZOOM,
            reset_duration_ms: FLY_TO_DURATION_MS,
            fly_to_zoom: FLY_TO_ZOOM,
            fly_to_duration_ms: FLY_TO_DURATION_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
        }
    }
}

impl ViewportConfig {
    pub fn fly_to_duration(&self) -> Duration {
        Duration::from_millis(self.fly_to_duration_ms)
    }

    pub fn reset_duration(&self) -> Duration {
        Duration::from_millis(self.reset_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// City search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_query_len: usize,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: SEARCH_MIN_QUERY_LEN,
            cache_ttl_secs: SEARCH_CACHE_TTL_SECS,
            cache_capacity: SEARCH_CACHE_CAPACITY,
        }
    }
}

impl SearchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Top-level dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the weather backend serving `/api/...`
    pub api_base_url: String,
    /// Credential for the map renderer. Providers that need one refuse to
    /// initialize without it.
    pub map_access_token: Option<String>,
    /// Whether the upstream connection is considered up at startup
    pub start_connected: bool,
    pub feed: FeedConfig,
    pub viewport: ViewportConfig,
    pub search: SearchConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            map_access_token: None,
            start_connected: true,
            feed: FeedConfig::default(),
            viewport: ViewportConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Short intervals and a placeholder map token
    pub fn for_testing() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:0".to_string(),
            map_access_token: Some("test-token".to_string()),
            feed: FeedConfig {
                poll_interval_ms: 100,
                request_timeout_ms: 50,
            },
            viewport: ViewportConfig {
                frame_interval_ms: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(StormError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(StormError::from)?;
        Self::from_json_str(&text)
    }

    /// Applies `STORMWATCH_API_URL` and `STORMWATCH_MAP_TOKEN`
    /// (falling back to `MAPBOX_ACCESS_TOKEN`) on top of this config.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("STORMWATCH_API_URL") {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        let token = std::env::var("STORMWATCH_MAP_TOKEN")
            .or_else(|_| std::env::var("MAPBOX_ACCESS_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_some() {
            self.map_access_token = token;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(StormError::Config("api_base_url must not be empty".into()).into());
        }
        if self.feed.poll_interval_ms == 0 {
            return Err(StormError::Config("feed.poll_interval_ms must be positive".into()).into());
        }
        if self.feed.request_timeout_ms == 0
            || self.feed.request_timeout_ms >= self.feed.poll_interval_ms
        {
            return Err(StormError::Config(format!(
                "feed.request_timeout_ms ({}) must be positive and shorter than poll_interval_ms ({})",
                self.feed.request_timeout_ms, self.feed.poll_interval_ms
            ))
            .into());
        }
        if self.viewport.frame_interval_ms == 0 {
            return Err(
                StormError::Config("viewport.frame_interval_ms must be positive".into()).into(),
            );
        }
        if self.viewport.min_zoom > self.viewport.max_zoom {
            return Err(StormError::Config(format!(
                "viewport.min_zoom ({}) exceeds max_zoom ({})",
                self.viewport.min_zoom, self.viewport.max_zoom
            ))
            .into());
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
