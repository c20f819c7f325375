//! Engine-wide fixed numbers for the lightning dashboard.

/// How often the live strike feed is polled while connected.
pub const POLL_INTERVAL_MS: u64 = 10_000;

/// Per-request timeout for feed fetches. Shorter than the poll interval so a
/// hung request never overlaps the next tick.
pub const FEED_REQUEST_TIMEOUT_MS: u64 = 8_000;

/// Zoom level used when flying to a selected location.
pub const FLY_TO_ZOOM: f64 = 10.0;

/// Animation duration used when flying to a selected location.
pub const FLY_TO_DURATION_MS: u64 = 2_000;

/// Initial and reset view: San Francisco.
pub const DEFAULT_CENTER: (f64, f64) = (37.7749, -122.4194);

/// Initial and reset zoom level.
pub const DEFAULT_ZOOM: f64 = 9.0;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// How often the driver advances viewport animations and drains surface observers.
pub const FRAME_INTERVAL_MS: u64 = 33;

/// Lowest intensity rendered in the medium tier.
pub const MEDIUM_TIER_MIN_INTENSITY: i32 = 5;

/// Lowest intensity rendered in the high tier.
pub const HIGH_TIER_MIN_INTENSITY: i32 = 8;

/// Period of the cosmetic marker pulse.
pub const MARKER_PULSE_PERIOD_MS: u64 = 1_000;

/// Number of bars in an intensity gauge.
pub const INTENSITY_BAR_COUNT: usize = 10;

/// City search is only issued once the query has at least this many characters.
pub const SEARCH_MIN_QUERY_LEN: usize = 2;

/// How long a city search response stays valid in the cache.
pub const SEARCH_CACHE_TTL_SECS: u64 = 300;

/// Maximum number of distinct queries kept in the search cache.
pub const SEARCH_CACHE_CAPACITY: usize = 256;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

pub const USER_AGENT: &str = concat!("stormwatch/", env!("CARGO_PKG_VERSION"));
