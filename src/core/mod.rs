pub mod config;
pub mod constants;
pub mod dashboard;
pub mod geo;
pub mod viewport;

pub use config::DashboardConfig;
pub use dashboard::{ApiStatus, Dashboard, DashboardStatus, SelectedLocation};
pub use geo::LatLng;
pub use viewport::{ViewportController, ViewportState};
