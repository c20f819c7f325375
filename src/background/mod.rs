pub mod driver;

pub use driver::{spawn_dashboard, DriverHandle};
