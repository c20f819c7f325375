pub mod events;
pub mod handler;

pub use events::DashboardEvent;
pub use handler::{Command, EventManager};
