pub mod headless;
pub mod surface;

// Re-export main types
pub use headless::{HeadlessProvider, HeadlessSurface, SurfaceInspector};
pub use surface::{MarkerHandle, RenderSurface, SurfaceEvent, SurfaceEventSender, SurfaceProvider};
