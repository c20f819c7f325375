//! The map renderer as seen by the engine.
//!
//! Anything that can draw a viewport, place and remove markers, animate
//! view transitions and report pointer positions can back the dashboard.
//! Observers ("ready", pointer-move, user view changes) are delivered over
//! the channel handed to [`SurfaceProvider::create`].

use crate::{core::geo::LatLng, layers::marker::MarkerStyle, Result};
use std::time::Duration;

/// Opaque handle to a marker placed on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Notifications from the render surface to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The surface finished loading; markers and fly-tos may now be applied
    Ready,
    /// The pointer moved over the map
    PointerMoved(LatLng),
    /// The user panned or zoomed the map directly
    ViewMoved { center: LatLng, zoom: f64 },
}

pub type SurfaceEventSender = crossbeam_channel::Sender<SurfaceEvent>;

/// An acquired map render surface
pub trait RenderSurface: Send {
    /// Draw a marker at `position`
    fn place_marker(&mut self, position: LatLng, style: &MarkerStyle) -> Result<MarkerHandle>;

    /// Remove a marker placed earlier. Unknown handles are ignored.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Jump to a view without animation
    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Animate to a view. A new call supersedes one still running.
    fn fly_to(&mut self, center: LatLng, zoom: f64, duration: Duration);

    fn request_fullscreen(&mut self) -> Result<()>;

    /// Give the surface back. Markers and observers go with it.
    fn release(&mut self);
}

/// Acquires render surfaces, e.g. a map widget bound to a credential
pub trait SurfaceProvider {
    /// `observer` must receive `SurfaceEvent::Ready` once the surface can
    /// take markers, and pointer updates for as long as it lives.
    fn create(&self, observer: SurfaceEventSender) -> Result<Box<dyn RenderSurface>>;
}
