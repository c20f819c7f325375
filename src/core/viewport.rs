use crate::{
    core::{config::ViewportConfig, geo::LatLng},
    layers::animation::FlyToAnimation,
    prelude::{Duration, Instant},
    rendering::surface::{RenderSurface, SurfaceEvent, SurfaceProvider},
};
use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Where the map is looking and where the pointer is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// Last reported pointer position
    pub pointer: LatLng,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl ViewportState {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            pointer: center,
            min_zoom: crate::constants::MIN_ZOOM,
            max_zoom: crate::constants::MAX_ZOOM,
        }
    }

    pub fn from_config(config: &ViewportConfig) -> Self {
        let mut state = Self::new(config.initial_center.to_view_center(), config.initial_zoom);
        state.min_zoom = config.min_zoom;
        state.max_zoom = config.max_zoom;
        state.zoom = state.clamp_zoom(state.zoom);
        state
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = center.to_view_center();
    }

    /// Sets the zoom level, clamping to min/max bounds
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.clamp_zoom(zoom);
    }

    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        self.set_zoom(self.zoom + delta);
        self.zoom
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default())
    }
}

/// Owns the render surface for one dashboard session.
///
/// Until `initialize` succeeds every operation is a silent no-op. Marker work
/// and fly-tos additionally wait for the surface's ready signal.
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
    surface: Option<Box<dyn RenderSurface>>,
    events: Option<Receiver<SurfaceEvent>>,
    loaded: bool,
    flight: Option<FlyToAnimation>,
    fullscreen: bool,
    torn_down: bool,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            state: ViewportState::from_config(&config),
            config,
            surface: None,
            events: None,
            loaded: false,
            flight: None,
            fullscreen: false,
            torn_down: false,
        }
    }

    /// Acquire a surface from `provider`. Returns whether the controller is
    /// initialized afterwards.
    ///
    /// Calling again once initialized does nothing. A provider failure leaves
    /// the controller inert; a torn-down controller never re-acquires.
    pub fn initialize(&mut self, provider: &dyn SurfaceProvider) -> bool {
        if self.surface.is_some() {
            return true;
        }
        if self.torn_down {
            return false;
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        match provider.create(tx) {
            Ok(mut surface) => {
                surface.set_view(self.state.center, self.state.zoom);
                self.surface = Some(surface);
                self.events = Some(rx);
                info!("Map surface acquired");
                true
            }
            Err(e) => {
                warn!("Map surface failed to initialize, staying inert: {}", e);
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn pointer(&self) -> LatLng {
        self.state.pointer
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Drain surface observers. Returns true if this call saw the surface
    /// become ready.
    pub fn pump_events(&mut self) -> bool {
        let Some(events) = self.events.as_ref() else {
            return false;
        };

        let mut became_ready = false;
        loop {
            match events.try_recv() {
                Ok(SurfaceEvent::Ready) => {
                    if !self.loaded {
                        self.loaded = true;
                        became_ready = true;
                        info!("Map surface ready");
                    }
                }
                Ok(SurfaceEvent::PointerMoved(position)) => {
                    self.state.pointer = position;
                }
                Ok(SurfaceEvent::ViewMoved { center, zoom }) => {
                    // The user took over; an in-flight animation no longer describes the view.
                    self.flight = None;
                    self.state.set_center(center);
                    self.state.set_zoom(zoom);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Surface observer channel closed");
                    break;
                }
            }
        }
        became_ready
    }

    /// Animate to `center`/`zoom`. Ignored until the surface is ready; a new
    /// request replaces any flight still in progress.
    pub fn fly_to(&mut self, center: LatLng, zoom: f64, duration: Duration, now: Instant) -> bool {
        if !self.loaded {
            return false;
        }
        self.start_flight(center, zoom, duration, now)
    }

    fn start_flight(&mut self, center: LatLng, zoom: f64, duration: Duration, now: Instant) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let target = center.to_view_center();
        let zoom = self.state.clamp_zoom(zoom);
        surface.fly_to(target, zoom, duration);
        self.flight = Some(FlyToAnimation::new(
            self.state.center,
            target,
            self.state.zoom,
            zoom,
            duration,
            now,
        ));
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.zoom_delta)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(-self.config.zoom_delta)
    }

    fn zoom_by(&mut self, delta: f64) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.flight = None;
        let zoom = self.state.zoom_by(delta);
        surface.set_view(self.state.center, zoom);
        true
    }

    /// Fly back to the home view. Needs only an initialized surface.
    pub fn reset_view(&mut self, now: Instant) -> bool {
        let (center, zoom, duration) = (
            self.config.reset_center,
            self.config.reset_zoom,
            self.config.reset_duration(),
        );
        self.start_flight(center, zoom, duration, now)
    }

    pub fn request_fullscreen(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        match surface.request_fullscreen() {
            Ok(()) => {
                self.fullscreen = true;
                true
            }
            Err(e) => {
                warn!("Fullscreen request refused: {}", e);
                false
            }
        }
    }

    /// Move `ViewportState` along the current flight
    pub fn advance(&mut self, now: Instant) {
        let Some(flight) = self.flight.as_ref() else {
            return;
        };
        let sample = flight.sample(now);
        self.state.center = sample.center;
        self.state.zoom = sample.zoom;
        if sample.is_finished() {
            self.flight = None;
        }
    }

    /// The surface, if it is ready for marker work
    pub fn loaded_surface(&mut self) -> Option<&mut (dyn RenderSurface + 'static)> {
        if !self.loaded {
            return None;
        }
        self.surface.as_deref_mut()
    }

    /// Release the surface and its observers. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.loaded = false;
        self.flight = None;
        self.events = None;
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            info!("Map surface released");
        }
    }
}

impl Drop for ViewportController {
    fn drop(&mut self) {
        self.teardown();
    }
}
