//! In-memory render surface.
//!
//! Records every mutation instead of drawing. Used by the headless app and
//! by tests, which inspect it through a [`SurfaceInspector`].

use crate::{
    core::geo::LatLng,
    layers::marker::MarkerStyle,
    prelude::{Arc, Duration, HashMap, Mutex},
    rendering::surface::{
        MarkerHandle, RenderSurface, SurfaceEvent, SurfaceEventSender, SurfaceProvider,
    },
    Result, StormError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub handle: MarkerHandle,
    pub position: LatLng,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlyToRecord {
    pub center: LatLng,
    pub zoom: f64,
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct HeadlessState {
    markers: HashMap<MarkerHandle, PlacedMarker>,
    next_handle: u64,
    mutations: u64,
    fly_tos: Vec<FlyToRecord>,
    view: Option<(LatLng, f64)>,
    fullscreen: bool,
    acquired: u32,
    released: bool,
    observer: Option<SurfaceEventSender>,
}

/// Read side of a headless surface, shared with whoever created it
#[derive(Debug, Clone, Default)]
pub struct SurfaceInspector {
    state: Arc<Mutex<HeadlessState>>,
}

impl SurfaceInspector {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut HeadlessState) -> R) -> R {
        match self.state.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.with_state(|s| s.markers.len())
    }

    /// Markers currently on the surface, ordered by handle
    pub fn markers(&self) -> Vec<PlacedMarker> {
        let mut markers: Vec<_> = self.with_state(|s| s.markers.values().cloned().collect());
        markers.sort_by_key(|m| m.handle);
        markers
    }

    /// Total number of place/remove calls seen
    pub fn mutation_count(&self) -> u64 {
        self.with_state(|s| s.mutations)
    }

    pub fn fly_tos(&self) -> Vec<FlyToRecord> {
        self.with_state(|s| s.fly_tos.clone())
    }

    pub fn last_view(&self) -> Option<(LatLng, f64)> {
        self.with_state(|s| s.view)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.with_state(|s| s.fullscreen)
    }

    /// How many times a surface was handed out
    pub fn acquisitions(&self) -> u32 {
        self.with_state(|s| s.acquired)
    }

    pub fn is_released(&self) -> bool {
        self.with_state(|s| s.released)
    }

    /// Plays the renderer's side of the observer channel. Returns false once
    /// the surface has been released or its owner stopped listening.
    pub fn emit(&self, event: SurfaceEvent) -> bool {
        self.with_state(|s| match &s.observer {
            Some(observer) => observer.send(event).is_ok(),
            None => false,
        })
    }
}

/// A surface that keeps its markers in memory
pub struct HeadlessSurface {
    inspector: SurfaceInspector,
}

impl HeadlessSurface {
    pub fn inspector(&self) -> SurfaceInspector {
        self.inspector.clone()
    }
}

impl RenderSurface for HeadlessSurface {
    fn place_marker(&mut self, position: LatLng, style: &MarkerStyle) -> Result<MarkerHandle> {
        self.inspector.with_state(|s| {
            if s.released {
                return Err(StormError::Surface("surface already released".into()).into());
            }
            s.next_handle += 1;
            s.mutations += 1;
            let handle = MarkerHandle(s.next_handle);
            s.markers.insert(
                handle,
                PlacedMarker {
                    handle,
                    position,
                    style: *style,
                },
            );
            Ok(handle)
        })
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.inspector.with_state(|s| {
            if s.markers.remove(&handle).is_some() {
                s.mutations += 1;
            }
        });
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.inspector.with_state(|s| s.view = Some((center, zoom)));
    }

    fn fly_to(&mut self, center: LatLng, zoom: f64, duration: Duration) {
        self.inspector.with_state(|s| {
            s.fly_tos.push(FlyToRecord {
                center,
                zoom,
                duration,
            });
            s.view = Some((center, zoom));
        });
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        self.inspector.with_state(|s| s.fullscreen = true);
        Ok(())
    }

    fn release(&mut self) {
        self.inspector.with_state(|s| {
            s.markers.clear();
            s.observer = None;
            s.released = true;
        });
    }
}

/// Hands out [`HeadlessSurface`]s.
///
/// Like a real map widget it refuses to initialize without an access token.
pub struct HeadlessProvider {
    inspector: SurfaceInspector,
    access_token: Option<String>,
    ready_on_create: bool,
}

impl HeadlessProvider {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            inspector: SurfaceInspector::new(),
            access_token,
            ready_on_create: true,
        }
    }

    /// Surfaces wait for an explicit `inspector.emit(SurfaceEvent::Ready)`
    pub fn deferred_ready(mut self) -> Self {
        self.ready_on_create = false;
        self
    }

    pub fn inspector(&self) -> SurfaceInspector {
        self.inspector.clone()
    }
}

impl SurfaceProvider for HeadlessProvider {
    fn create(&self, observer: SurfaceEventSender) -> Result<Box<dyn RenderSurface>> {
        if self.access_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(StormError::Surface("missing map access token".into()).into());
        }
        if self.ready_on_create {
            let _ = observer.send(SurfaceEvent::Ready);
        }
        self.inspector.with_state(|s| {
            s.acquired += 1;
            s.released = false;
            s.observer = Some(observer);
        });
        Ok(Box::new(HeadlessSurface {
            inspector: self.inspector.clone(),
        }))
    }
}
