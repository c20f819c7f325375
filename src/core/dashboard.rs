//! The dashboard orchestrator.
//!
//! [`Dashboard`] composes the viewport controller, feed poller, layer state
//! and marker reconciler behind one owner. Every commit (a snapshot, a layer
//! switch, a ready signal) goes through `&mut self`, so reconciliation always
//! reads a whole snapshot and the current layer. The async driver in
//! `background::driver` is one such owner; tests drive it directly.

use crate::{
    core::{
        config::DashboardConfig,
        geo::LatLng,
        viewport::{ViewportController, ViewportState},
    },
    feed::{
        model::{RawStrike, Snapshot},
        poller::{FeedPoller, FetchTicket, PollOutcome},
    },
    input::{
        events::DashboardEvent,
        handler::{Command, EventManager},
    },
    layers::{
        active::{legend_for, ActiveLayer, LayerState, LegendPanel},
        reconcile::{MarkerReconciler, ReconcileOutcome},
    },
    prelude::Instant,
    rendering::surface::SurfaceProvider,
    Result,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A place chosen by city search or device geolocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub position: LatLng,
    pub name: String,
}

impl SelectedLocation {
    pub fn new(position: LatLng, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }

    /// A device position, named by its coordinates
    pub fn from_geolocation(lat: f64, lon: f64) -> Self {
        Self::new(LatLng::new(lat, lon), format!("{:.4}, {:.4}", lat, lon))
    }
}

/// Status-bar API indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Connected,
    Degraded,
    Offline,
}

/// Read-only view of the dashboard for the surrounding UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatus {
    pub api_status: ApiStatus,
    pub last_update: Option<DateTime<Utc>>,
    pub strike_count: usize,
    pub marker_count: usize,
    pub active_layer: ActiveLayer,
    pub pointer: LatLng,
    pub center: LatLng,
    pub zoom: f64,
    pub selected_location: Option<String>,
    pub loaded: bool,
    pub torn_down: bool,
}

impl DashboardStatus {
    pub fn last_fetch_failed(&self) -> bool {
        self.api_status == ApiStatus::Degraded
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    viewport: ViewportController,
    poller: FeedPoller,
    layers: LayerState,
    reconciler: MarkerReconciler,
    selected: Option<SelectedLocation>,
    /// A selection that arrived before the surface was ready
    pending_fly: bool,
    events: EventManager,
    torn_down: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            viewport: ViewportController::new(config.viewport.clone()),
            poller: FeedPoller::new(config.feed.poll_interval(), config.start_connected),
            layers: LayerState::default(),
            reconciler: MarkerReconciler::new(),
            selected: None,
            pending_fly: false,
            events: EventManager::new(),
            torn_down: false,
            config,
        }
    }

    /// Acquire the render surface. A failure leaves the dashboard running
    /// without a map; polling and layer state still work.
    pub fn mount(&mut self, provider: &dyn SurfaceProvider) -> bool {
        let mounted = self.viewport.initialize(provider);
        if mounted {
            self.sync_surface(Instant::now());
        }
        mounted
    }

    /// Drain surface observers and react to the ready signal
    fn sync_surface(&mut self, now: Instant) {
        if !self.viewport.pump_events() {
            return;
        }
        self.events.emit(DashboardEvent::SurfaceReady);
        if self.pending_fly {
            self.pending_fly = false;
            self.fly_to_selected(now);
        }
        self.reconcile();
    }

    fn fly_to_selected(&mut self, now: Instant) -> bool {
        let Some(location) = self.selected.as_ref() else {
            return false;
        };
        let zoom = self.config.viewport.fly_to_zoom;
        let duration = self.config.viewport.fly_to_duration();
        let center = location.position;
        if !self.viewport.fly_to(center, zoom, duration, now) {
            return false;
        }
        self.events.emit(DashboardEvent::FlyToIssued {
            center,
            zoom,
            duration,
        });
        true
    }

    /// Record a new selection and fly to it, once. A selection made before
    /// the surface is ready is flown to when it becomes ready.
    pub fn select_location(&mut self, location: SelectedLocation, now: Instant) {
        if self.torn_down {
            return;
        }
        info!("Location selected: {} ({})", location.name, location.position);
        self.selected = Some(location.clone());
        self.events.emit(DashboardEvent::LocationSelected { location });
        self.pending_fly = !self.fly_to_selected(now) && !self.viewport.is_loaded();
    }

    pub fn set_active_layer(&mut self, layer: ActiveLayer) {
        if self.torn_down {
            return;
        }
        let Some(transition) = self.layers.select(layer) else {
            return;
        };
        info!("Layer switched from {} to {}", transition.from, transition.to);
        self.events.emit(DashboardEvent::LayerChanged {
            from: transition.from,
            to: transition.to,
        });
        self.reconcile();
    }

    /// Upstream connectivity. Going offline pauses polling and freezes the
    /// current snapshot.
    pub fn set_connected(&mut self, connected: bool) {
        if self.torn_down || !self.poller.set_enabled(connected) {
            return;
        }
        info!("Connectivity changed: {}", if connected { "online" } else { "offline" });
        self.events.emit(DashboardEvent::ConnectivityChanged { connected });
    }

    /// Start a poll cycle. `None` while offline, torn down, or while the
    /// previous fetch is still outstanding.
    pub fn begin_poll(&mut self) -> Option<FetchTicket> {
        if self.torn_down {
            return None;
        }
        self.poller.begin_tick()
    }

    /// Commit the result of a fetch started by [`Dashboard::begin_poll`]
    pub fn complete_poll(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawStrike>>,
        now: DateTime<Utc>,
    ) -> PollOutcome {
        if self.torn_down {
            return PollOutcome::Discarded;
        }
        let outcome = self.poller.complete(ticket, result, now);
        match &outcome {
            PollOutcome::Replaced { count, dropped } => {
                self.events.emit(DashboardEvent::SnapshotReplaced {
                    count: *count,
                    dropped: *dropped,
                });
                self.reconcile();
            }
            PollOutcome::Retained { error } => {
                self.events.emit(DashboardEvent::FetchFailed {
                    error: error.clone(),
                });
            }
            PollOutcome::Discarded => {}
        }
        outcome
    }

    /// Per-frame housekeeping: surface observers and fly-to progress
    pub fn tick_frame(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        self.sync_surface(now);
        self.viewport.advance(now);
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    pub fn reset_view(&mut self, now: Instant) -> bool {
        if !self.viewport.reset_view(now) {
            return false;
        }
        let viewport = &self.config.viewport;
        self.events.emit(DashboardEvent::FlyToIssued {
            center: viewport.reset_center,
            zoom: viewport.reset_zoom,
            duration: viewport.reset_duration(),
        });
        true
    }

    pub fn request_fullscreen(&mut self) -> bool {
        self.viewport.request_fullscreen()
    }

    /// Apply a user command. Returns false once the dashboard is torn down.
    pub fn execute(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::SelectLocation(location) => self.select_location(location, now),
            Command::SetActiveLayer(layer) => self.set_active_layer(layer),
            Command::SetConnected(connected) => self.set_connected(connected),
            Command::ZoomIn => {
                self.zoom_in();
            }
            Command::ZoomOut => {
                self.zoom_out();
            }
            Command::ResetView => {
                self.reset_view(now);
            }
            Command::RequestFullscreen => {
                self.request_fullscreen();
            }
            Command::Shutdown => self.teardown(),
        }
        !self.torn_down
    }

    /// Rebuild the markers from the committed snapshot and layer.
    ///
    /// Without a ready surface the pass is skipped; the next trigger
    /// (snapshot, layer switch or ready signal) runs it again.
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        if self.torn_down {
            return ReconcileOutcome::Skipped;
        }
        let outcome = match self.viewport.loaded_surface() {
            Some(surface) => {
                self.reconciler
                    .reconcile(self.poller.snapshot(), self.layers.active(), surface)
            }
            None => {
                self.reconciler.forget();
                ReconcileOutcome::Skipped
            }
        };
        if outcome != ReconcileOutcome::Skipped {
            self.events.emit(DashboardEvent::MarkersReconciled {
                count: self.reconciler.len(),
            });
        }
        outcome
    }

    /// Stop polling, remove markers and release the surface. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.poller.cancel();
        self.pending_fly = false;
        if let Some(surface) = self.viewport.loaded_surface() {
            let removed = self.reconciler.clear(surface);
            debug!("Removed {} markers on teardown", removed);
        }
        self.reconciler.forget();
        self.viewport.teardown();
        self.events.emit(DashboardEvent::TornDown);
        info!("Dashboard torn down");
    }

    /// Register a listener for one [`DashboardEvent::kind`]
    pub fn on<F>(&mut self, event_kind: &str, callback: F)
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        self.events.on(event_kind, callback);
    }

    /// Deliver queued events to listeners and return them
    pub fn process_events(&mut self) -> Vec<DashboardEvent> {
        self.events.process_events()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.poller.snapshot()
    }

    pub fn marker_count(&self) -> usize {
        self.reconciler.len()
    }

    pub fn last_fetch_failed(&self) -> bool {
        self.poller.last_fetch_failed()
    }

    pub fn pointer(&self) -> LatLng {
        self.viewport.pointer()
    }

    pub fn active_layer(&self) -> ActiveLayer {
        self.layers.active()
    }

    pub fn legend(&self) -> LegendPanel {
        legend_for(self.layers.active())
    }

    pub fn selected_location(&self) -> Option<&SelectedLocation> {
        self.selected.as_ref()
    }

    pub fn viewport_state(&self) -> &ViewportState {
        self.viewport.state()
    }

    pub fn is_loaded(&self) -> bool {
        self.viewport.is_loaded()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_connected(&self) -> bool {
        self.poller.is_enabled()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn status(&self) -> DashboardStatus {
        let api_status = if !self.poller.is_enabled() {
            ApiStatus::Offline
        } else if self.poller.last_fetch_failed() {
            ApiStatus::Degraded
        } else {
            ApiStatus::Connected
        };
        let view = self.viewport.state();
        DashboardStatus {
            api_status,
            last_update: self.poller.status().last_success(),
            strike_count: self.poller.snapshot().len(),
            marker_count: self.reconciler.len(),
            active_layer: self.layers.active(),
            pointer: view.pointer,
            center: view.center,
            zoom: view.zoom,
            selected_location: self.selected.as_ref().map(|l| l.name.clone()),
            loaded: self.viewport.is_loaded(),
            torn_down: self.torn_down,
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.teardown();
    }
}
