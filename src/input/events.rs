use crate::{
    core::{dashboard::SelectedLocation, geo::LatLng},
    layers::active::ActiveLayer,
};
use serde::Serialize;
use std::time::Duration;

/// Notifications the dashboard emits as it commits state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// The render surface signalled ready
    SurfaceReady,
    /// A poll replaced the strike snapshot
    SnapshotReplaced { count: usize, dropped: usize },
    /// A poll failed; the previous snapshot is still shown
    FetchFailed { error: String },
    LayerChanged { from: ActiveLayer, to: ActiveLayer },
    /// A reconciliation pass finished with `count` markers on the surface
    MarkersReconciled { count: usize },
    FlyToIssued {
        center: LatLng,
        zoom: f64,
        duration: Duration,
    },
    LocationSelected { location: SelectedLocation },
    ConnectivityChanged { connected: bool },
    TornDown,
}

impl DashboardEvent {
    /// Listener key for this event
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardEvent::SurfaceReady => "surfaceready",
            DashboardEvent::SnapshotReplaced { .. } => "snapshotreplaced",
            DashboardEvent::FetchFailed { .. } => "fetchfailed",
            DashboardEvent::LayerChanged { .. } => "layerchanged",
            DashboardEvent::MarkersReconciled { .. } => "markersreconciled",
            DashboardEvent::FlyToIssued { .. } => "flytoissued",
            DashboardEvent::LocationSelected { .. } => "locationselected",
            DashboardEvent::ConnectivityChanged { .. } => "connectivitychanged",
            DashboardEvent::TornDown => "torndown",
        }
    }
}
