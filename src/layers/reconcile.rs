//! Keeps the markers on the render surface in step with the feed.
//!
//! Every pass is a full rebuild: strike ids are not stable across polls, so
//! the reconciler removes everything it placed before and places one marker
//! per event again. Removal walks the handles this type owns and never asks
//! the surface what it is showing.

use crate::{
    feed::model::Snapshot,
    layers::{active::ActiveLayer, marker::StrikeMarker},
    rendering::surface::{MarkerHandle, RenderSurface},
};
use log::{debug, warn};

/// A marker currently on the surface
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub handle: MarkerHandle,
    pub marker: StrikeMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Markers were rebuilt from the snapshot
    Rebuilt { placed: usize, removed: usize },
    /// The active layer hides markers; everything was removed
    Cleared { removed: usize },
    /// No usable surface; nothing was touched
    Skipped,
}

#[derive(Debug, Default)]
pub struct MarkerReconciler {
    markers: Vec<RenderedMarker>,
    passes: u64,
}

impl MarkerReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the marker set for `snapshot` under `layer`.
    ///
    /// A placement failure rolls back the partial rebuild and reports
    /// `Skipped`; the next trigger tries again from scratch.
    pub fn reconcile(
        &mut self,
        snapshot: &Snapshot,
        layer: ActiveLayer,
        surface: &mut dyn RenderSurface,
    ) -> ReconcileOutcome {
        self.passes += 1;
        let removed = self.clear(surface);

        if !layer.shows_markers() {
            debug!("Cleared {} markers for {} layer", removed, layer);
            return ReconcileOutcome::Cleared { removed };
        }

        let mut placed = Vec::with_capacity(snapshot.len());
        for strike in snapshot.iter() {
            let marker = StrikeMarker::from_strike(strike);
            match surface.place_marker(marker.position, &marker.style) {
                Ok(handle) => placed.push(RenderedMarker { handle, marker }),
                Err(e) => {
                    warn!("Failed to place marker for strike {}: {}", strike.id, e);
                    for rendered in placed.drain(..) {
                        surface.remove_marker(rendered.handle);
                    }
                    return ReconcileOutcome::Skipped;
                }
            }
        }

        self.markers = placed;
        debug!(
            "Rebuilt {} markers from snapshot generation {} (removed {})",
            self.markers.len(),
            snapshot.generation(),
            removed
        );
        ReconcileOutcome::Rebuilt {
            placed: self.markers.len(),
            removed,
        }
    }

    /// Remove every owned marker from `surface`
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) -> usize {
        let removed = self.markers.len();
        for rendered in self.markers.drain(..) {
            surface.remove_marker(rendered.handle);
        }
        removed
    }

    /// Drop the handles without touching a surface, for when the surface
    /// itself is gone.
    pub fn forget(&mut self) -> usize {
        let forgotten = self.markers.len();
        self.markers.clear();
        forgotten
    }

    pub fn markers(&self) -> &[RenderedMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Number of reconciliation passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        feed::model::{StrikeEvent, StrikeId},
        layers::marker::{IntensityTier, MarkerStyle},
        rendering::{
            headless::HeadlessProvider,
            surface::{SurfaceProvider, SurfaceEvent},
        },
        Result, StormError,
    };
    use chrono::{TimeZone, Utc};

    fn strike(i: usize, lat: f64, intensity: i32) -> StrikeEvent {
        StrikeEvent {
            id: StrikeId::Index(i),
            coordinates: LatLng::new(lat, -122.0),
            intensity,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn snapshot(intensities: &[i32]) -> Snapshot {
        let events = intensities
            .iter()
            .enumerate()
            .map(|(i, v)| strike(i, 37.0 + i as f64 * 0.1, *v))
            .collect();
        Snapshot::new(events, Utc::now(), 1)
    }

    fn surface() -> (Box<dyn RenderSurface>, crate::rendering::headless::SurfaceInspector) {
        let (tx, _rx) = crossbeam_channel::unbounded::<SurfaceEvent>();
        let provider = HeadlessProvider::new(Some("token".into()));
        let inspector = provider.inspector();
        (provider.create(tx).unwrap(), inspector)
    }

    #[test]
    fn test_rebuild_places_one_marker_per_event() {
        let (mut surface, inspector) = surface();
        let mut reconciler = MarkerReconciler::new();

        let outcome = reconciler.reconcile(&snapshot(&[3, 6, 9]), ActiveLayer::Lightning, surface.as_mut());
        assert_eq!(outcome, ReconcileOutcome::Rebuilt { placed: 3, removed: 0 });
        assert_eq!(inspector.marker_count(), 3);

        let tiers: Vec<_> = reconciler.markers().iter().map(|m| m.marker.tier()).collect();
        assert_eq!(tiers, vec![IntensityTier::Low, IntensityTier::Medium, IntensityTier::High]);
    }

    #[test]
    fn test_rebuild_twice_does_not_accumulate() {
        let (mut surface, inspector) = surface();
        let mut reconciler = MarkerReconciler::new();
        let snap = snapshot(&[1, 8]);

        reconciler.reconcile(&snap, ActiveLayer::Lightning, surface.as_mut());
        let first: Vec<_> = inspector.markers().into_iter().map(|m| (m.position, m.style)).collect();
        let outcome = reconciler.reconcile(&snap, ActiveLayer::Lightning, surface.as_mut());
        let second: Vec<_> = inspector.markers().into_iter().map(|m| (m.position, m.style)).collect();

        assert_eq!(outcome, ReconcileOutcome::Rebuilt { placed: 2, removed: 2 });
        assert_eq!(first, second);
        assert_eq!(reconciler.passes(), 2);
    }

    #[test]
    fn test_non_lightning_layer_clears() {
        let (mut surface, inspector) = surface();
        let mut reconciler = MarkerReconciler::new();
        let snap = snapshot(&[5, 5]);

        reconciler.reconcile(&snap, ActiveLayer::Lightning, surface.as_mut());
        let outcome = reconciler.reconcile(&snap, ActiveLayer::Weather, surface.as_mut());
        assert_eq!(outcome, ReconcileOutcome::Cleared { removed: 2 });
        assert!(reconciler.is_empty());
        assert_eq!(inspector.marker_count(), 0);
    }

    struct FlakySurface {
        placed: Vec<MarkerHandle>,
        fail_after: usize,
    }

    impl RenderSurface for FlakySurface {
        fn place_marker(&mut self, _position: LatLng, _style: &MarkerStyle) -> Result<MarkerHandle> {
            if self.placed.len() >= self.fail_after {
                return Err(StormError::Surface("renderer busy".into()).into());
            }
            let handle = MarkerHandle(self.placed.len() as u64);
            self.placed.push(handle);
            Ok(handle)
        }

        fn remove_marker(&mut self, handle: MarkerHandle) {
            self.placed.retain(|h| *h != handle);
        }

        fn set_view(&mut self, _center: LatLng, _zoom: f64) {}

        fn fly_to(&mut self, _center: LatLng, _zoom: f64, _duration: std::time::Duration) {}

        fn request_fullscreen(&mut self) -> Result<()> {
            Ok(())
        }

        fn release(&mut self) {}
    }

    #[test]
    fn test_failed_placement_rolls_back() {
        let mut surface = FlakySurface {
            placed: Vec::new(),
            fail_after: 2,
        };
        let mut reconciler = MarkerReconciler::new();

        let outcome = reconciler.reconcile(&snapshot(&[1, 2, 3]), ActiveLayer::Lightning, &mut surface);
        assert_eq!(outcome, ReconcileOutcome::Skipped);
        assert!(surface.placed.is_empty());
        assert!(reconciler.is_empty());
    }
}
