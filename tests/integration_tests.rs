//! Dashboard behavior driven through the public API against the headless
//! surface.

use chrono::Utc;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use stormwatch::prelude::*;

fn raw_strike(lat: f64, lon: f64, intensity: f64) -> RawStrike {
    RawStrike {
        id: None,
        coordinates: LatLng::new(lat, lon),
        intensity,
        timestamp: "2024-07-04T18:30:00Z".to_string(),
    }
}

fn batch(n: usize) -> Vec<RawStrike> {
    (0..n)
        .map(|i| raw_strike(29.0 + i as f64 * 0.05, -95.0 - i as f64 * 0.05, (i % 10) as f64 + 1.0))
        .collect()
}

fn mounted_dashboard() -> (Dashboard, SurfaceInspector) {
    let provider = HeadlessProvider::new(Some("test-token".to_string()));
    let inspector = provider.inspector();
    let mut dashboard = Dashboard::new(DashboardConfig::for_testing());
    assert!(dashboard.mount(&provider));
    (dashboard, inspector)
}

fn commit(dashboard: &mut Dashboard, result: stormwatch::Result<Vec<RawStrike>>) -> PollOutcome {
    let ticket = dashboard.begin_poll().expect("poll should be allowed");
    dashboard.complete_poll(ticket, result, Utc::now())
}

fn fetch_error() -> stormwatch::Result<Vec<RawStrike>> {
    Err(StormError::Http {
        status: 502,
        endpoint: "/api/lightning".to_string(),
    }
    .into())
}

#[test]
fn test_marker_count_tracks_snapshot_and_layer() {
    let (mut dashboard, inspector) = mounted_dashboard();

    enum Step {
        Poll(usize),
        FailPoll,
        Layer(ActiveLayer),
    }

    let steps = [
        Step::Poll(3),
        Step::Layer(ActiveLayer::Weather),
        Step::Poll(7),
        Step::Layer(ActiveLayer::Lightning),
        Step::FailPoll,
        Step::Layer(ActiveLayer::Radar),
        Step::Layer(ActiveLayer::Weather),
        Step::Poll(0),
        Step::Layer(ActiveLayer::Lightning),
        Step::Poll(12),
        Step::Layer(ActiveLayer::Lightning),
        Step::Poll(4),
    ];

    for step in steps {
        match step {
            Step::Poll(n) => {
                commit(&mut dashboard, Ok(batch(n)));
            }
            Step::FailPoll => {
                commit(&mut dashboard, fetch_error());
            }
            Step::Layer(layer) => dashboard.set_active_layer(layer),
        }

        let expected = if dashboard.active_layer() == ActiveLayer::Lightning {
            dashboard.snapshot().len()
        } else {
            0
        };
        assert_eq!(dashboard.marker_count(), expected);
        assert_eq!(inspector.marker_count(), expected);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let (mut dashboard, inspector) = mounted_dashboard();
    commit(&mut dashboard, Ok(batch(6)));

    let describe = |inspector: &SurfaceInspector| {
        inspector
            .markers()
            .into_iter()
            .map(|m| (m.position, m.style.tier))
            .collect::<Vec<_>>()
    };

    dashboard.reconcile();
    let first = describe(&inspector);
    dashboard.reconcile();
    let second = describe(&inspector);

    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
}

#[test]
fn test_tier_boundaries_on_surface() {
    let (mut dashboard, inspector) = mounted_dashboard();
    let strikes = vec![
        raw_strike(10.0, 10.0, 4.0),
        raw_strike(11.0, 10.0, 5.0),
        raw_strike(12.0, 10.0, 7.0),
        raw_strike(13.0, 10.0, 8.0),
    ];
    commit(&mut dashboard, Ok(strikes));

    let tiers: Vec<_> = inspector.markers().iter().map(|m| m.style.tier).collect();
    assert_eq!(
        tiers,
        vec![
            IntensityTier::Low,
            IntensityTier::Medium,
            IntensityTier::Medium,
            IntensityTier::High
        ]
    );
    let sizes: Vec<_> = inspector.markers().iter().map(|m| m.style.size_px).collect();
    assert_eq!(sizes, vec![16, 20, 20, 24]);
}

#[test]
fn test_failed_poll_retains_previous_snapshot() {
    let (mut dashboard, _inspector) = mounted_dashboard();
    commit(&mut dashboard, Ok(batch(3)));
    let before: Vec<_> = dashboard.snapshot().iter().cloned().collect();

    let outcome = commit(&mut dashboard, fetch_error());

    assert!(matches!(outcome, PollOutcome::Retained { .. }));
    assert_eq!(dashboard.snapshot().events(), before.as_slice());
    assert!(dashboard.last_fetch_failed());
    assert_eq!(dashboard.status().strike_count, 3);

    commit(&mut dashboard, Ok(batch(1)));
    assert!(!dashboard.last_fetch_failed());
}

#[test]
fn test_each_selection_flies_once_and_layers_never_fly() {
    let (mut dashboard, inspector) = mounted_dashboard();
    let now = Instant::now();

    let a = SelectedLocation::new(LatLng::new(40.7128, -74.006), "New York");
    let b = SelectedLocation::new(LatLng::new(35.6762, 139.6503), "Tokyo");
    dashboard.select_location(a.clone(), now);
    dashboard.select_location(b.clone(), now);

    dashboard.set_active_layer(ActiveLayer::Radar);
    dashboard.set_active_layer(ActiveLayer::Lightning);
    commit(&mut dashboard, Ok(batch(2)));
    dashboard.tick_frame(now);

    let flights = inspector.fly_tos();
    assert_eq!(flights.len(), 2);
    assert_eq!(flights[0].center, a.position);
    assert_eq!(flights[1].center, b.position);
    for flight in &flights {
        assert_eq!(flight.zoom, 10.0);
        assert_eq!(flight.duration, Duration::from_millis(2000));
    }
    assert_eq!(dashboard.selected_location(), Some(&b));
}

#[test]
fn test_no_marker_mutation_after_teardown() {
    let (mut dashboard, inspector) = mounted_dashboard();
    commit(&mut dashboard, Ok(batch(5)));

    let ticket = dashboard.begin_poll().unwrap();
    dashboard.teardown();
    let mutations = inspector.mutation_count();

    let outcome = dashboard.complete_poll(ticket, Ok(batch(9)), Utc::now());
    dashboard.set_active_layer(ActiveLayer::Weather);
    dashboard.reconcile();
    dashboard.tick_frame(Instant::now());
    dashboard.teardown();

    assert_eq!(outcome, PollOutcome::Discarded);
    assert_eq!(inspector.mutation_count(), mutations);
    assert!(dashboard.begin_poll().is_none());
    assert!(inspector.is_released());
    assert_eq!(dashboard.marker_count(), 0);
}

#[test]
fn test_missing_token_degrades_to_inert_map() {
    let provider = HeadlessProvider::new(None);
    let inspector = provider.inspector();
    let mut dashboard = Dashboard::new(DashboardConfig::for_testing());

    assert!(!dashboard.mount(&provider));
    commit(&mut dashboard, Ok(batch(4)));
    dashboard.select_location(SelectedLocation::from_geolocation(1.0, 2.0), Instant::now());

    assert_eq!(dashboard.snapshot().len(), 4);
    assert_eq!(dashboard.marker_count(), 0);
    assert_eq!(inspector.acquisitions(), 0);
    assert!(!dashboard.status().loaded);
}

#[test]
fn test_markers_appear_when_surface_becomes_ready() {
    let provider = HeadlessProvider::new(Some("test-token".to_string())).deferred_ready();
    let inspector = provider.inspector();
    let mut dashboard = Dashboard::new(DashboardConfig::for_testing());
    dashboard.mount(&provider);

    commit(&mut dashboard, Ok(batch(3)));
    assert_eq!(inspector.marker_count(), 0);

    inspector.emit(SurfaceEvent::Ready);
    dashboard.tick_frame(Instant::now());
    assert_eq!(inspector.marker_count(), 3);
    assert!(dashboard.status().loaded);
}

#[test]
fn test_pointer_readout_follows_surface() {
    let (mut dashboard, inspector) = mounted_dashboard();
    inspector.emit(SurfaceEvent::PointerMoved(LatLng::new(-33.8688, 151.2093)));
    dashboard.tick_frame(Instant::now());

    assert_eq!(dashboard.pointer().readout(), "33.8688°S, 151.2093°E");
    assert_eq!(dashboard.status().pointer, LatLng::new(-33.8688, 151.2093));
}

#[test]
fn test_listeners_see_layer_and_snapshot_events() {
    let (mut dashboard, _inspector) = mounted_dashboard();
    let layer_changes = Arc::new(AtomicUsize::new(0));
    let counter = layer_changes.clone();
    dashboard.on("layerchanged", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    dashboard.set_active_layer(ActiveLayer::Weather);
    dashboard.set_active_layer(ActiveLayer::Weather);
    commit(&mut dashboard, Ok(batch(2)));
    let events = dashboard.process_events();

    assert_eq!(layer_changes.load(Ordering::SeqCst), 1);
    assert!(events.contains(&DashboardEvent::SnapshotReplaced { count: 2, dropped: 0 }));
    assert!(events.contains(&DashboardEvent::MarkersReconciled { count: 0 }));
}

#[test]
fn test_invalid_records_are_dropped_not_drawn() {
    let (mut dashboard, inspector) = mounted_dashboard();
    let mut strikes = batch(2);
    strikes.push(raw_strike(120.0, 0.0, 5.0));
    strikes.push(RawStrike {
        timestamp: "not a time".to_string(),
        ..raw_strike(1.0, 1.0, 5.0)
    });

    let outcome = commit(&mut dashboard, Ok(strikes));
    assert_eq!(outcome, PollOutcome::Replaced { count: 2, dropped: 2 });
    assert_eq!(inspector.marker_count(), 2);
}
