//! Live feed polling state.
//!
//! The poller does not own a timer or spawn requests; the driver calls
//! [`FeedPoller::begin_tick`] on every interval tick and hands the fetch
//! result back through [`FeedPoller::complete`]. That keeps every commit on
//! the task that owns the dashboard, and keeps the state machine testable
//! without a runtime.

use crate::feed::model::{normalize_strikes, RawStrike, Snapshot};
use crate::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Identifies one issued fetch. A completion is only committed if its
/// ticket is still the one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

/// Health of the feed as shown in the status bar
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// No fetch has completed yet
    Idle,
    /// The last fetch succeeded
    Live { last_success: DateTime<Utc> },
    /// The last fetch failed; the previous snapshot is still displayed
    Degraded {
        last_error: String,
        consecutive_failures: u32,
        last_success: Option<DateTime<Utc>>,
    },
}

impl FeedStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FeedStatus::Degraded { .. })
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        match self {
            FeedStatus::Idle => None,
            FeedStatus::Live { last_success } => Some(*last_success),
            FeedStatus::Degraded { last_success, .. } => *last_success,
        }
    }
}

/// What a completed fetch did to the poller
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The snapshot was replaced wholesale
    Replaced { count: usize, dropped: usize },
    /// The fetch failed; the prior snapshot was kept
    Retained { error: String },
    /// The ticket was stale (disabled or cancelled meanwhile); nothing changed
    Discarded,
}

#[derive(Debug)]
pub struct FeedPoller {
    interval: Duration,
    enabled: bool,
    cancelled: bool,
    snapshot: Snapshot,
    status: FeedStatus,
    in_flight: Option<FetchTicket>,
    next_ticket: u64,
}

impl FeedPoller {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self {
            interval,
            enabled,
            cancelled: false,
            snapshot: Snapshot::empty(),
            status: FeedStatus::Idle,
            in_flight: None,
            next_ticket: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.cancelled
    }

    /// Connectivity gate. Disabling freezes the snapshot and voids any fetch
    /// already in flight. Returns whether the flag changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        if !enabled {
            self.in_flight = None;
        }
        true
    }

    /// Called on every interval tick. Returns a ticket when a fetch should
    /// be issued: polling is enabled and no earlier fetch is outstanding.
    pub fn begin_tick(&mut self) -> Option<FetchTicket> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(ticket) = self.in_flight {
            log::debug!("poll tick skipped, fetch {:?} still in flight", ticket);
            return None;
        }
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Commits a fetch result. Success replaces the snapshot in one step;
    /// failure keeps it and flips the status to degraded. Errors never
    /// propagate past this point.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawStrike>>,
        now: DateTime<Utc>,
    ) -> PollOutcome {
        if self.in_flight != Some(ticket) {
            log::debug!("discarding stale fetch result {:?}", ticket);
            return PollOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(raw) => {
                let batch = normalize_strikes(raw);
                let dropped = batch.dropped.len();
                if dropped > 0 {
                    log::warn!("dropped {} invalid strike record(s): {:?}", dropped, batch.dropped);
                }
                let generation = self.snapshot.generation() + 1;
                self.snapshot = Snapshot::new(batch.events, now, generation);
                self.status = FeedStatus::Live { last_success: now };
                log::debug!(
                    "snapshot {} committed with {} strike(s)",
                    generation,
                    self.snapshot.len()
                );
                PollOutcome::Replaced {
                    count: self.snapshot.len(),
                    dropped,
                }
            }
            Err(error) => {
                let error = error.to_string();
                let consecutive_failures = match &self.status {
                    FeedStatus::Degraded {
                        consecutive_failures,
                        ..
                    } => consecutive_failures + 1,
                    _ => 1,
                };
                log::warn!(
                    "strike fetch failed ({} in a row), keeping {} strike(s): {}",
                    consecutive_failures,
                    self.snapshot.len(),
                    error
                );
                self.status = FeedStatus::Degraded {
                    last_error: error.clone(),
                    consecutive_failures,
                    last_success: self.status.last_success(),
                };
                PollOutcome::Retained { error }
            }
        }
    }

    /// Stops polling for good. Outstanding fetches will be discarded.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.in_flight = None;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn last_fetch_failed(&self) -> bool {
        self.status.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::StormError;

    fn strikes(n: usize) -> Vec<RawStrike> {
        (0..n)
            .map(|i| RawStrike {
                id: None,
                coordinates: LatLng::new(30.0 + i as f64, -95.0),
                intensity: (i % 10) as f64 + 1.0,
                timestamp: "2024-06-01T12:00:00Z".to_string(),
            })
            .collect()
    }

    fn failure() -> Result<Vec<RawStrike>> {
        Err(StormError::Http {
            status: 503,
            endpoint: "/api/lightning".to_string(),
        }
        .into())
    }

    #[test]
    fn test_success_replaces_snapshot() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let ticket = poller.begin_tick().unwrap();
        let outcome = poller.complete(ticket, Ok(strikes(3)), Utc::now());

        assert_eq!(outcome, PollOutcome::Replaced { count: 3, dropped: 0 });
        assert_eq!(poller.snapshot().len(), 3);
        assert_eq!(poller.snapshot().generation(), 1);
        assert!(!poller.last_fetch_failed());

        let ticket = poller.begin_tick().unwrap();
        poller.complete(ticket, Ok(strikes(1)), Utc::now());
        assert_eq!(poller.snapshot().len(), 1);
        assert_eq!(poller.snapshot().generation(), 2);
    }

    #[test]
    fn test_failure_retains_prior_snapshot() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let ticket = poller.begin_tick().unwrap();
        poller.complete(ticket, Ok(strikes(3)), Utc::now());

        let ticket = poller.begin_tick().unwrap();
        let outcome = poller.complete(ticket, failure(), Utc::now());
        assert!(matches!(outcome, PollOutcome::Retained { .. }));
        assert_eq!(poller.snapshot().len(), 3);
        assert!(poller.last_fetch_failed());

        let ticket = poller.begin_tick().unwrap();
        poller.complete(ticket, failure(), Utc::now());
        match poller.status() {
            FeedStatus::Degraded {
                consecutive_failures,
                last_success,
                ..
            } => {
                assert_eq!(*consecutive_failures, 2);
                assert!(last_success.is_some());
            }
            other => panic!("expected degraded, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_poller_issues_nothing_and_freezes_snapshot() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let ticket = poller.begin_tick().unwrap();
        poller.complete(ticket, Ok(strikes(2)), Utc::now());

        assert!(poller.set_enabled(false));
        assert!(!poller.set_enabled(false));
        assert!(poller.begin_tick().is_none());
        assert_eq!(poller.snapshot().len(), 2);

        poller.set_enabled(true);
        assert!(poller.begin_tick().is_some());
    }

    #[test]
    fn test_result_after_disable_is_discarded() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let ticket = poller.begin_tick().unwrap();
        poller.set_enabled(false);

        assert_eq!(poller.complete(ticket, Ok(strikes(5)), Utc::now()), PollOutcome::Discarded);
        assert!(poller.snapshot().is_empty());
        assert_eq!(*poller.status(), FeedStatus::Idle);
    }

    #[test]
    fn test_no_overlapping_fetches() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let first = poller.begin_tick().unwrap();
        assert!(poller.begin_tick().is_none());
        poller.complete(first, Ok(strikes(1)), Utc::now());
        assert!(poller.begin_tick().is_some());
    }

    #[test]
    fn test_cancel_discards_and_stops() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let ticket = poller.begin_tick().unwrap();
        poller.cancel();
        assert_eq!(poller.complete(ticket, Ok(strikes(1)), Utc::now()), PollOutcome::Discarded);
        assert!(poller.begin_tick().is_none());
        poller.set_enabled(true);
        assert!(poller.begin_tick().is_none());
    }

    #[test]
    fn test_invalid_records_counted() {
        let mut poller = FeedPoller::new(Duration::from_secs(10), true);
        let mut raw = strikes(2);
        raw[1].coordinates = LatLng::new(120.0, 0.0);
        let ticket = poller.begin_tick().unwrap();
        assert_eq!(
            poller.complete(ticket, Ok(raw), Utc::now()),
            PollOutcome::Replaced { count: 1, dropped: 1 }
        );
    }
}
