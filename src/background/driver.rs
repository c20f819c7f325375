//! Async driver for a [`Dashboard`].
//!
//! One task owns the dashboard and is the only place state is committed.
//! Poll ticks, fetch completions, user commands and frame ticks are
//! multiplexed with `select!`, so a snapshot commit and a layer switch can
//! never interleave. Fetches run on their own tasks and report back over a
//! channel, each bounded by the configured request timeout; the owning task
//! never waits on the network.

use crate::{
    core::dashboard::{Dashboard, DashboardStatus, SelectedLocation},
    feed::{
        model::RawStrike,
        poller::{FetchTicket, PollOutcome},
        source::StrikeSource,
    },
    input::handler::Command,
    layers::active::ActiveLayer,
    prelude::{Arc, Duration, Instant},
    runtime::{self, AsyncHandle},
    Result, StormError,
};
use chrono::Utc;
use log::{debug, info};
use tokio::{
    sync::{mpsc, watch},
    time::{interval, timeout, MissedTickBehavior},
};

type FetchDone = (FetchTicket, Result<Vec<RawStrike>>);

/// Control side of a running dashboard.
///
/// Dropping the handle stops the driver and tears the dashboard down.
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<DashboardStatus>,
    task: Box<dyn AsyncHandle>,
}

impl DriverHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| StormError::ChannelClosed)?;
        Ok(())
    }

    pub fn select_location(&self, location: SelectedLocation) -> Result<()> {
        self.send(Command::SelectLocation(location))
    }

    pub fn set_active_layer(&self, layer: ActiveLayer) -> Result<()> {
        self.send(Command::SetActiveLayer(layer))
    }

    pub fn set_connected(&self, connected: bool) -> Result<()> {
        self.send(Command::SetConnected(connected))
    }

    /// Latest published status
    pub fn status(&self) -> DashboardStatus {
        self.status.borrow().clone()
    }

    /// A receiver that wakes on every published status
    pub fn subscribe(&self) -> watch::Receiver<DashboardStatus> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Tear the dashboard down and wait for the final status
    pub async fn shutdown(mut self) -> DashboardStatus {
        let _ = self.commands.send(Command::Shutdown);
        let torn_down = self
            .status
            .wait_for(|status| status.torn_down)
            .await
            .map(|status| status.clone());
        match torn_down {
            Ok(status) => status,
            Err(_) => self.status.borrow().clone(),
        }
    }
}

/// Start driving `dashboard`, fetching strikes from `source`.
///
/// The dashboard should already be mounted; polling starts immediately and
/// repeats at the configured interval.
pub fn spawn_dashboard(dashboard: Dashboard, source: Arc<dyn StrikeSource>) -> DriverHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(dashboard.status());

    let task = runtime::spawn(run(dashboard, source, commands_rx, status_tx));

    DriverHandle {
        commands: commands_tx,
        status: status_rx,
        task,
    }
}

/// One fetch, bounded by `limit`. A source that does not answer in time
/// counts as a failed fetch.
async fn fetch_with_timeout(source: &dyn StrikeSource, limit: Duration) -> Result<Vec<RawStrike>> {
    match timeout(limit, source.fetch_strikes()).await {
        Ok(result) => result,
        Err(_) => Err(StormError::Timeout(limit).into()),
    }
}

async fn run(
    mut dashboard: Dashboard,
    source: Arc<dyn StrikeSource>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<DashboardStatus>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<FetchDone>();

    let min_period = Duration::from_millis(1);
    let mut poll = interval(dashboard.config().feed.poll_interval().max(min_period));
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frame = interval(dashboard.config().viewport.frame_interval().max(min_period));
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let request_timeout = dashboard.config().feed.request_timeout();
    let mut fetch: Option<Box<dyn AsyncHandle>> = None;
    info!(
        "Dashboard driver started, polling every {:?}",
        dashboard.config().feed.poll_interval()
    );

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Some(ticket) = dashboard.begin_poll() {
                    let source = Arc::clone(&source);
                    let done = done_tx.clone();
                    fetch = Some(runtime::spawn(async move {
                        let result = fetch_with_timeout(source.as_ref(), request_timeout).await;
                        let _ = done.send((ticket, result));
                    }));
                }
            }
            Some((ticket, result)) = done_rx.recv() => {
                // A discarded result belongs to a fetch that was voided
                // earlier; `fetch` may already hold a newer one.
                if dashboard.complete_poll(ticket, result, Utc::now()) != PollOutcome::Discarded {
                    fetch = None;
                }
            }
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => {
                    let was_connected = dashboard.is_connected();
                    dashboard.execute(command, Instant::now());
                    match (was_connected, dashboard.is_connected()) {
                        (true, false) => {
                            if let Some(fetch) = fetch.take() {
                                debug!("Cancelling strike fetch voided by going offline");
                                fetch.cancel();
                            }
                        }
                        (false, true) => poll.reset_immediately(),
                        _ => {}
                    }
                }
            },
            _ = frame.tick() => {
                dashboard.tick_frame(Instant::now());
            }
        }

        dashboard.process_events();
        status.send_if_modified(|current| {
            let next = dashboard.status();
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    if let Some(fetch) = fetch.take() {
        debug!("Cancelling in-flight strike fetch");
        fetch.cancel();
    }
    dashboard.teardown();
    dashboard.process_events();
    status.send_replace(dashboard.status());
    info!("Dashboard driver stopped");
}
