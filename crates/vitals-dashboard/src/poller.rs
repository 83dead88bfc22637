//! Fixed-interval snapshot poller.
//!
//! Every tick spawns its own fetch, whatever happened to the previous one:
//! no backoff, no coalescing. Fetches may overlap and finish out of order;
//! each result is applied to the shared view as it arrives.
//!
//! The returned `PollerHandle` owns the loop. Shutting it down or dropping
//! it cancels the ticker and every in-flight fetch.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vitals_telemetry::Metrics;

use crate::source::SnapshotSource;
use crate::view::{DashboardView, PollEffect};

/// View shared between the poller and the renderer.
pub type SharedView = Arc<RwLock<DashboardView>>;

/// Polls a `SnapshotSource` into a `SharedView`.
pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    view: SharedView,
    interval: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn SnapshotSource>, view: SharedView, interval: Duration) -> Self {
        Self {
            source,
            view,
            interval,
        }
    }

    /// Start polling. The first fetch fires one interval from now.
    pub fn spawn(self) -> PollerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(token.clone()));
        PollerHandle {
            token,
            task: Some(task),
        }
    }

    async fn run(self, token: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();
        let mut seq: u64 = 0;

        info!(interval_ms = self.interval.as_millis() as u64, "Dashboard polling started");

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    seq += 1;
                    in_flight.spawn(poll_once(self.source.clone(), self.view.clone(), seq));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Poll task failed");
                    }
                }
            }
        }

        let pending = in_flight.len();
        in_flight.shutdown().await;
        info!(polls = seq, cancelled = pending, "Dashboard polling stopped");
    }
}

/// Fetch once and reconcile the result into the view.
async fn poll_once(source: Arc<dyn SnapshotSource>, view: SharedView, seq: u64) {
    let result = source.fetch().await;
    if let Err(e) = &result {
        debug!(seq, error = %e, "Poll failed");
    }

    let (effect, connected) = {
        let mut view = view.write();
        let effect = view.apply_poll(seq, result);
        (effect, view.is_connected())
    };

    Metrics::poll(effect.label());
    Metrics::dashboard_connected(connected);
    match effect {
        PollEffect::Snapshot { new_logs } => debug!(seq, new_logs, "Applied snapshot"),
        PollEffect::Waiting => debug!(seq, "Collector waiting for data"),
        PollEffect::Disconnected => {}
        PollEffect::Stale => debug!(seq, "Discarded stale response"),
    }
}

/// Owns a running poll loop.
#[must_use = "dropping the handle stops polling"]
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling and wait until the loop and its fetches are gone.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Poll loop ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
