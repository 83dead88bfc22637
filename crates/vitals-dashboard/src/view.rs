//! Dashboard view state.
//!
//! `DashboardView` accumulates independent polls into what the dashboard
//! shows: the last received snapshot, a bounded newest-first event log and
//! the connection flag.
//!
//! Reconciliation rules per poll:
//! - waiting sentinel: connected, nothing else changes
//! - snapshot: connected, snapshot overwritten, its logs prepended
//! - failure: disconnected, snapshot and logs kept as they were
//!
//! Logs are never deduplicated; polling the same snapshot twice records its
//! lines twice.

use std::collections::VecDeque;

use vitals_core::{Published, Snapshot};

use crate::error::DashboardError;

/// Default rolling log capacity.
pub const MAX_LOG_ENTRIES: usize = 50;

/// One line of the rolling event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Timestamp of the snapshot that carried the line.
    pub time: String,
    pub message: String,
}

/// What a poll did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEffect {
    /// Snapshot replaced; `new_logs` lines prepended.
    Snapshot { new_logs: usize },
    /// Collector has no data yet.
    Waiting,
    /// Poll failed; view is stale but kept.
    Disconnected,
    /// Response to an older poll arrived late and was dropped.
    Stale,
}

impl PollEffect {
    /// Label for the poll counter.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Waiting => "waiting",
            Self::Disconnected => "failed",
            Self::Stale => "stale",
        }
    }
}

/// Locally reconciled dashboard state.
#[derive(Debug, Clone)]
pub struct DashboardView {
    snapshot: Option<Snapshot>,
    logs: VecDeque<LogEntry>,
    connected: bool,
    max_logs: usize,
    discard_stale: bool,
    /// Highest poll sequence applied so far.
    last_seq: u64,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new(MAX_LOG_ENTRIES, false)
    }
}

impl DashboardView {
    /// Create an empty, disconnected view.
    pub fn new(max_logs: usize, discard_stale: bool) -> Self {
        Self {
            snapshot: None,
            logs: VecDeque::with_capacity(max_logs),
            connected: false,
            max_logs,
            discard_stale,
            last_seq: 0,
        }
    }

    /// Currently displayed snapshot.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Event log, newest first.
    pub fn logs(&self) -> &VecDeque<LogEntry> {
        &self.logs
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Apply a poll result as the newest poll.
    pub fn apply(&mut self, result: Result<Published, DashboardError>) -> PollEffect {
        self.apply_poll(self.last_seq + 1, result)
    }

    /// Apply the result of poll number `seq`.
    ///
    /// With stale discarding enabled, a result older than one already
    /// applied is dropped without touching the view.
    pub fn apply_poll(
        &mut self,
        seq: u64,
        result: Result<Published, DashboardError>,
    ) -> PollEffect {
        if self.discard_stale && seq < self.last_seq {
            return PollEffect::Stale;
        }
        self.last_seq = self.last_seq.max(seq);

        match result {
            Ok(Published::Waiting(_)) => {
                self.connected = true;
                PollEffect::Waiting
            }
            Ok(Published::Snapshot(snapshot)) => {
                self.connected = true;
                let new_logs = self.prepend_logs(&snapshot);
                self.snapshot = Some(snapshot);
                PollEffect::Snapshot { new_logs }
            }
            Err(_) => {
                self.connected = false;
                PollEffect::Disconnected
            }
        }
    }

    /// Prepend the snapshot's lines in their original order, then trim.
    fn prepend_logs(&mut self, snapshot: &Snapshot) -> usize {
        let lines = snapshot.logs();
        let time = snapshot.timestamp();
        for message in lines.iter().rev() {
            self.logs.push_front(LogEntry {
                time: time.clone(),
                message: message.clone(),
            });
        }
        self.logs.truncate(self.max_logs);
        lines.len()
    }
}
