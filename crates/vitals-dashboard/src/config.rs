//! Dashboard configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dashboard poller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Collector snapshot endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds (None = HTTP client default).
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// Rolling log capacity.
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,
    /// Drop responses to older polls that arrive after a newer one.
    #[serde(default)]
    pub discard_stale_responses: bool,
}

fn default_url() -> String {
    "http://localhost:3001/api/telemetry".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_max_log_entries() -> usize {
    50
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: None,
            max_log_entries: default_max_log_entries(),
            discard_stale_responses: false,
        }
    }
}

impl DashboardConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
