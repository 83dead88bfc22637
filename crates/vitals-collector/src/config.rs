//! Collector configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable selecting the listen port.
pub const PORT_ENV: &str = "PORT";

/// Collector server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Port to listen on (all interfaces).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of built dashboard assets (None = API only).
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    3001
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: None,
        }
    }
}

impl CollectorConfig {
    /// Apply `PORT` from the environment, if set and valid.
    pub fn with_env_overrides(self) -> Self {
        self.with_port_override(std::env::var(PORT_ENV).ok().as_deref())
    }

    fn with_port_override(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid PORT"),
            }
        }
        self
    }
}
