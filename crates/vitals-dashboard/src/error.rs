//! Dashboard error types.

use thiserror::Error;

/// Poll failures. Each one only flips the view to disconnected.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
