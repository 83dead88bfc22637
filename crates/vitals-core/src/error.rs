//! Error types for vitals-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Ingestion body is missing or is not a JSON object.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
