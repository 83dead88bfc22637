//! Vitals relay.
//!
//! Runs either side of the relay:
//! - `collector`: HTTP ingestion and snapshot publishing
//! - `dashboard`: polls a collector and renders the rolling view

pub mod app;
pub mod config;
pub mod error;

pub use app::{run_collector, run_dashboard, shutdown_signal};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
