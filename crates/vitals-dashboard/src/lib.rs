//! vitals-dashboard - Polling dashboard client for the vitals relay.
//!
//! The dashboard polls the collector once per interval and reconciles each
//! response into a local view:
//!
//! - `DashboardView`: displayed snapshot, rolling log (newest first, bounded), connection flag
//! - `Poller`: fixed-interval fetch loop owned by a `PollerHandle`
//! - `SnapshotSource`: HTTP transport, or a scripted mock for tests
//! - `render`: plain-text panel of the view
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use parking_lot::RwLock;
//! use vitals_dashboard::{DashboardConfig, DashboardView, HttpSnapshotSource, Poller};
//!
//! let config = DashboardConfig::default();
//! let source = Arc::new(HttpSnapshotSource::new(&config)?);
//! let view = Arc::new(RwLock::new(DashboardView::new(
//!     config.max_log_entries,
//!     config.discard_stale_responses,
//! )));
//!
//! let handle = Poller::new(source, view.clone(), config.poll_interval()).spawn();
//! // ... render `view` periodically ...
//! handle.shutdown().await;
//! ```

mod config;
mod error;
mod poller;
mod render;
mod source;
mod view;

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use poller::{Poller, PollerHandle, SharedView};
pub use render::{render, OBSERVABILITY_NOTE};
pub use source::{BoxFuture, HttpSnapshotSource, MockSnapshotSource, SnapshotSource};
pub use view::{DashboardView, LogEntry, PollEffect, MAX_LOG_ENTRIES};
