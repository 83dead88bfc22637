//! vitals-collector - Telemetry collector for the vitals relay.
//!
//! Producers push snapshots or single-vital events; the collector merges
//! them into one current snapshot and serves it to polling dashboards.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  POST /api/telemetry  ┌──────────────────────┐
//! │ Producer │ ────────────────────▶ │ IngestionReconciler  │
//! └──────────┘                       └──────────┬───────────┘
//!                                               │ replace / merge
//!                                               ▼
//!                                    ┌──────────────────────┐
//!                                    │    SnapshotStore     │
//!                                    └──────────┬───────────┘
//!                                               │ read
//! ┌───────────┐  GET /api/telemetry  ┌──────────▼───────────┐
//! │ Dashboard │ ◀─────────────────── │  SnapshotPublisher   │
//! └───────────┘                      └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use vitals_collector::{run_server, CollectorConfig, SnapshotStore};
//!
//! let config = CollectorConfig::default().with_env_overrides();
//! run_server(SnapshotStore::new(), config, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! ```

mod config;
mod error;
mod ingest;
mod publisher;
mod server;
mod store;

pub use config::{CollectorConfig, PORT_ENV};
pub use error::{CollectorError, CollectorResult};
pub use ingest::{apply_partial, IngestOutcome, IngestionReconciler};
pub use publisher::SnapshotPublisher;
pub use server::{bind, create_router, run_server, serve, AppState};
pub use store::SnapshotStore;
