//! Core data model for the vitals relay.
//!
//! This crate provides the types shared by the collector and the dashboard:
//! - `Snapshot`: the single authoritative telemetry record
//! - `TelemetryUpdate`: an ingestion message classified by shape
//! - `Published`: the wire value served to polling clients

pub mod error;
pub mod snapshot;
pub mod update;

pub use error::{CoreError, Result};
pub use snapshot::{
    iso_timestamp, value_text, Decision, Published, Reading, Snapshot, Status, SystemMode, Vitals,
    WaitingSentinel,
};
pub use update::{PartialUpdate, TelemetryUpdate, VitalType};
