//! Prometheus metrics for the vitals relay.
//!
//! Covers:
//! - Collector ingestion by message shape
//! - Per-vital partial updates
//! - Dashboard poll results and connection state
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a startup bug; it only happens during
//! lazy static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, CounterVec, Encoder, Gauge, TextEncoder,
};

use crate::error::TelemetryResult;

/// Ingestion requests by message kind.
/// Labels: kind (partial/full/unrecognized/invalid)
pub static INGEST_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vitals_ingest_total",
        "Total telemetry ingestion requests by message kind",
        &["kind"]
    )
    .unwrap()
});

/// Partial updates by vital type.
/// Labels: vital_type (HEART_RATE/SPO2/STEPS/other), applied (true/false)
pub static VITAL_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vitals_vital_updates_total",
        "Total partial vital updates by vital type",
        &["vital_type", "applied"]
    )
    .unwrap()
});

/// Whether the collector holds a snapshot (1) or is waiting (0).
pub static SNAPSHOT_PRESENT: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "vitals_snapshot_present",
        "Collector holds a current snapshot (1=yes)"
    )
    .unwrap()
});

/// Dashboard poll results.
/// Labels: result (snapshot/waiting/failed/stale)
pub static POLL_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vitals_poll_total",
        "Total dashboard polls by result",
        &["result"]
    )
    .unwrap()
});

/// Dashboard connection state (1 = connected, 0 = disconnected).
pub static DASHBOARD_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "vitals_dashboard_connected",
        "Dashboard connection state (1=connected)"
    )
    .unwrap()
});

/// Metrics recording facade.
pub struct Metrics;

impl Metrics {
    /// Record an ingestion request.
    pub fn ingest(kind: &str) {
        INGEST_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a partial update and whether it changed a vital.
    ///
    /// `vital_type` must come from a fixed set; producer strings are not
    /// valid labels.
    pub fn vital_update(vital_type: &'static str, applied: bool) {
        let applied = if applied { "true" } else { "false" };
        VITAL_UPDATES_TOTAL
            .with_label_values(&[vital_type, applied])
            .inc();
    }

    /// Record that the collector now holds a snapshot.
    pub fn snapshot_present(present: bool) {
        SNAPSHOT_PRESENT.set(if present { 1.0 } else { 0.0 });
    }

    /// Record a dashboard poll result.
    pub fn poll(result: &str) {
        POLL_TOTAL.with_label_values(&[result]).inc();
    }

    /// Record dashboard connection state.
    pub fn dashboard_connected(connected: bool) {
        DASHBOARD_CONNECTED.set(if connected { 1.0 } else { 0.0 });
    }

    /// Render every registered metric in Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
