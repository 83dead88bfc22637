//! Ingestion reconciler.
//!
//! Applies classified telemetry messages to the snapshot store:
//! - partial update: one vital plus optional status fields, logs replaced
//! - full snapshot: wholesale replacement
//! - unrecognized: dropped with a warning, store untouched
//!
//! The caller always acknowledges; the outcome is for logs and metrics only.

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use vitals_core::{value_text, PartialUpdate, Snapshot, TelemetryUpdate, VitalType};
use vitals_telemetry::Metrics;

use crate::store::SnapshotStore;

/// What an ingested message did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Partial update merged. `applied` is false when no vital changed.
    Partial { vital_type: VitalType, applied: bool },
    /// Snapshot replaced.
    Full,
    /// Message discarded.
    Unrecognized,
}

/// Merges producer messages into the current snapshot.
#[derive(Debug, Clone)]
pub struct IngestionReconciler {
    store: SnapshotStore,
}

impl IngestionReconciler {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Decode and apply a raw request body.
    ///
    /// # Errors
    /// `CoreError::InvalidPayload` when the body is empty, not JSON, or not
    /// an object. The store is untouched in that case.
    pub fn ingest_bytes(&self, body: &[u8]) -> vitals_core::Result<IngestOutcome> {
        let update = TelemetryUpdate::from_slice(body, Utc::now())?;
        Ok(self.apply(update))
    }

    /// Classify and apply an already decoded body.
    pub fn ingest_value(&self, body: Value) -> vitals_core::Result<IngestOutcome> {
        let update = TelemetryUpdate::classify(body, Utc::now())?;
        Ok(self.apply(update))
    }

    /// Apply a classified message.
    pub fn apply(&self, update: TelemetryUpdate) -> IngestOutcome {
        Metrics::ingest(update.kind());

        let outcome = match update {
            TelemetryUpdate::Partial(partial) => {
                let applied = self.store.merge(
                    || Snapshot::initial(value_text(&partial.timestamp)),
                    |snapshot| apply_partial(snapshot, &partial),
                );
                Metrics::vital_update(partial.vital_type.metric_label(), applied);
                info!(
                    vital_type = %partial.vital_type,
                    value = ?partial.value,
                    applied,
                    "Updated vital"
                );
                IngestOutcome::Partial {
                    vital_type: partial.vital_type,
                    applied,
                }
            }
            TelemetryUpdate::Full(snapshot) => {
                info!(
                    timestamp = %snapshot.timestamp(),
                    fields = snapshot.as_map().len(),
                    "Received full snapshot"
                );
                self.store.replace(snapshot);
                IngestOutcome::Full
            }
            TelemetryUpdate::Unrecognized(body) => {
                warn!(body = %body, "Received unknown data format");
                IngestOutcome::Unrecognized
            }
        };

        Metrics::snapshot_present(self.store.has_snapshot());
        outcome
    }
}

/// Merge a partial update into `snapshot`.
///
/// The value is stored as sent, so the vital and the log line always agree.
/// Returns false for unknown vital types, which change no vital; timestamp,
/// status fields and the log line are applied regardless.
pub fn apply_partial(snapshot: &mut Snapshot, update: &PartialUpdate) -> bool {
    snapshot.set_timestamp(update.timestamp.clone());

    let applied = match update.vital_type.field() {
        Some(field) => {
            snapshot.set_vital(field, update.value.clone());
            true
        }
        None => false,
    };

    if let Some(mode) = &update.system_mode {
        snapshot.set_status_field("system_mode", mode.clone());
    }
    if let Some(decision) = &update.decision {
        snapshot.set_status_field("decision", decision.clone());
    }

    snapshot.set_logs(vec![update.log_message()]);
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reconciler() -> (IngestionReconciler, SnapshotStore) {
        let store = SnapshotStore::new();
        (IngestionReconciler::new(store.clone()), store)
    }

    fn full_snapshot() -> Value {
        json!({
            "timestamp": "2025-03-01T10:00:00.000Z",
            "vitals": {"heart_rate": 72, "spo2": 98, "steps": 4000},
            "status": {"system_mode": "NORMAL", "anomaly_score": 12, "decision": "NONE"},
            "logs": ["System verified", "Sensor A: OK"]
        })
    }

    fn published(store: &SnapshotStore) -> Value {
        serde_json::to_value(store.current().unwrap()).unwrap()
    }

    #[test]
    fn test_heart_rate_update_leaves_other_vitals() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();

        let outcome = reconciler
            .ingest_value(json!({"vital_type": "HEART_RATE", "value": 101}))
            .unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Partial {
                vital_type: VitalType::HeartRate,
                applied: true
            }
        );

        let published = published(&store);
        assert_eq!(
            published["vitals"],
            json!({"heart_rate": 101, "spo2": 98, "steps": 4000})
        );
        assert_eq!(published["status"]["anomaly_score"], 12);
    }

    #[test]
    fn test_sequential_partials_scenario() {
        let (reconciler, store) = reconciler();
        reconciler
            .ingest_value(json!({"vital_type": "SPO2", "value": 91}))
            .unwrap();
        reconciler
            .ingest_value(json!({"vital_type": "HEART_RATE", "value": 130}))
            .unwrap();

        let published = published(&store);
        assert_eq!(
            published["vitals"],
            json!({"heart_rate": 130, "spo2": 91, "steps": 0})
        );
        assert_eq!(published["logs"], json!(["HEART_RATE updated to 130"]));
        assert_eq!(published["status"]["system_mode"], "WAITING");
    }

    #[test]
    fn test_partial_overwrites_status_and_timestamp() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();
        reconciler
            .ingest_value(json!({
                "vital_type": "STEPS",
                "value": 4100,
                "status": "CRITICAL",
                "decision": "TRIGGERED",
                "timestamp": "2025-03-01T10:00:05.000Z"
            }))
            .unwrap();

        let published = published(&store);
        assert_eq!(published["timestamp"], "2025-03-01T10:00:05.000Z");
        assert_eq!(published["status"]["system_mode"], "CRITICAL");
        assert_eq!(published["status"]["decision"], "TRIGGERED");
        assert_eq!(published["logs"], json!(["STEPS updated to 4100"]));
    }

    #[test]
    fn test_unknown_vital_type_updates_no_vital() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();
        let outcome = reconciler
            .ingest_value(json!({"vital_type": "TEMPERATURE", "value": 39}))
            .unwrap();

        assert!(matches!(
            outcome,
            IngestOutcome::Partial { applied: false, .. }
        ));
        let published = published(&store);
        assert_eq!(
            published["vitals"],
            json!({"heart_rate": 72, "spo2": 98, "steps": 4000})
        );
        assert_eq!(published["logs"], json!(["TEMPERATURE updated to 39"]));
    }

    #[test]
    fn test_non_integer_value_stored_as_logged() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();

        for (value, line) in [
            (json!(98.5), "SPO2 updated to 98.5"),
            (json!("low"), "SPO2 updated to low"),
        ] {
            reconciler
                .ingest_value(json!({"vital_type": "SPO2", "value": value.clone()}))
                .unwrap();
            let published = published(&store);
            assert_eq!(published["vitals"]["spo2"], value);
            assert_eq!(published["logs"], json!([line]));
        }
    }

    #[test]
    fn test_missing_value_clears_vital() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();
        reconciler
            .ingest_value(json!({"vital_type": "SPO2"}))
            .unwrap();

        let published = published(&store);
        assert!(published["vitals"].get("spo2").is_none());
        assert_eq!(published["logs"], json!(["SPO2 updated to undefined"]));
    }

    #[test]
    fn test_partial_onto_sparse_snapshot_adds_blocks() {
        let (reconciler, store) = reconciler();
        reconciler
            .ingest_value(json!({"timestamp": "t", "vitals": {"heart_rate": 72}}))
            .unwrap();
        reconciler
            .ingest_value(json!({"vital_type": "STEPS", "value": 9, "decision": "TRIGGERED"}))
            .unwrap();

        let published = published(&store);
        assert_eq!(published["vitals"], json!({"heart_rate": 72, "steps": 9}));
        assert_eq!(published["status"], json!({"decision": "TRIGGERED"}));
    }

    #[test]
    fn test_full_snapshot_replaces_everything() {
        let (reconciler, store) = reconciler();
        reconciler
            .ingest_value(json!({"vital_type": "SPO2", "value": 91}))
            .unwrap();

        let input = full_snapshot();
        assert_eq!(reconciler.ingest_value(input.clone()).unwrap(), IngestOutcome::Full);
        assert_eq!(published(&store), input);
    }

    #[test]
    fn test_full_snapshot_published_exactly_as_sent() {
        let (reconciler, store) = reconciler();
        let cases = [
            json!({
                "timestamp": "2025-03-01T10:00:00.000Z",
                "vitals": {"heart_rate": 72, "spo2": 98, "steps": 1, "temperature": 36.6},
                "status": {"system_mode": "NORMAL", "anomaly_score": 3, "decision": "NONE", "source": "x"},
                "logs": []
            }),
            json!({"timestamp": "t", "vitals": {"heart_rate": 72}}),
            json!({"timestamp": "t", "vitals": {"heart_rate": 72.5}}),
            json!({"timestamp": 1740823200, "vitals": {"spo2": 97}, "status": {"system_mode": "OFFLINE"}}),
        ];

        for input in cases {
            let outcome = reconciler.ingest_value(input.clone()).unwrap();
            assert_eq!(outcome, IngestOutcome::Full, "input: {input}");
            assert_eq!(published(&store), input);
        }
    }

    #[test]
    fn test_unrecognized_shape_leaves_store() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();
        let before = store.current();

        let outcome = reconciler.ingest_value(json!({"heart": 1})).unwrap();
        assert_eq!(outcome, IngestOutcome::Unrecognized);
        assert_eq!(store.current(), before);
    }

    #[test]
    fn test_invalid_payload_leaves_store() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(full_snapshot()).unwrap();
        let before = store.current();

        let bodies: [&[u8]; 4] = [b"\"hello\"", b"null", b"42", b"{not json"];
        for body in bodies {
            assert!(reconciler.ingest_bytes(body).is_err());
        }
        assert_eq!(store.current(), before);
    }

    #[test]
    fn test_unrecognized_before_any_snapshot_stays_empty() {
        let (reconciler, store) = reconciler();
        reconciler.ingest_value(json!({"foo": "bar"})).unwrap();
        assert!(!store.has_snapshot());
    }

    #[test]
    fn test_unknown_vital_types_share_one_metric_series() {
        let (reconciler, _store) = reconciler();
        for i in 0..50 {
            reconciler
                .ingest_value(json!({"vital_type": format!("X{i}"), "value": i}))
                .unwrap();
        }
        reconciler
            .ingest_value(json!({"vital_type": {"nested": true}, "value": 1}))
            .unwrap();

        let families = prometheus::gather();
        let family = families
            .iter()
            .find(|f| f.get_name() == "vitals_vital_updates_total")
            .unwrap();
        for metric in family.get_metric() {
            let label = metric
                .get_label()
                .iter()
                .find(|l| l.get_name() == "vital_type")
                .unwrap();
            assert!(
                ["HEART_RATE", "SPO2", "STEPS", "other"].contains(&label.get_value()),
                "unexpected label {}",
                label.get_value()
            );
        }
    }
}
