//! Ingestion message shapes.
//!
//! Producers post untyped JSON. The body is classified once, here, into a
//! `TelemetryUpdate`, and the reconciler dispatches on the variant.
//!
//! Discriminators:
//! - `vital_type` present: partial update of one vital
//! - `vitals` present (and no `vital_type`): full snapshot, kept as sent
//! - neither: unrecognized, dropped by the caller

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::snapshot::{iso_timestamp, value_text, Snapshot};

/// Vital named by a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VitalType {
    HeartRate,
    Spo2,
    Steps,
    /// Accepted on the wire but maps to no vital.
    Other(String),
}

impl VitalType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "HEART_RATE" => Self::HeartRate,
            "SPO2" => Self::Spo2,
            "STEPS" => Self::Steps,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::HeartRate => "HEART_RATE",
            Self::Spo2 => "SPO2",
            Self::Steps => "STEPS",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Key of the targeted field inside `vitals`.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::HeartRate => Some("heart_rate"),
            Self::Spo2 => Some("spo2"),
            Self::Steps => Some("steps"),
            Self::Other(_) => None,
        }
    }

    /// Bounded label for metrics; every unknown type shares `other`.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::HeartRate => "HEART_RATE",
            Self::Spo2 => "SPO2",
            Self::Steps => "STEPS",
            Self::Other(_) => "other",
        }
    }
}

impl std::fmt::Display for VitalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-vital event. Field values are carried as the producer sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub timestamp: Value,
    pub vital_type: VitalType,
    /// Raw `value` field; `None` when absent.
    pub value: Option<Value>,
    /// `status` field, written to `status.system_mode`.
    pub system_mode: Option<Value>,
    pub decision: Option<Value>,
}

impl PartialUpdate {
    /// Log line recorded on the snapshot for this update.
    ///
    /// An absent value reads `undefined`, as producers' own log lines do.
    pub fn log_message(&self) -> String {
        let value = self
            .value
            .as_ref()
            .map_or_else(|| "undefined".to_string(), value_text);
        format!("{} updated to {}", self.vital_type, value)
    }
}

/// Ingestion body classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryUpdate {
    Partial(PartialUpdate),
    /// The body itself, timestamp stamped if it had none.
    Full(Snapshot),
    /// Neither discriminator matched.
    Unrecognized(Value),
}

impl TelemetryUpdate {
    /// Classify a decoded JSON body.
    ///
    /// `received_at` stamps bodies that carry no `timestamp`.
    ///
    /// # Errors
    /// `CoreError::InvalidPayload` when the body is not a JSON object.
    pub fn classify(body: Value, received_at: DateTime<Utc>) -> Result<Self> {
        let mut map = match body {
            Value::Object(map) => map,
            other => {
                return Err(CoreError::InvalidPayload(format!(
                    "expected object, got {}",
                    json_kind(&other)
                )))
            }
        };

        if map.get("timestamp").map_or(true, is_falsy) {
            map.insert(
                "timestamp".to_string(),
                Value::String(iso_timestamp(received_at)),
            );
        }

        if is_present(&map, "vital_type") {
            return Ok(Self::Partial(partial_from_map(map)));
        }
        if is_present(&map, "vitals") {
            return Ok(Self::Full(Snapshot::from_map(map)));
        }
        Ok(Self::Unrecognized(Value::Object(map)))
    }

    /// Decode raw request bytes and classify them.
    ///
    /// Bytes that are not JSON are rejected the same way as non-object JSON.
    pub fn from_slice(bytes: &[u8], received_at: DateTime<Utc>) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CoreError::InvalidPayload("empty body".to_string()));
        }
        let body: Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::InvalidPayload(format!("body is not JSON: {e}")))?;
        Self::classify(body, received_at)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Partial(_) => "partial",
            Self::Full(_) => "full",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

fn partial_from_map(mut map: Map<String, Value>) -> PartialUpdate {
    let vital_type = match map.get("vital_type") {
        Some(Value::String(s)) => VitalType::parse(s),
        Some(other) => VitalType::Other(other.to_string()),
        None => VitalType::Other(String::new()),
    };

    PartialUpdate {
        timestamp: map.remove("timestamp").unwrap_or(Value::Null),
        vital_type,
        value: map.remove("value"),
        system_mode: take_present(&mut map, "status"),
        decision: take_present(&mut map, "decision"),
    }
}

fn is_present(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|v| !is_falsy(v))
}

fn take_present(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    map.remove(key).filter(|v| !is_falsy(v))
}

/// JSON values a producer uses to mean "not set".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
