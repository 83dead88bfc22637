//! Snapshot data model.
//!
//! A `Snapshot` is the collector's current view of one producer: the latest
//! vitals, the system status and the log lines describing the last change.
//!
//! The record is held as the producer's JSON object and published back
//! exactly as stored. `Vitals` and `Status` are read-only views over it;
//! they never reject a value, they only interpret it for display.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Object key of the vitals block.
pub const VITALS_KEY: &str = "vitals";
/// Object key of the status block.
pub const STATUS_KEY: &str = "status";

/// Format an instant the way producers stamp snapshots (RFC 3339, millis, `Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Text of a JSON value as a producer would print it: strings unquoted,
/// everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One field read from a snapshot, whatever its JSON type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reading(Option<Value>);

impl Reading {
    pub fn new(value: Option<&Value>) -> Self {
        Self(value.cloned())
    }

    /// Numeric reading. Numeric strings count.
    pub fn as_f64(&self) -> Option<f64> {
        match self.0.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_ref().and_then(Value::as_str)
    }

    /// Absent or `null`.
    pub fn is_missing(&self) -> bool {
        matches!(self.0, None | Some(Value::Null))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None | Some(Value::Null) => f.pad("--"),
            Some(value) => f.pad(&value_text(value)),
        }
    }
}

/// Vital-sign readings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vitals {
    /// Heart rate (bpm).
    pub heart_rate: Reading,
    /// Blood oxygen saturation (%).
    pub spo2: Reading,
    /// Step count.
    pub steps: Reading,
}

/// Producer-reported system mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SystemMode {
    #[default]
    Waiting,
    Normal,
    Warning,
    Critical,
}

impl SystemMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Case-insensitive match of a reported mode.
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Waiting, Self::Normal, Self::Warning, Self::Critical]
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Producer-reported decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Decision {
    #[default]
    NoAction,
    Triggered,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAction => "NONE",
            Self::Triggered => "TRIGGERED",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "NONE" => Some(Self::NoAction),
            "TRIGGERED" => Some(Self::Triggered),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status block of a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Status {
    pub system_mode: Reading,
    /// Producer anomaly score, nominally 0-100. Not validated.
    pub anomaly_score: Reading,
    pub decision: Reading,
}

impl Status {
    /// Known mode, if the reported one is recognised.
    pub fn mode(&self) -> Option<SystemMode> {
        self.system_mode.as_str().and_then(SystemMode::from_label)
    }

    pub fn decision(&self) -> Option<Decision> {
        self.decision.as_str().and_then(Decision::from_label)
    }
}

/// The single authoritative telemetry record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: Map<String, Value>,
}

impl Snapshot {
    /// Wrap a producer object as-is.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Base record used when a partial update arrives before any snapshot.
    pub fn initial(timestamp: impl Into<String>) -> Self {
        let mut snapshot = Self::default();
        snapshot.set_timestamp(Value::String(timestamp.into()));
        snapshot.fields.insert(
            VITALS_KEY.to_string(),
            json!({"heart_rate": 0, "spo2": 0, "steps": 0}),
        );
        snapshot.fields.insert(
            STATUS_KEY.to_string(),
            json!({
                "system_mode": SystemMode::Waiting.as_str(),
                "anomaly_score": 0,
                "decision": Decision::NoAction.as_str(),
            }),
        );
        snapshot.set_logs(Vec::new());
        snapshot
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// `timestamp` as text; empty when absent.
    pub fn timestamp(&self) -> String {
        self.fields.get("timestamp").map(value_text).unwrap_or_default()
    }

    /// Parse `timestamp` as an RFC 3339 instant.
    ///
    /// Returns `None` for producer timestamps in any other format.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn vitals(&self) -> Vitals {
        let block = self.block(VITALS_KEY);
        let read = |key: &str| Reading::new(block.and_then(|b| b.get(key)));
        Vitals {
            heart_rate: read("heart_rate"),
            spo2: read("spo2"),
            steps: read("steps"),
        }
    }

    /// `None` when the snapshot has no status object.
    pub fn status(&self) -> Option<Status> {
        let block = self.block(STATUS_KEY)?;
        let read = |key: &str| Reading::new(block.get(key));
        Some(Status {
            system_mode: read("system_mode"),
            anomaly_score: read("anomaly_score"),
            decision: read("decision"),
        })
    }

    /// Log lines, oldest first. Non-string entries are rendered as JSON.
    pub fn logs(&self) -> Vec<String> {
        match self.fields.get("logs") {
            Some(Value::Array(lines)) => lines.iter().map(value_text).collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_timestamp(&mut self, timestamp: Value) {
        self.fields.insert("timestamp".to_string(), timestamp);
    }

    /// Set `vitals.<field>`; `None` removes it.
    pub fn set_vital(&mut self, field: &str, value: Option<Value>) {
        self.with_block(VITALS_KEY, |block| match value {
            Some(value) => {
                block.insert(field.to_string(), value);
            }
            None => {
                block.remove(field);
            }
        });
    }

    /// Set `status.<field>`.
    pub fn set_status_field(&mut self, field: &str, value: Value) {
        self.with_block(STATUS_KEY, |block| {
            block.insert(field.to_string(), value);
        });
    }

    pub fn set_logs(&mut self, logs: Vec<String>) {
        let lines = logs.into_iter().map(Value::String).collect();
        self.fields.insert("logs".to_string(), Value::Array(lines));
    }

    fn block(&self, key: &str) -> Option<&Map<String, Value>> {
        self.fields.get(key).and_then(Value::as_object)
    }

    /// Edit the nested object at `key`. A missing or non-object value is
    /// replaced by a fresh object.
    fn with_block(&mut self, key: &str, edit: impl FnOnce(&mut Map<String, Value>)) {
        let slot = self.fields.entry(key.to_string()).or_insert(Value::Null);
        if let Value::Object(block) = slot {
            edit(block);
        } else {
            let mut block = Map::new();
            edit(&mut block);
            *slot = Value::Object(block);
        }
    }
}

/// Marker value of the "no data yet" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitingStatus {
    #[serde(rename = "waiting_for_data")]
    WaitingForData,
}

/// `{"status": "waiting_for_data"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingSentinel {
    pub status: WaitingStatus,
}

impl Default for WaitingSentinel {
    fn default() -> Self {
        Self {
            status: WaitingStatus::WaitingForData,
        }
    }
}

/// What `GET /api/telemetry` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Published {
    /// No snapshot has been ingested yet.
    Waiting(WaitingSentinel),
    /// The current snapshot, verbatim.
    Snapshot(Snapshot),
}

impl Published {
    pub fn waiting() -> Self {
        Self::Waiting(WaitingSentinel::default())
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting(_))
    }
}

impl From<Option<Snapshot>> for Published {
    fn from(snapshot: Option<Snapshot>) -> Self {
        match snapshot {
            Some(s) => Self::Snapshot(s),
            None => Self::waiting(),
        }
    }
}
