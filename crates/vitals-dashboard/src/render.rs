//! Plain-text rendering of the dashboard view.
//!
//! Fixed thresholds are highlighted with ANSI colours: heart rate above 100
//! and a `TRIGGERED` decision in red, SpO2 below 95 in yellow. Badges follow
//! the connection state and the reported system mode.

use std::fmt::Write;

use vitals_core::{Decision, Reading, Snapshot, SystemMode};

use crate::view::{DashboardView, LogEntry};

/// Shown under every render.
pub const OBSERVABILITY_NOTE: &str = "NOTE: This dashboard is an observability layer only. \
It displays read-only data received from the system and does not perform independent \
health analysis or ml inference.";

const HEART_RATE_HIGH: f64 = 100.0;
const SPO2_LOW: f64 = 95.0;

/// Emphasis applied to a rendered value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Warning,
    Danger,
}

impl Tone {
    fn code(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Success => Some("\x1b[32m"),
            Self::Warning => Some("\x1b[33m"),
            Self::Danger => Some("\x1b[31m"),
        }
    }

    /// Wrap `text` in this tone's colour.
    pub fn paint(self, text: &str) -> String {
        match self.code() {
            Some(code) => format!("{code}{text}\x1b[0m"),
            None => text.to_string(),
        }
    }

    fn for_mode(mode: Option<SystemMode>) -> Self {
        match mode {
            Some(SystemMode::Normal) => Self::Success,
            Some(SystemMode::Warning) => Self::Warning,
            Some(SystemMode::Critical) => Self::Danger,
            Some(SystemMode::Waiting) | None => Self::Plain,
        }
    }

    fn for_decision(decision: Option<Decision>) -> Self {
        if decision == Some(Decision::Triggered) {
            Self::Danger
        } else {
            Self::Success
        }
    }

    fn above(reading: &Reading, limit: f64, tone: Self) -> Self {
        match reading.as_f64() {
            Some(v) if v > limit => tone,
            _ => Self::Plain,
        }
    }

    fn below(reading: &Reading, limit: f64, tone: Self) -> Self {
        match reading.as_f64() {
            Some(v) if v < limit => tone,
            _ => Self::Plain,
        }
    }
}

/// Render the whole view as a text panel.
pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();

    let connection = if view.is_connected() {
        Tone::Success.paint("CONNECTED")
    } else {
        Tone::Danger.paint("DISCONNECTED")
    };
    let _ = write!(out, "Telemetry Dashboard  [{connection}]");
    if let Some(status) = view.snapshot().and_then(Snapshot::status) {
        let mode = format!("MODE: {}", status.system_mode);
        let _ = write!(out, "  [{}]", Tone::for_mode(status.mode()).paint(&mode));
    }
    out.push('\n');
    out.push('\n');

    match view.snapshot() {
        None => {
            out.push_str("Waiting for telemetry...\n");
            out.push_str("Ensure the backend is receiving data.\n");
        }
        Some(snapshot) => {
            render_vitals(&mut out, snapshot);
            out.push('\n');
            render_log(&mut out, view.logs().iter());
        }
    }

    out.push('\n');
    out.push_str(OBSERVABILITY_NOTE);
    out.push('\n');
    out
}

fn render_vitals(out: &mut String, snapshot: &Snapshot) {
    let vitals = snapshot.vitals();
    let status = snapshot.status().unwrap_or_default();

    let heart_rate = Tone::above(&vitals.heart_rate, HEART_RATE_HIGH, Tone::Danger)
        .paint(&format!("{:>6}", vitals.heart_rate));
    let spo2 = Tone::below(&vitals.spo2, SPO2_LOW, Tone::Warning)
        .paint(&format!("{:>6}", vitals.spo2));
    let decision = Tone::for_decision(status.decision()).paint(&status.decision.to_string());

    let _ = writeln!(out, "Heart Rate  {heart_rate} bpm   Baseline: 60-100");
    let _ = writeln!(out, "SpO2        {spo2} %     Baseline: 95-100%");
    let _ = writeln!(out, "Steps       {:>6}       Daily Goal: 10,000", vitals.steps);
    let _ = writeln!(out, "Anomaly Score: {} / 100", status.anomaly_score);
    let _ = writeln!(out, "Decision: {decision}");
}

fn render_log<'a>(out: &mut String, entries: impl ExactSizeIterator<Item = &'a LogEntry>) {
    out.push_str("Event Log\n");
    if entries.len() == 0 {
        out.push_str("  No events logged yet.\n");
        return;
    }
    for entry in entries {
        let _ = writeln!(out, "  [{}] {}", display_time(entry), entry.message);
    }
}

/// `HH:MM:SS` (UTC) for RFC 3339 times, the raw string otherwise.
fn display_time(entry: &LogEntry) -> String {
    chrono::DateTime::parse_from_rfc3339(&entry.time)
        .map(|t| t.with_timezone(&chrono::Utc).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| entry.time.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use vitals_core::Published;

    fn view_of(snapshot: Value) -> DashboardView {
        let mut view = DashboardView::default();
        view.apply(Ok(Published::Snapshot(serde_json::from_value(snapshot).unwrap())));
        view
    }

    fn plain(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                chars.by_ref().find(|&c| c == 'm');
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_render_waiting() {
        let view = DashboardView::default();
        let text = render(&view);
        assert!(text.contains(&Tone::Danger.paint("DISCONNECTED")));
        assert!(text.contains("Waiting for telemetry..."));
        assert!(!text.contains("MODE:"));
        assert!(text.ends_with(&format!("{OBSERVABILITY_NOTE}\n")));
    }

    #[test]
    fn test_render_snapshot_and_log() {
        let view = view_of(json!({
            "timestamp": "2025-03-01T10:15:30.000Z",
            "vitals": {"heart_rate": 72, "spo2": 98, "steps": 0},
            "status": {"system_mode": "NORMAL", "anomaly_score": 4, "decision": "NONE"},
            "logs": ["Sensor A: OK"]
        }));

        let text = plain(&render(&view));
        assert!(text.contains("[CONNECTED]  [MODE: NORMAL]"));
        assert!(text.contains("Heart Rate      72 bpm"));
        assert!(text.contains("SpO2            98 %"));
        assert!(text.contains("Anomaly Score: 4 / 100"));
        assert!(text.contains("[10:15:30] Sensor A: OK"));
        assert!(text.contains("Decision: NONE"));
    }

    #[test]
    fn test_thresholds_highlighted() {
        let view = view_of(json!({
            "vitals": {"heart_rate": 130, "spo2": 91, "steps": 10},
            "status": {"system_mode": "CRITICAL", "anomaly_score": 90, "decision": "TRIGGERED"}
        }));
        let text = render(&view);
        assert!(text.contains(&Tone::Danger.paint("   130")));
        assert!(text.contains(&Tone::Warning.paint("    91")));
        assert!(text.contains(&Tone::Danger.paint("TRIGGERED")));
        assert!(text.contains(&Tone::Danger.paint("MODE: CRITICAL")));
    }

    #[test]
    fn test_values_within_baseline_are_plain() {
        let view = view_of(json!({
            "vitals": {"heart_rate": 100, "spo2": 95, "steps": 10},
            "status": {"system_mode": "warning", "anomaly_score": 1, "decision": "NONE"}
        }));
        let text = render(&view);
        assert!(text.contains("Heart Rate     100 bpm"));
        assert!(text.contains("SpO2            95 %"));
        assert!(text.contains(&Tone::Success.paint("NONE")));
        assert!(text.contains(&Tone::Warning.paint("MODE: warning")));
    }

    #[test]
    fn test_unknown_mode_and_odd_values() {
        let view = view_of(json!({
            "vitals": {"heart_rate": "fast", "spo2": 97.5},
            "status": {"system_mode": "OFFLINE"}
        }));
        let text = render(&view);
        assert!(text.contains("[MODE: OFFLINE]"));
        assert!(text.contains("Heart Rate    fast bpm"));
        assert!(text.contains("SpO2          97.5 %"));
        assert!(text.contains("Steps           --"));
    }

    #[test]
    fn test_no_mode_badge_without_status() {
        let view = view_of(json!({"vitals": {"heart_rate": 60}}));
        let text = render(&view);
        assert!(!text.contains("MODE:"));
        assert!(text.contains("Heart Rate      60 bpm"));
    }

    #[test]
    fn test_render_empty_log() {
        let mut view = DashboardView::default();
        view.apply(Ok(Published::Snapshot(Snapshot::initial("custom-time"))));
        assert!(render(&view).contains("No events logged yet."));
    }

    #[test]
    fn test_display_time_falls_back_to_raw() {
        let entry = LogEntry {
            time: "yesterday".to_string(),
            message: "x".to_string(),
        };
        assert_eq!(display_time(&entry), "yesterday");
    }
}
