pub mod aggregate;
mod summary;

pub use summary::{json_summary, text_summary};

use serde::{Serialize, Serializer};
use std::time::Duration;

fn as_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_nanos() as f64 / 1_000_000.0)
}

/// One past probe result. Failed entries carry a zero delay.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "delay_ms", serialize_with = "as_millis")]
    pub delay: Duration,
    pub success: bool,
}

impl HistoryEntry {
    pub fn ok(delay: Duration) -> Self {
        Self {
            delay,
            success: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            delay: Duration::ZERO,
            success: false,
        }
    }
}

/// Read-only per-target row handed to the presenter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetViewModel {
    pub label: String,
    pub success_count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    #[serde(rename = "last_ms", serialize_with = "as_millis")]
    pub last_delay: Duration,
    #[serde(rename = "average_ms", serialize_with = "as_millis")]
    pub average_delay: Duration,
    #[serde(rename = "best_ms", serialize_with = "as_millis")]
    pub best_delay: Duration,
    #[serde(rename = "worst_ms", serialize_with = "as_millis")]
    pub worst_delay: Duration,
    pub history: Vec<HistoryEntry>,
}

/// Everything the presenter may see of the monitor at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    pub probe_kind: String,
    pub targets: Vec<TargetViewModel>,
    #[serde(rename = "worst_ever_ms", serialize_with = "as_millis")]
    pub worst_delay_ever: Duration,
    #[serde(rename = "interval_ms", serialize_with = "as_millis")]
    pub interval: Duration,
    #[serde(rename = "timeout_ms", serialize_with = "as_millis")]
    pub timeout: Duration,
    pub paused: bool,
    pub history_capacity: usize,
    pub rounds: u64,
}

impl MonitorSnapshot {
    pub fn longest_label(&self) -> usize {
        self.targets
            .iter()
            .map(|target| target.label.chars().count())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_delays_as_milliseconds() {
        let snapshot = MonitorSnapshot {
            probe_kind: "dns".to_string(),
            targets: vec![TargetViewModel {
                label: "9.9.9.9:53".to_string(),
                success_count: 1,
                error_count: 1,
                error_rate: 50.0,
                last_delay: Duration::from_micros(12_500),
                average_delay: Duration::from_micros(12_500),
                best_delay: Duration::from_micros(12_500),
                worst_delay: Duration::from_micros(12_500),
                history: vec![HistoryEntry::ok(Duration::from_millis(12)), HistoryEntry::failed()],
            }],
            worst_delay_ever: Duration::from_millis(40),
            interval: Duration::from_secs(1),
            timeout: Duration::from_millis(800),
            paused: false,
            history_capacity: 13,
            rounds: 2,
        };

        let json = serde_json::to_value(&snapshot).expect("json");
        assert_eq!(json["interval_ms"], 1000.0);
        assert_eq!(json["worst_ever_ms"], 40.0);
        assert_eq!(json["targets"][0]["last_ms"], 12.5);
        assert_eq!(json["targets"][0]["history"][1]["success"], false);
        assert_eq!(json["targets"][0]["history"][1]["delay_ms"], 0.0);
        assert_eq!(snapshot.longest_label(), 10);
    }
}
