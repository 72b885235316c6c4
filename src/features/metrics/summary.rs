use super::MonitorSnapshot;
use crate::common::time::format_duration;
use std::fmt::Write;
use std::time::Duration;

const HEADERS: [&str; 8] = [
    "Target", "Success", "Errors", "Error %", "Last", "Average", "Best", "Worst",
];

fn millis(delay: Duration) -> String {
    format!("{:.2} ms", delay.as_micros() as f64 / 1000.0)
}

/// Plain table of the final statistics, printed after the terminal is restored.
pub fn text_summary(snapshot: &MonitorSnapshot) -> String {
    let rows: Vec<[String; 8]> = snapshot
        .targets
        .iter()
        .map(|target| {
            [
                target.label.clone(),
                target.success_count.to_string(),
                target.error_count.to_string(),
                format!("{:.2}%", target.error_rate),
                millis(target.last_delay),
                millis(target.average_delay),
                millis(target.best_delay),
                millis(target.worst_delay),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} rounds | probe {} | interval {} | timeout {}",
        snapshot.rounds,
        snapshot.probe_kind,
        format_duration(snapshot.interval),
        format_duration(snapshot.timeout),
    );
    let header = HEADERS.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let mut line = format!("{:<width$}", row[0], width = widths[0]);
        for (cell, width) in row.iter().zip(widths).skip(1) {
            let _ = write!(line, "  {cell:>width$}");
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn json_summary(snapshot: &MonitorSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}
