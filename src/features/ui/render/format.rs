use crate::config::MIN_HISTORY_CAPACITY;
use crate::features::metrics::HistoryEntry;
use ratatui::style::{Color, Style};
use std::time::Duration;

/// Widths of the fixed table columns: Success, Errors, Error %, Last,
/// Average, Best, Worst.
pub(super) const STAT_COLUMN_WIDTHS: [u16; 7] = [8, 8, 8, 10, 10, 10, 10];
pub(super) const TARGET_HEADER: &str = "Target";
const COLUMN_SPACING: u16 = 1;
const BORDER_WIDTH: u16 = 2;

/// Rating bands in permille of the worst-ever delay, best first.
const RATING_BANDS: [(u32, char, Color); 5] = [
    (600, '.', Color::Green),
    (800, '-', Color::Cyan),
    (900, '+', Color::Blue),
    (950, '*', Color::Yellow),
    (1000, '#', Color::Magenta),
];

pub(super) fn label_width(longest_label: usize) -> u16 {
    u16::try_from(longest_label.max(TARGET_HEADER.len())).unwrap_or(u16::MAX)
}

/// Columns left for the history after the label and the stat columns.
pub(in crate::features::ui) fn history_capacity(terminal_width: u16, longest_label: usize) -> usize {
    let stat_width: u16 = STAT_COLUMN_WIDTHS.iter().sum();
    let gaps = COLUMN_SPACING * STAT_COLUMN_WIDTHS.len() as u16 + COLUMN_SPACING;
    let used = stat_width + gaps + BORDER_WIDTH + label_width(longest_label);
    usize::from(terminal_width.saturating_sub(used)).max(MIN_HISTORY_CAPACITY)
}

/// Smallest terminal width that fits the table with a minimal history.
pub(in crate::features::ui) fn min_terminal_width(longest_label: usize) -> u16 {
    let stat_width: u16 = STAT_COLUMN_WIDTHS.iter().sum();
    let gaps = COLUMN_SPACING * STAT_COLUMN_WIDTHS.len() as u16 + COLUMN_SPACING;
    stat_width + gaps + BORDER_WIDTH + label_width(longest_label) + MIN_HISTORY_CAPACITY as u16
}

pub(super) fn format_latency(delay: Duration) -> String {
    format!("{:.2} ms", delay.as_micros() as f64 / 1000.0)
}

pub(super) fn format_error_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}

/// Band for `delay`; anything above the worst-ever delay lands in the last one.
fn band(delay: Duration, worst: Duration) -> (char, Color) {
    let delay = delay.as_nanos() * 1000;
    let worst = worst.as_nanos();
    RATING_BANDS
        .iter()
        .find(|(permille, _, _)| delay <= worst * u128::from(*permille))
        .map(|(_, glyph, color)| (*glyph, *color))
        .unwrap_or(('#', Color::Magenta))
}

/// Glyph and colour for one history slot.
pub(super) fn history_glyph(entry: &HistoryEntry, worst: Duration) -> (char, Style) {
    if !entry.success {
        return ('?', Style::default().fg(Color::Red));
    }
    let (glyph, color) = band(entry.delay, worst);
    (glyph, Style::default().fg(color))
}

/// Legend entries: each glyph with the delay its band ends at.
pub(super) fn history_scale(worst: Duration) -> Vec<(char, Style, Duration)> {
    RATING_BANDS
        .iter()
        .map(|(permille, glyph, color)| {
            (*glyph, Style::default().fg(*color), worst * *permille / 1000)
        })
        .collect()
}

/// Approximate wall time covered by a full history, rounded to seconds.
pub(super) fn history_span(interval: Duration, worst: Duration, capacity: usize) -> Duration {
    let per_round = interval.saturating_add(worst);
    let total = per_round.saturating_mul(u32::try_from(capacity).unwrap_or(u32::MAX));
    Duration::from_secs(total.as_secs() + u64::from(total.subsec_millis() >= 500))
}

pub(super) fn style_for_error_rate(rate: f64) -> Style {
    if rate <= 0.0 {
        Style::default().fg(Color::Green)
    } else if rate < 5.0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    }
}
