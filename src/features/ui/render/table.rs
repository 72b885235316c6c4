use crate::config::HISTORY_HEADER;
use crate::features::metrics::{MonitorSnapshot, TargetViewModel};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use std::time::Duration;

use super::format::{
    STAT_COLUMN_WIDTHS, TARGET_HEADER, format_error_rate, format_latency, history_glyph,
    label_width, style_for_error_rate,
};

const STAT_HEADERS: [&str; 7] = [
    "Success", "Errors", "Error %", "Last", "Average", "Best", "Worst",
];

pub(super) fn draw_targets(frame: &mut ratatui::Frame, area: Rect, snapshot: &MonitorSnapshot) {
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let header_cells = std::iter::once(TARGET_HEADER)
        .chain(STAT_HEADERS)
        .chain(std::iter::once(HISTORY_HEADER))
        .map(|title| Cell::from(Span::styled(title, header_style)));
    let header = Row::new(header_cells);

    let rows: Vec<Row> = snapshot
        .targets
        .iter()
        .map(|target| target_row(target, snapshot.worst_delay_ever))
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(label_width(
        snapshot.longest_label(),
    )))
    .chain(STAT_COLUMN_WIDTHS.iter().map(|width| Constraint::Length(*width)))
    .chain(std::iter::once(Constraint::Min(
        u16::try_from(snapshot.history_capacity).unwrap_or(u16::MAX),
    )))
    .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(table, area);
}

fn target_row(target: &TargetViewModel, worst: Duration) -> Row<'static> {
    let history: Vec<Span> = target
        .history
        .iter()
        .map(|entry| {
            let (glyph, style) = history_glyph(entry, worst);
            Span::styled(glyph.to_string(), style)
        })
        .collect();

    Row::new(vec![
        Cell::from(target.label.clone()),
        Cell::from(target.success_count.to_string()),
        Cell::from(target.error_count.to_string()),
        Cell::from(Span::styled(
            format_error_rate(target.error_rate),
            style_for_error_rate(target.error_rate),
        )),
        Cell::from(format_latency(target.last_delay)),
        Cell::from(format_latency(target.average_delay)),
        Cell::from(format_latency(target.best_delay)),
        Cell::from(format_latency(target.worst_delay)),
        Cell::from(Line::from(history)),
    ])
}
