use crate::common::time::format_duration;
use crate::features::metrics::MonitorSnapshot;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::format::{history_scale, history_span};

pub(super) const FOOTER_HEIGHT: u16 = 5;

pub(super) fn draw_header(frame: &mut ratatui::Frame, area: Rect, snapshot: &MonitorSnapshot) {
    let (state, state_style) = if snapshot.paused {
        ("⏸ paused", Style::default().fg(Color::Yellow))
    } else {
        ("▶ running", Style::default().fg(Color::Green))
    };

    let header = Line::from(vec![
        Span::styled(
            " netpulse",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled("Probe:", Style::default().fg(Color::Gray)),
        Span::styled(
            format!(" {} ", snapshot.probe_kind),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("│ "),
        Span::styled("Targets:", Style::default().fg(Color::Gray)),
        Span::styled(
            format!(" {} ", snapshot.targets.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("│ "),
        Span::styled("Rounds:", Style::default().fg(Color::Gray)),
        Span::styled(
            format!(" {} ", snapshot.rounds),
            Style::default().fg(Color::White),
        ),
        Span::raw("│ "),
        Span::styled(state, state_style),
    ]);

    let paragraph = Paragraph::new(header).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Scale legend, history span, knob values and key hints.
pub(super) fn draw_footer(frame: &mut ratatui::Frame, area: Rect, snapshot: &MonitorSnapshot) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);

    let mut scale = vec![Span::styled("  Scale: ", label)];
    for (glyph, style, limit) in history_scale(snapshot.worst_delay_ever) {
        scale.push(Span::styled(glyph.to_string(), style));
        scale.push(Span::raw(format!(" < {}ms ", limit.as_millis())));
    }

    let span = history_span(
        snapshot.interval,
        snapshot.worst_delay_ever,
        snapshot.history_capacity,
    );
    let history = Line::from(vec![
        Span::styled("  Query History: ", label),
        Span::styled(
            format!(
                "{} Requests / ~{}",
                snapshot.history_capacity,
                format_duration(span)
            ),
            value,
        ),
    ]);

    let mut knobs = vec![
        Span::styled("  Timeout: ", label),
        Span::styled(format_duration(snapshot.timeout), value),
        Span::styled(" | Interval: ", label),
        Span::styled(format_duration(snapshot.interval), value),
    ];
    if snapshot.paused {
        knobs.push(Span::styled(
            " | Pause Active",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let probe = Line::from(vec![
        Span::styled("  Tests: ", label),
        Span::styled(snapshot.probe_kind.clone(), value),
    ]);

    let hints = [
        ("q", "Quit"),
        ("p", "Pause"),
        ("r", "Reset"),
        ("↑↓", "Interval"),
        ("←→", "Timeout"),
    ];
    let hint_spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(format!(" {key} "), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{action} "), Style::default().fg(Color::Gray)),
            ]
        })
        .collect();

    let lines = vec![
        Line::from(scale),
        history,
        Line::from(knobs),
        probe,
        Line::from(hint_spans).style(Style::default().bg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
