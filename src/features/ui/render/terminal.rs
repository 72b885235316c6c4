use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Shown instead of the table when the terminal cannot fit it.
pub(super) fn draw_terminal_too_small(frame: &mut ratatui::Frame, area: Rect, min_width: u16) {
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::styled(
            "Terminal Too Small",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(vec![
            Span::raw("Width: "),
            Span::styled(area.width.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw(" / "),
            Span::styled(min_width.to_string(), Style::default().fg(Color::Green)),
        ]),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" netpulse"),
    );

    frame.render_widget(paragraph, area);
}
