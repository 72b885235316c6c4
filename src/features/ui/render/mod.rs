mod format;
mod header;
mod table;
mod terminal;

use crate::features::metrics::MonitorSnapshot;
use ratatui::layout::{Constraint, Direction, Layout};

pub(super) use format::history_capacity;
use format::min_terminal_width;
use header::{FOOTER_HEIGHT, draw_footer, draw_header};
use table::draw_targets;
use terminal::draw_terminal_too_small;

pub(super) fn draw_monitor(frame: &mut ratatui::Frame, snapshot: &MonitorSnapshot) {
    let size = frame.area();
    let min_width = min_terminal_width(snapshot.longest_label());
    if size.width < min_width {
        draw_terminal_too_small(frame, size, min_width);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(size);

    draw_header(frame, chunks[0], snapshot);
    draw_targets(frame, chunks[1], snapshot);
    draw_footer(frame, chunks[2], snapshot);
}
