mod input;
mod render;

pub use input::run_input;

use crate::app::MonitorState;
use crate::runtime::{RenderRequest, Shutdown};
use crossbeam_channel::Receiver;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{QueueableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use thiserror::Error;

use render::{draw_monitor, history_capacity};

#[derive(Debug, Error)]
#[error("terminal rendering failed: {0}")]
pub struct RenderError(#[from] io::Error);

type MonitorTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Presenter loop: the only code that touches the terminal. Serves render
/// requests in order until told to stop; a failed draw fires shutdown.
pub fn run_presenter(
    state: Arc<MonitorState>,
    render_rx: Receiver<RenderRequest>,
    shutdown: Shutdown,
) -> Result<(), RenderError> {
    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(err) => {
            shutdown.fire();
            return Err(err.into());
        }
    };

    let result = serve(&mut terminal, &state, &render_rx);
    if let Err(err) = &result {
        tracing::error!(error = %err, "presenter failed");
        shutdown.fire();
    }
    cleanup_terminal(&mut terminal)?;
    result.map_err(RenderError::from)
}

fn serve(
    terminal: &mut MonitorTerminal,
    state: &MonitorState,
    render_rx: &Receiver<RenderRequest>,
) -> io::Result<()> {
    draw(terminal, state)?;
    for request in render_rx.iter() {
        match request {
            RenderRequest::Clear => terminal.clear()?,
            RenderRequest::Frame => draw(terminal, state)?,
            RenderRequest::Shutdown => break,
        }
    }
    Ok(())
}

fn draw(terminal: &mut MonitorTerminal, state: &MonitorState) -> io::Result<()> {
    let snapshot = state.snapshot();
    let width = terminal.size()?.width;
    state.set_desired_history_capacity(history_capacity(width, snapshot.longest_label()));
    terminal.draw(|frame| draw_monitor(frame, &snapshot))?;
    Ok(())
}

fn setup_terminal() -> io::Result<MonitorTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut MonitorTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().queue(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    terminal.backend_mut().flush()?;
    Ok(())
}
