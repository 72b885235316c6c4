use crate::app::{ControlEffect, ControlEvent, MonitorState, apply_control};
use crate::common::signal::termination_requested;
use crate::runtime::{RenderRequest, Shutdown};
use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// How long one wait for terminal input may block before the loop re-checks
/// the shutdown signal and the termination flag.
const INPUT_POLL: Duration = Duration::from_millis(100);

pub(in crate::features::ui) fn map_key(key: KeyEvent) -> Option<ControlEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(ControlEvent::Quit);
    }
    let event = match key.code {
        KeyCode::Char('q') => ControlEvent::Quit,
        KeyCode::Char('p') => ControlEvent::TogglePause,
        KeyCode::Char('r') => ControlEvent::Reset,
        KeyCode::Up => ControlEvent::IntervalUp,
        KeyCode::Down => ControlEvent::IntervalDown,
        KeyCode::Right => ControlEvent::TimeoutUp,
        KeyCode::Left => ControlEvent::TimeoutDown,
        _ => ControlEvent::Redraw,
    };
    Some(event)
}

pub(in crate::features::ui) fn map_event(event: &Event) -> Option<ControlEvent> {
    match event {
        Event::Key(key) => map_key(*key),
        Event::Resize(_, _) => Some(ControlEvent::Redraw),
        _ => None,
    }
}

/// Control loop: turns key presses and termination signals into knob changes
/// until quit or shutdown. A terminal read error also shuts the monitor down.
pub fn run_input(
    state: Arc<MonitorState>,
    render_tx: Sender<RenderRequest>,
    shutdown: Shutdown,
) -> io::Result<()> {
    let result = serve(&state, &render_tx, &shutdown);
    if let Err(err) = &result {
        tracing::error!(error = %err, "reading terminal input failed");
        shutdown.fire();
    }
    result
}

fn serve(
    state: &MonitorState,
    render_tx: &Sender<RenderRequest>,
    shutdown: &Shutdown,
) -> io::Result<()> {
    while !shutdown.is_fired() {
        let control = if termination_requested() {
            tracing::info!("termination signal received");
            Some(ControlEvent::Quit)
        } else if event::poll(INPUT_POLL)? {
            map_event(&event::read()?)
        } else {
            None
        };

        let Some(control) = control else {
            continue;
        };
        tracing::debug!(?control, "control event");
        match apply_control(state, control) {
            ControlEffect::Render => {
                let _ = render_tx.send(RenderRequest::Frame);
            }
            ControlEffect::Quit => {
                shutdown.fire();
                break;
            }
        }
    }
    Ok(())
}
