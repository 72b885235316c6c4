use super::state::MonitorState;
use crate::common::time::format_duration;
use crate::config::{KNOB_FLOOR, KNOB_STEP, MAX_KNOB};
use std::time::Duration;

/// Everything the operator can ask of a running monitor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlEvent {
    TogglePause,
    Reset,
    IntervalUp,
    IntervalDown,
    TimeoutUp,
    TimeoutDown,
    Redraw,
    Quit,
}

/// What the caller has to do after an event was applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlEffect {
    Render,
    Quit,
}

fn step_up(value: Duration) -> Duration {
    value.saturating_add(KNOB_STEP).min(MAX_KNOB)
}

fn step_down(value: Duration) -> Option<Duration> {
    value
        .checked_sub(KNOB_STEP)
        .filter(|lowered| *lowered >= KNOB_FLOOR)
}

/// Applies one event to the shared knobs. Reset is only flagged here and
/// carried out by the scheduler at the start of its next tick.
pub fn apply_control(state: &MonitorState, event: ControlEvent) -> ControlEffect {
    match event {
        ControlEvent::Quit => return ControlEffect::Quit,
        ControlEvent::Redraw => {}
        ControlEvent::TogglePause => {
            let paused = state.with_knobs(|knobs| {
                knobs.paused = !knobs.paused;
                knobs.paused
            });
            tracing::info!(paused, "pause toggled");
        }
        ControlEvent::Reset => {
            state.with_knobs(|knobs| knobs.reset_requested = true);
            tracing::info!("statistics reset requested");
        }
        ControlEvent::IntervalUp | ControlEvent::IntervalDown => {
            let interval = state.with_knobs(|knobs| {
                let next = if event == ControlEvent::IntervalUp {
                    Some(step_up(knobs.interval))
                } else {
                    step_down(knobs.interval)
                };
                if let Some(next) = next {
                    knobs.interval = next;
                }
                knobs.interval
            });
            tracing::info!(interval = %format_duration(interval), "interval changed");
        }
        ControlEvent::TimeoutUp | ControlEvent::TimeoutDown => {
            let changed = state.with_knobs(|knobs| {
                let next = if event == ControlEvent::TimeoutUp {
                    Some(step_up(knobs.timeout))
                } else {
                    step_down(knobs.timeout)
                };
                next.inspect(|timeout| knobs.timeout = *timeout)
            });
            if let Some(timeout) = changed {
                state.broadcast_timeout(timeout);
                tracing::info!(timeout = %format_duration(timeout), "timeout changed");
            }
        }
    }
    ControlEffect::Render
}
