mod control;
mod state;

pub use control::{ControlEffect, ControlEvent, apply_control};
pub use state::{Knobs, MonitorState, StartupError, TargetSpec};
