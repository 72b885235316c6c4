pub use crate::features::app::{
    ControlEffect, ControlEvent, Knobs, MonitorState, StartupError, TargetSpec, apply_control,
};
