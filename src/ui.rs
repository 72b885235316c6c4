pub use crate::features::ui::{RenderError, run_input, run_presenter};
