pub use crate::features::metrics::{
    HistoryEntry, MonitorSnapshot, TargetViewModel, json_summary, text_summary,
};
