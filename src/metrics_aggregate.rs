pub use crate::features::metrics::aggregate::{History, TargetStats, average_delay, error_rate};
