mod stats;
mod store;

pub use stats::{average_delay, error_rate};
pub use store::{History, TargetStats};
