mod command;
mod dns;
mod ping;
mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use command::CommandProbe;
pub use dns::DnsProbe;
pub use ping::PingProbe;
pub use registry::{ProbeRegistry, UnknownProbeKind};

use std::sync::Mutex;
use std::time::Duration;

/// Timeout shared between the control loop (writer) and round threads (readers).
/// A run copies the value once at start, so updates never reach a call in flight.
#[derive(Debug)]
pub(crate) struct TimeoutCell(Mutex<Duration>);

impl TimeoutCell {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self(Mutex::new(timeout))
    }

    pub(crate) fn get(&self) -> Duration {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set(&self, timeout: Duration) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = timeout;
    }
}

impl Default for TimeoutCell {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TIMEOUT)
    }
}
