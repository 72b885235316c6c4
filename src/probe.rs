use crate::common::time::parse_duration;
use crate::config::{IpPreference, MAX_KNOB};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub const OPT_ADDRESS: &str = "address";
pub const OPT_PORT: &str = "port";
pub const OPT_DOMAIN: &str = "domain";
pub const OPT_RECORD_TYPE: &str = "record_type";
pub const OPT_COMMAND: &str = "command";
pub const OPT_TIMEOUT: &str = "timeout";
pub const OPT_IPV4: &str = "ipv4";
pub const OPT_IPV6: &str = "ipv6";

/// Result of one reachability attempt. `delay` is meaningless when `success` is false.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProbeOutcome {
    pub delay: Duration,
    pub success: bool,
}

impl ProbeOutcome {
    pub fn success(delay: Duration) -> Self {
        Self {
            delay,
            success: true,
        }
    }

    pub fn failure() -> Self {
        Self {
            delay: Duration::ZERO,
            success: false,
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("missing option `{key}`")]
    MissingOption { key: String },
    #[error("invalid option `{key}` = {value:?}: {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ConfigError::MissingOption { key } | ConfigError::InvalidOption { key, .. } => key,
        }
    }
}

/// Flat string options handed to [`Probe::configure`]. Unknown keys are ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProbeOptions(BTreeMap<String, String>);

impl ProbeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingOption {
            key: key.to_string(),
        })
    }

    pub fn require_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        let raw = self.require(key)?;
        match parse_duration(raw) {
            Some(duration) if duration.is_zero() => {
                Err(ConfigError::invalid(key, raw, "must be greater than zero"))
            }
            Some(duration) if duration > MAX_KNOB => {
                Err(ConfigError::invalid(key, raw, "must not exceed 24h"))
            }
            Some(duration) => Ok(duration),
            None => Err(ConfigError::invalid(key, raw, "not a duration")),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|value| matches!(value.trim(), "true" | "1" | "yes"))
    }

    pub fn ip_preference(&self) -> IpPreference {
        IpPreference::from_flags(self.flag(OPT_IPV4), self.flag(OPT_IPV6))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProbeOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A pluggable reachability check bound to one endpoint.
///
/// Probes are configured once through `&mut self` and then shared with the
/// round threads, so every runtime method takes `&self`.
pub trait Probe: Send + Sync {
    /// Registry name of this probe kind.
    fn kind(&self) -> &'static str;

    fn configure(&mut self, options: &ProbeOptions) -> Result<(), ConfigError>;

    /// Stable display label of the probed endpoint.
    fn identify(&self) -> String;

    /// Blocks for one attempt, bounded by the configured timeout.
    fn run(&self) -> ProbeOutcome;

    /// Applies to the next `run`, never to one in flight.
    fn set_timeout(&self, timeout: Duration);

    /// New, unconfigured instance of the same kind.
    fn fresh(&self) -> Box<dyn Probe>;
}
