use std::fmt;
use std::time::Duration;

/// Step applied by the interval and timeout keys.
pub const KNOB_STEP: Duration = Duration::from_millis(100);
/// Smallest interval or timeout a decrease may produce.
pub const KNOB_FLOOR: Duration = Duration::from_millis(10);
/// Longest interval or timeout accepted from the command line, probe options or the keys.
pub const MAX_KNOB: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_PROBE_KIND: &str = "dns";
pub const DEFAULT_DNS_DOMAIN: &str = "example.com";
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Header of the history column; the history never shrinks below its width.
pub const HISTORY_HEADER: &str = "Query History";
pub const MIN_HISTORY_CAPACITY: usize = HISTORY_HEADER.len();

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub probe_kind: String,
    pub interval: Duration,
    pub timeout: Duration,
    /// Stop after this many rounds; zero runs until quit.
    pub max_rounds: u64,
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_kind: DEFAULT_PROBE_KIND.to_string(),
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            max_rounds: 0,
            history_capacity: MIN_HISTORY_CAPACITY,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IpPreference {
    #[default]
    Any,
    V4,
    V6,
}

impl IpPreference {
    pub fn label(self) -> &'static str {
        match self {
            IpPreference::Any => "ip",
            IpPreference::V4 => "ip4",
            IpPreference::V6 => "ip6",
        }
    }

    pub fn from_flags(v4: bool, v6: bool) -> Self {
        // v6 wins when both are set, matching the order flags are applied in
        if v6 {
            IpPreference::V6
        } else if v4 {
            IpPreference::V4
        } else {
            IpPreference::Any
        }
    }
}

impl fmt::Display for IpPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Txt,
}

impl RecordType {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::Aaaa),
            "CNAME" => Some(RecordType::Cname),
            "MX" => Some(RecordType::Mx),
            "NS" => Some(RecordType::Ns),
            "PTR" => Some(RecordType::Ptr),
            "SOA" => Some(RecordType::Soa),
            "TXT" => Some(RecordType::Txt),
            _ => None,
        }
    }

    /// QTYPE value on the wire.
    pub fn code(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
