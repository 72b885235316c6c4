use crate::config::{IpPreference, RecordType};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// What to print once the live view has closed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
}

/// Validated command line.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub targets: Vec<String>,
    pub probe_kind: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub max_rounds: u64,
    pub ip_preference: IpPreference,
    pub dns_domain: String,
    pub dns_record_type: RecordType,
    pub dns_port: u16,
    pub summary: SummaryFormat,
    pub log_file: Option<PathBuf>,
}
