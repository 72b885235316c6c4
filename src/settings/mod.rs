use crate::app::TargetSpec;
use crate::common::time::parse_duration;
use crate::config::{
    DEFAULT_DNS_DOMAIN, DEFAULT_DNS_PORT, DEFAULT_PROBE_KIND, IpPreference, MIN_HISTORY_CAPACITY,
    MAX_KNOB, MonitorConfig, RecordType,
};
use crate::data_model::settings::{AppSettings, SummaryFormat};
use crate::probe::{
    OPT_ADDRESS, OPT_COMMAND, OPT_DOMAIN, OPT_IPV4, OPT_IPV6, OPT_PORT, OPT_RECORD_TYPE,
    OPT_TIMEOUT, ProbeOptions,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const COMMAND_KIND: &str = "command";

const INTERACTIVE_KEYS: &str = "\
Interactive keys:
  q, Ctrl-C      quit
  p              pause or resume probing
  r              reset all statistics
  Up / Down      raise or lower the interval by 100ms
  Right / Left   raise or lower the timeout by 100ms";

#[derive(Parser, Debug)]
#[command(name = "netpulse", version)]
#[command(
    about = "Continuously probes DNS resolvers, hosts or commands and shows live latency statistics",
    long_about = None,
    after_help = INTERACTIVE_KEYS
)]
pub struct CliArgs {
    /// Targets to probe: resolver or host addresses, or full command lines for `-p command`
    #[arg(value_name = "TARGET", required = true)]
    targets: Vec<String>,

    /// Probe kind: dns, ping or command
    #[arg(short, long, value_name = "KIND", default_value = DEFAULT_PROBE_KIND)]
    probe: String,

    /// Time between the start of two rounds
    #[arg(short = 'w', long, value_name = "DURATION", default_value = "1s")]
    interval: String,

    /// Timeout of a single probe
    #[arg(short, long, value_name = "DURATION", default_value = "1s")]
    timeout: String,

    /// Stop after this many rounds (0 runs until quit)
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    count: u64,

    /// Only use IPv4
    #[arg(short = '4', long = "ipv4", conflicts_with = "ipv6")]
    ipv4: bool,

    /// Only use IPv6
    #[arg(short = '6', long = "ipv6")]
    ipv6: bool,

    /// Domain queried by the dns probe
    #[arg(short, long, value_name = "DOMAIN", default_value = DEFAULT_DNS_DOMAIN)]
    domain: String,

    /// Record type queried by the dns probe
    #[arg(long = "dns-type", value_name = "TYPE", default_value = "A")]
    dns_type: String,

    /// Resolver port used by the dns probe
    #[arg(long = "dns-port", value_name = "PORT", default_value_t = DEFAULT_DNS_PORT)]
    dns_port: u16,

    /// Summary printed after the live view closes
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    summary: SummaryFormat,

    /// Write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("no targets given")]
    NoTargets,
    #[error("invalid {option} `{value}`: expected a duration like 1s, 250ms or 1m30s")]
    InvalidDuration { option: &'static str, value: String },
    #[error("{option} must be greater than zero")]
    ZeroDuration { option: &'static str },
    #[error("{option} `{value}` is longer than 24h")]
    DurationTooLong { option: &'static str, value: String },
    #[error("unknown dns record type `{value}`")]
    InvalidRecordType { value: String },
}

pub fn load_from_cli() -> Result<AppSettings, SettingsError> {
    let args = CliArgs::try_parse()?;
    from_args(args)
}

fn parse_positive_duration(option: &'static str, value: &str) -> Result<Duration, SettingsError> {
    let duration = parse_duration(value).ok_or_else(|| SettingsError::InvalidDuration {
        option,
        value: value.to_string(),
    })?;
    if duration.is_zero() {
        return Err(SettingsError::ZeroDuration { option });
    }
    if duration > MAX_KNOB {
        return Err(SettingsError::DurationTooLong {
            option,
            value: value.to_string(),
        });
    }
    Ok(duration)
}

pub fn from_args(args: CliArgs) -> Result<AppSettings, SettingsError> {
    let targets: Vec<String> = args
        .targets
        .iter()
        .map(|target| target.trim().to_string())
        .filter(|target| !target.is_empty())
        .collect();
    if targets.is_empty() {
        return Err(SettingsError::NoTargets);
    }

    let interval = parse_positive_duration("interval", &args.interval)?;
    let timeout = parse_positive_duration("timeout", &args.timeout)?;
    let dns_record_type =
        RecordType::parse(&args.dns_type).ok_or_else(|| SettingsError::InvalidRecordType {
            value: args.dns_type.clone(),
        })?;

    Ok(AppSettings {
        targets,
        probe_kind: args.probe.trim().to_ascii_lowercase(),
        interval,
        timeout,
        max_rounds: args.count,
        ip_preference: IpPreference::from_flags(args.ipv4, args.ipv6),
        dns_domain: args.domain,
        dns_record_type,
        dns_port: args.dns_port,
        summary: args.summary,
        log_file: args.log_file,
    })
}

impl AppSettings {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            probe_kind: self.probe_kind.clone(),
            interval: self.interval,
            timeout: self.timeout,
            max_rounds: self.max_rounds,
            history_capacity: MIN_HISTORY_CAPACITY,
        }
    }

    fn base_options(&self) -> ProbeOptions {
        let mut options = ProbeOptions::new()
            .with(OPT_TIMEOUT, format!("{}ns", self.timeout.as_nanos()))
            .with(OPT_DOMAIN, self.dns_domain.clone())
            .with(OPT_RECORD_TYPE, self.dns_record_type.label())
            .with(OPT_PORT, self.dns_port.to_string());
        match self.ip_preference {
            IpPreference::V4 => options.insert(OPT_IPV4, "true"),
            IpPreference::V6 => options.insert(OPT_IPV6, "true"),
            IpPreference::Any => {}
        }
        options
    }

    /// One option set per target. Command probes take the whole target as
    /// their command line; every other kind treats it as an address.
    pub fn target_specs(&self) -> Vec<TargetSpec> {
        let key = if self.probe_kind == COMMAND_KIND {
            OPT_COMMAND
        } else {
            OPT_ADDRESS
        };
        let base = self.base_options();
        self.targets
            .iter()
            .map(|target| TargetSpec {
                name: target.clone(),
                options: base.clone().with(key, target.clone()),
            })
            .collect()
    }
}
