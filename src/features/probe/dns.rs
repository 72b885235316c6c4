mod wire;

use super::TimeoutCell;
use crate::common::net::{join_host_port, resolve_host};
use crate::config::{DEFAULT_DNS_PORT, IpPreference, RecordType};
use crate::probe::{
    ConfigError, OPT_ADDRESS, OPT_DOMAIN, OPT_PORT, OPT_RECORD_TYPE, OPT_TIMEOUT, Probe,
    ProbeOptions, ProbeOutcome,
};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};
use thiserror::Error;
use wire::{WireError, encode_query, parse_response_header};

const RECV_BUFFER_LEN: usize = 4096;

#[derive(Debug, Error)]
enum DnsFailure {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed exchange: {0}")]
    Wire(#[from] WireError),
    #[error("server answered with rcode {0}")]
    Rcode(u8),
    #[error("empty answer section")]
    EmptyAnswer,
}

#[derive(Clone, Debug)]
struct DnsSettings {
    address: String,
    port: u16,
    domain: String,
    record_type: RecordType,
    preference: IpPreference,
}

/// Times one UDP query against a resolver.
#[derive(Debug, Default)]
pub struct DnsProbe {
    settings: Option<DnsSettings>,
    timeout: TimeoutCell,
}

impl DnsProbe {
    fn exchange(&self, settings: &DnsSettings, timeout: Duration) -> Result<Duration, DnsFailure> {
        let ip = resolve_host(&settings.address, settings.preference)?;
        let server = SocketAddr::new(ip, settings.port);
        let local: SocketAddr = if ip.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(server)?;

        let id = rand::random::<u16>();
        let query = encode_query(id, &settings.domain, settings.record_type)?;
        let started = Instant::now();
        // an unrepresentable deadline means the read simply blocks
        let deadline = started.checked_add(timeout);
        socket.send(&query)?;

        let mut buffer = [0u8; RECV_BUFFER_LEN];
        loop {
            let remaining = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(DnsFailure::Timeout(timeout));
                    }
                    Some(remaining)
                }
                None => None,
            };
            socket.set_read_timeout(remaining)?;
            let len = match socket.recv(&mut buffer) {
                Ok(len) => len,
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(DnsFailure::Timeout(timeout));
                }
                Err(err) => return Err(err.into()),
            };
            let delay = started.elapsed();

            let header = match parse_response_header(&buffer[..len], id) {
                Ok(header) => header,
                // stray datagram from an earlier query; keep waiting
                Err(WireError::IdMismatch { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            if header.rcode != 0 {
                return Err(DnsFailure::Rcode(header.rcode));
            }
            if header.answer_count == 0 {
                return Err(DnsFailure::EmptyAnswer);
            }
            return Ok(delay);
        }
    }
}

impl Probe for DnsProbe {
    fn kind(&self) -> &'static str {
        "dns"
    }

    fn configure(&mut self, options: &ProbeOptions) -> Result<(), ConfigError> {
        let address = options.require(OPT_ADDRESS)?.trim().to_string();
        if address.is_empty() {
            return Err(ConfigError::invalid(OPT_ADDRESS, &address, "empty address"));
        }

        let port = match options.get(OPT_PORT) {
            None => DEFAULT_DNS_PORT,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid(OPT_PORT, raw, "not a port number"))?,
        };

        let domain = options.require(OPT_DOMAIN)?.to_string();
        encode_query(0, &domain, RecordType::A)
            .map_err(|err| ConfigError::invalid(OPT_DOMAIN, &domain, err.to_string()))?;

        let raw_type = options.require(OPT_RECORD_TYPE)?;
        let record_type = RecordType::parse(raw_type)
            .ok_or_else(|| ConfigError::invalid(OPT_RECORD_TYPE, raw_type, "unsupported record type"))?;

        let timeout = options.require_duration(OPT_TIMEOUT)?;

        self.timeout.set(timeout);
        self.settings = Some(DnsSettings {
            address,
            port,
            domain,
            record_type,
            preference: options.ip_preference(),
        });
        Ok(())
    }

    fn identify(&self) -> String {
        self.settings
            .as_ref()
            .map(|settings| join_host_port(&settings.address, settings.port))
            .unwrap_or_default()
    }

    fn run(&self) -> ProbeOutcome {
        let Some(settings) = &self.settings else {
            tracing::error!(kind = self.kind(), "probe run before configure");
            return ProbeOutcome::failure();
        };

        match self.exchange(settings, self.timeout.get()) {
            Ok(delay) => ProbeOutcome::success(delay),
            Err(err) => {
                tracing::debug!(
                    resolver = %self.identify(),
                    domain = %settings.domain,
                    record_type = %settings.record_type,
                    error = %err,
                    "dns probe failed"
                );
                ProbeOutcome::failure()
            }
        }
    }

    fn set_timeout(&self, timeout: Duration) {
        self.timeout.set(timeout);
    }

    fn fresh(&self) -> Box<dyn Probe> {
        Box::new(DnsProbe::default())
    }
}
