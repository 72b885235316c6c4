use super::TimeoutCell;
use crate::common::net::resolve_host;
use crate::config::IpPreference;
use crate::probe::{ConfigError, OPT_ADDRESS, OPT_TIMEOUT, Probe, ProbeOptions, ProbeOutcome};
use std::io;
use std::net::IpAddr;
use std::sync::Once;
use std::time::Duration;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use thiserror::Error;

const ECHO_PAYLOAD: [u8; 8] = [0; 8];

static PRIVILEGE_HINT: Once = Once::new();

#[derive(Debug, Error)]
enum PingFailure {
    #[error("resolve failed: {0}")]
    Resolve(io::Error),
    #[error("icmp socket unavailable: {0}")]
    Socket(io::Error),
    #[error("runtime setup failed: {0}")]
    Runtime(io::Error),
    #[error("echo failed: {0}")]
    Echo(#[from] SurgeError),
}

#[derive(Clone, Debug)]
struct PingSettings {
    host: String,
    preference: IpPreference,
}

/// Sends a single ICMP echo request per run.
///
/// Opening the ICMP socket needs elevated privileges on Windows, and on Linux
/// unless the user's group is within `net.ipv4.ping_group_range`.
#[derive(Debug, Default)]
pub struct PingProbe {
    settings: Option<PingSettings>,
    timeout: TimeoutCell,
}

impl PingProbe {
    fn echo(&self, settings: &PingSettings, timeout: Duration) -> Result<Duration, PingFailure> {
        let ip = resolve_host(&settings.host, settings.preference).map_err(PingFailure::Resolve)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PingFailure::Runtime)?;
        runtime.block_on(send_echo(ip, timeout))
    }
}

async fn send_echo(ip: IpAddr, timeout: Duration) -> Result<Duration, PingFailure> {
    let config = match ip {
        IpAddr::V4(_) => Config::default(),
        IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
    };
    let client = Client::new(&config).map_err(|err| {
        if err.kind() == io::ErrorKind::PermissionDenied {
            PRIVILEGE_HINT.call_once(|| {
                tracing::warn!("opening an ICMP socket was denied; ping probes need elevated privileges on this system");
            });
        }
        PingFailure::Socket(err)
    })?;

    let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
    pinger.timeout(timeout);
    let (_packet, rtt) = pinger.ping(PingSequence(0), &ECHO_PAYLOAD).await?;
    Ok(rtt)
}

impl Probe for PingProbe {
    fn kind(&self) -> &'static str {
        "ping"
    }

    fn configure(&mut self, options: &ProbeOptions) -> Result<(), ConfigError> {
        let host = options.require(OPT_ADDRESS)?.trim().to_string();
        if host.is_empty() {
            return Err(ConfigError::invalid(OPT_ADDRESS, &host, "empty address"));
        }
        let timeout = options.require_duration(OPT_TIMEOUT)?;

        self.timeout.set(timeout);
        self.settings = Some(PingSettings {
            host,
            preference: options.ip_preference(),
        });
        Ok(())
    }

    fn identify(&self) -> String {
        self.settings
            .as_ref()
            .map(|settings| format!("{} ({})", settings.host, settings.preference))
            .unwrap_or_default()
    }

    fn run(&self) -> ProbeOutcome {
        let Some(settings) = &self.settings else {
            tracing::error!(kind = self.kind(), "probe run before configure");
            return ProbeOutcome::failure();
        };

        match self.echo(settings, self.timeout.get()) {
            Ok(rtt) => ProbeOutcome::success(rtt),
            Err(err) => {
                tracing::debug!(host = %settings.host, error = %err, "ping probe failed");
                ProbeOutcome::failure()
            }
        }
    }

    fn set_timeout(&self, timeout: Duration) {
        self.timeout.set(timeout);
    }

    fn fresh(&self) -> Box<dyn Probe> {
        Box::new(PingProbe::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::OPT_IPV4;

    #[test]
    fn identify_includes_ip_preference() {
        let mut probe = PingProbe::default();
        probe
            .configure(
                &ProbeOptions::new()
                    .with(OPT_ADDRESS, "one.one.one.one")
                    .with(OPT_TIMEOUT, "500ms")
                    .with(OPT_IPV4, "true"),
            )
            .expect("configure");
        assert_eq!(probe.identify(), "one.one.one.one (ip4)");
        assert_eq!(probe.timeout.get(), Duration::from_millis(500));
    }

    #[test]
    fn configure_requires_timeout() {
        let err = PingProbe::default()
            .configure(&ProbeOptions::new().with(OPT_ADDRESS, "8.8.8.8"))
            .expect_err("missing timeout");
        assert_eq!(err.key(), OPT_TIMEOUT);
    }

    #[test]
    fn set_timeout_replaces_configured_value() {
        let mut probe = PingProbe::default();
        probe
            .configure(
                &ProbeOptions::new()
                    .with(OPT_ADDRESS, "8.8.8.8")
                    .with(OPT_TIMEOUT, "1s"),
            )
            .expect("configure");
        probe.set_timeout(Duration::from_millis(300));
        assert_eq!(probe.timeout.get(), Duration::from_millis(300));
    }

    #[test]
    fn fresh_instance_is_unconfigured() {
        let mut probe = PingProbe::default();
        probe
            .configure(
                &ProbeOptions::new()
                    .with(OPT_ADDRESS, "8.8.8.8")
                    .with(OPT_TIMEOUT, "1s"),
            )
            .expect("configure");
        let fresh = probe.fresh();
        assert_eq!(fresh.identify(), "");
        assert_eq!(fresh.kind(), "ping");
    }
}
