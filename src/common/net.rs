use crate::config::IpPreference;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Resolves `host` to one address, honouring the IP version preference.
/// Literal addresses are returned as-is.
pub fn resolve_host(host: &str, preference: IpPreference) -> io::Result<IpAddr> {
    let trimmed = host.trim().trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = trimmed.parse::<IpAddr>() {
        return Ok(ip);
    }

    (trimmed, 0)
        .to_socket_addrs()?
        .map(|addr| addr.ip())
        .find(|ip| matches_preference(*ip, preference))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no {} address found for {trimmed}", preference.label()),
            )
        })
}

pub fn matches_preference(ip: IpAddr, preference: IpPreference) -> bool {
    match preference {
        IpPreference::Any => true,
        IpPreference::V4 => ip.is_ipv4(),
        IpPreference::V6 => ip.is_ipv6(),
    }
}

/// `host:port`, with IPv6 literals bracketed.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
