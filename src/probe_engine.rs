pub use crate::features::probe::{
    CommandProbe, DnsProbe, PingProbe, ProbeRegistry, UnknownProbeKind,
};
