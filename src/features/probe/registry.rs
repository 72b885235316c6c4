use super::{CommandProbe, DnsProbe, PingProbe};
use crate::probe::Probe;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("unknown probe kind `{kind}` (available: {})", .available.join(", "))]
pub struct UnknownProbeKind {
    pub kind: String,
    pub available: Vec<String>,
}

struct RegistryEntry {
    kind: String,
    prototype: Box<dyn Probe>,
}

/// Probe kinds by user-facing name. Registering a kind twice replaces the
/// earlier prototype but keeps its position in [`ProbeRegistry::kinds`].
#[derive(Default)]
pub struct ProbeRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("dns", Box::new(DnsProbe::default()));
        registry.register("ping", Box::new(PingProbe::default()));
        registry.register("command", Box::new(CommandProbe::default()));
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, prototype: Box<dyn Probe>) {
        let kind = kind.into();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.kind == kind) {
            tracing::debug!(kind = %kind, "replacing registered probe kind");
            entry.prototype = prototype;
        } else {
            self.entries.push(RegistryEntry { kind, prototype });
        }
    }

    pub fn instantiate(&self, kind: &str) -> Result<Box<dyn Probe>, UnknownProbeKind> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.prototype.fresh())
            .ok_or_else(|| UnknownProbeKind {
                kind: kind.to_string(),
                available: self.kinds().into_iter().map(str::to_string).collect(),
            })
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.kind.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::probe::testing::FakeProbe;
    use crate::probe::{OPT_ADDRESS, ProbeOptions};
    use std::time::Duration;

    #[test]
    fn builtin_registers_three_kinds_in_order() {
        let registry = ProbeRegistry::builtin();
        assert_eq!(registry.kinds(), vec!["dns", "ping", "command"]);
        assert_eq!(registry.instantiate("ping").expect("ping").kind(), "ping");
    }

    #[test]
    fn unknown_kind_lists_available_kinds() {
        let registry = ProbeRegistry::builtin();
        let err = registry.instantiate("http").err().expect("should fail");
        assert_eq!(err.kind, "http");
        assert_eq!(err.available, vec!["dns", "ping", "command"]);
        assert_eq!(
            err.to_string(),
            "unknown probe kind `http` (available: dns, ping, command)"
        );
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = ProbeRegistry::new();
        registry.register("fake", Box::new(FakeProbe::succeeding(Duration::from_millis(1))));
        registry.register("other", Box::new(FakeProbe::failing()));
        registry.register("fake", Box::new(FakeProbe::failing()));

        assert_eq!(registry.kinds(), vec!["fake", "other"]);
        let mut probe = registry.instantiate("fake").expect("fake");
        probe
            .configure(&ProbeOptions::new().with(OPT_ADDRESS, "x"))
            .expect("configure");
        assert!(!probe.run().success);
    }

    #[test]
    fn instantiate_hands_out_independent_instances() {
        let registry = ProbeRegistry::builtin();
        let mut first = registry.instantiate("command").expect("first");
        let second = registry.instantiate("command").expect("second");
        first
            .configure(
                &ProbeOptions::new()
                    .with(crate::probe::OPT_COMMAND, "true")
                    .with(crate::probe::OPT_TIMEOUT, "1s"),
            )
            .expect("configure");
        assert_eq!(first.identify(), "true");
        assert_eq!(second.identify(), "");
    }
}
