use super::TimeoutCell;
use crate::probe::{ConfigError, OPT_ADDRESS, Probe, ProbeOptions, ProbeOutcome};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone)]
pub(crate) enum FakeBehaviour {
    Succeed(Duration),
    Fail,
    /// Pops outcomes in order, failing once the script is exhausted.
    Script(Arc<Mutex<VecDeque<ProbeOutcome>>>),
    /// Sleeps, then fails.
    Stall(Duration),
    Panic,
}

/// Scripted probe for scheduler and state tests.
pub(crate) struct FakeProbe {
    label: Option<String>,
    behaviour: FakeBehaviour,
    timeout: Arc<TimeoutCell>,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub(crate) fn new(behaviour: FakeBehaviour) -> Self {
        Self {
            label: None,
            behaviour,
            timeout: Arc::new(TimeoutCell::default()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn succeeding(delay: Duration) -> Self {
        Self::new(FakeBehaviour::Succeed(delay))
    }

    pub(crate) fn failing() -> Self {
        Self::new(FakeBehaviour::Fail)
    }

    pub(crate) fn stalling(duration: Duration) -> Self {
        Self::new(FakeBehaviour::Stall(duration))
    }

    pub(crate) fn panicking() -> Self {
        Self::new(FakeBehaviour::Panic)
    }

    pub(crate) fn scripted(outcomes: impl IntoIterator<Item = ProbeOutcome>) -> Self {
        Self::new(FakeBehaviour::Script(Arc::new(Mutex::new(
            outcomes.into_iter().collect(),
        ))))
    }

    pub(crate) fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Shared view of the timeout, readable after the probe was boxed away.
    pub(crate) fn timeout_handle(&self) -> Arc<TimeoutCell> {
        Arc::clone(&self.timeout)
    }
}

impl Probe for FakeProbe {
    fn kind(&self) -> &'static str {
        "fake"
    }

    fn configure(&mut self, options: &ProbeOptions) -> Result<(), ConfigError> {
        self.label = Some(options.require(OPT_ADDRESS)?.to_string());
        Ok(())
    }

    fn identify(&self) -> String {
        self.label.clone().unwrap_or_default()
    }

    fn run(&self) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            FakeBehaviour::Succeed(delay) => ProbeOutcome::success(*delay),
            FakeBehaviour::Fail => ProbeOutcome::failure(),
            FakeBehaviour::Script(script) => script
                .lock()
                .expect("script lock")
                .pop_front()
                .unwrap_or_else(ProbeOutcome::failure),
            FakeBehaviour::Stall(duration) => {
                thread::sleep(*duration);
                ProbeOutcome::failure()
            }
            FakeBehaviour::Panic => panic!("fake probe blew up"),
        }
    }

    fn set_timeout(&self, timeout: Duration) {
        self.timeout.set(timeout);
    }

    fn fresh(&self) -> Box<dyn Probe> {
        Box::new(FakeProbe::new(self.behaviour.clone()))
    }
}
