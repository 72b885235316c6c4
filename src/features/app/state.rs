use crate::config::{MIN_HISTORY_CAPACITY, MonitorConfig};
use crate::features::metrics::aggregate::TargetStats;
use crate::features::metrics::{MonitorSnapshot, TargetViewModel};
use crate::features::probe::{ProbeRegistry, UnknownProbeKind};
use crate::probe::{ConfigError, Probe, ProbeOptions, ProbeOutcome};
use crate::settings::SettingsError;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("no targets given")]
    NoTargets,
    #[error(transparent)]
    UnknownProbe(#[from] UnknownProbeKind),
    #[error("target `{target}`: {source}")]
    ProbeConfig {
        target: String,
        #[source]
        source: ConfigError,
    },
    #[error("cannot open log file {}: {source}", .path.display())]
    Logging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One monitored endpoint as given on the command line, with the options
/// its probe is configured from.
#[derive(Clone, Debug)]
pub struct TargetSpec {
    pub name: String,
    pub options: ProbeOptions,
}

/// Knobs shared by the scheduler, the control loop and the presenter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Knobs {
    pub interval: Duration,
    pub timeout: Duration,
    pub paused: bool,
    pub reset_requested: bool,
    pub worst_delay_ever: Duration,
    pub history_capacity: usize,
    /// Capacity asked for by the presenter, adopted when the next round starts.
    pub desired_history_capacity: Option<usize>,
    pub rounds: u64,
    pub max_rounds: u64,
}

struct TargetSlot {
    label: String,
    probe: Box<dyn Probe>,
    stats: Mutex<TargetStats>,
}

/// Aggregate state of a run. Targets are fixed at construction; statistics
/// are written only by the scheduler.
///
/// Lock order: a target's statistics are never held while taking the knobs.
pub struct MonitorState {
    probe_kind: String,
    targets: Vec<TargetSlot>,
    knobs: Mutex<Knobs>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MonitorState {
    /// Instantiates and configures one probe per target. The first rejected
    /// configuration aborts the whole run.
    pub fn build(
        registry: &ProbeRegistry,
        config: &MonitorConfig,
        targets: &[TargetSpec],
    ) -> Result<Self, StartupError> {
        if targets.is_empty() {
            return Err(StartupError::NoTargets);
        }

        let mut probes = Vec::with_capacity(targets.len());
        for target in targets {
            let mut probe = registry.instantiate(&config.probe_kind)?;
            probe
                .configure(&target.options)
                .map_err(|source| StartupError::ProbeConfig {
                    target: target.name.clone(),
                    source,
                })?;
            probe.set_timeout(config.timeout);
            tracing::debug!(target = %probe.identify(), kind = %config.probe_kind, "target configured");
            probes.push(probe);
        }

        Ok(Self::from_probes(config, probes))
    }

    pub fn from_probes(config: &MonitorConfig, probes: Vec<Box<dyn Probe>>) -> Self {
        let targets = probes
            .into_iter()
            .map(|probe| TargetSlot {
                label: probe.identify(),
                probe,
                stats: Mutex::new(TargetStats::new()),
            })
            .collect();

        Self {
            probe_kind: config.probe_kind.clone(),
            targets,
            knobs: Mutex::new(Knobs {
                interval: config.interval,
                timeout: config.timeout,
                paused: false,
                reset_requested: false,
                worst_delay_ever: Duration::ZERO,
                history_capacity: config.history_capacity.max(MIN_HISTORY_CAPACITY),
                desired_history_capacity: None,
                rounds: 0,
                max_rounds: config.max_rounds,
            }),
        }
    }

    pub fn probe_kind(&self) -> &str {
        &self.probe_kind
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn probe(&self, index: usize) -> Option<&dyn Probe> {
        self.targets.get(index).map(|slot| slot.probe.as_ref())
    }

    pub fn knobs(&self) -> Knobs {
        lock(&self.knobs).clone()
    }

    pub fn with_knobs<R>(&self, f: impl FnOnce(&mut Knobs) -> R) -> R {
        f(&mut lock(&self.knobs))
    }

    pub fn stats(&self, index: usize) -> Option<TargetStats> {
        self.targets.get(index).map(|slot| lock(&slot.stats).clone())
    }

    /// Folds one probe result into its target and raises the worst-ever delay.
    pub fn apply_outcome(&self, index: usize, outcome: ProbeOutcome) {
        let Some(slot) = self.targets.get(index) else {
            tracing::warn!(index, "probe result for unknown target dropped");
            return;
        };
        let capacity = lock(&self.knobs).history_capacity;
        let recorded = lock(&slot.stats).record(outcome, capacity);
        if let Some(delay) = recorded {
            let mut knobs = lock(&self.knobs);
            if delay > knobs.worst_delay_ever {
                knobs.worst_delay_ever = delay;
            }
        }
    }

    /// Consumes a pending reset: zeroes every target, the worst-ever delay
    /// and the round counter. Returns whether a reset happened.
    pub fn apply_pending_reset(&self) -> bool {
        {
            let mut knobs = lock(&self.knobs);
            if !knobs.reset_requested {
                return false;
            }
            knobs.reset_requested = false;
            knobs.worst_delay_ever = Duration::ZERO;
            knobs.rounds = 0;
        }
        for slot in &self.targets {
            lock(&slot.stats).reset();
        }
        true
    }

    /// Counts a new round and adopts the presenter's history capacity.
    /// Returns the round number.
    pub fn start_round(&self) -> u64 {
        let mut knobs = lock(&self.knobs);
        knobs.rounds += 1;
        if let Some(desired) = knobs.desired_history_capacity.take() {
            knobs.history_capacity = desired;
        }
        knobs.rounds
    }

    pub fn set_desired_history_capacity(&self, capacity: usize) {
        let capacity = capacity.max(MIN_HISTORY_CAPACITY);
        let mut knobs = lock(&self.knobs);
        if knobs.history_capacity != capacity {
            knobs.desired_history_capacity = Some(capacity);
        } else {
            knobs.desired_history_capacity = None;
        }
    }

    pub fn broadcast_timeout(&self, timeout: Duration) {
        for slot in &self.targets {
            slot.probe.set_timeout(timeout);
        }
    }

    /// True once a bounded run has completed its last round.
    pub fn round_limit_reached(&self) -> bool {
        let knobs = lock(&self.knobs);
        knobs.max_rounds > 0 && knobs.rounds >= knobs.max_rounds
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let targets = self
            .targets
            .iter()
            .map(|slot| {
                let stats = lock(&slot.stats);
                TargetViewModel {
                    label: slot.label.clone(),
                    success_count: stats.success_count,
                    error_count: stats.error_count,
                    error_rate: stats.error_rate(),
                    last_delay: stats.last_delay,
                    average_delay: stats.average_delay,
                    best_delay: stats.best_delay,
                    worst_delay: stats.worst_delay,
                    history: stats.history().iter().copied().collect(),
                }
            })
            .collect();

        let knobs = self.knobs();
        MonitorSnapshot {
            probe_kind: self.probe_kind.clone(),
            targets,
            worst_delay_ever: knobs.worst_delay_ever,
            interval: knobs.interval,
            timeout: knobs.timeout,
            paused: knobs.paused,
            history_capacity: knobs.history_capacity,
            rounds: knobs.rounds,
        }
    }
}
