use crate::app::MonitorState;
pub use crate::common::signal::install_termination_handler;
use crate::common::time::pacing_delay;
use crate::probe::ProbeOutcome;
use crossbeam_channel::{Receiver, Sender, TryRecvError, select};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Work for the presenter. Only the presenter thread touches the terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderRequest {
    Clear,
    Frame,
    Shutdown,
}

/// Process-wide stop signal. Firing drops the only sender, so every clone
/// observes a disconnected receiver from then on.
#[derive(Clone)]
pub struct Shutdown {
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            receiver: rx,
        }
    }

    pub fn fire(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if sender.is_some() {
            tracing::debug!("shutdown signalled");
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// For use in `select!`; becomes ready once the signal fired.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }

    /// Sleeps for `duration` unless the signal fires first. Returns true if it fired.
    pub fn wait(&self, duration: Duration) -> bool {
        select! {
            recv(self.receiver) -> _ => true,
            default(duration) => false,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchedulerPhase {
    Idle,
    RoundStarting,
    RoundInFlight,
    RoundSettling,
    Stopped,
}

/// Drives polling rounds: every target probed concurrently, results applied
/// as they arrive, then a render request and the interval sleep.
pub struct Scheduler {
    state: Arc<MonitorState>,
    render_tx: Sender<RenderRequest>,
    shutdown: Shutdown,
    phase: SchedulerPhase,
}

impl Scheduler {
    pub fn new(state: Arc<MonitorState>, render_tx: Sender<RenderRequest>, shutdown: Shutdown) -> Self {
        Self {
            state,
            render_tx,
            shutdown,
            phase: SchedulerPhase::Idle,
        }
    }

    /// Ticks until stopped, then fires the shutdown signal and tells the
    /// presenter to finish.
    pub fn run(mut self) {
        tracing::info!(
            targets = self.state.target_count(),
            kind = %self.state.probe_kind(),
            "scheduler started"
        );
        while self.tick() != SchedulerPhase::Stopped {}
        self.shutdown.fire();
        self.request(RenderRequest::Shutdown);
        tracing::info!(rounds = self.state.knobs().rounds, "scheduler stopped");
    }

    /// One scheduler step: pending reset, an optional round, a render
    /// request and the pacing sleep. Returns the phase it ends in.
    pub fn tick(&mut self) -> SchedulerPhase {
        if self.shutdown.is_fired() {
            self.phase = SchedulerPhase::Stopped;
            return self.phase;
        }

        let started = Instant::now();
        if self.state.apply_pending_reset() {
            tracing::info!("statistics reset");
            self.request(RenderRequest::Clear);
        }

        if !self.state.knobs().paused {
            self.phase = SchedulerPhase::RoundStarting;
            let round = self.state.start_round();

            self.phase = SchedulerPhase::RoundInFlight;
            if !self.run_round(round) {
                self.phase = SchedulerPhase::Stopped;
                return self.phase;
            }
            self.phase = SchedulerPhase::RoundSettling;
        }

        self.request(RenderRequest::Frame);
        if self.state.round_limit_reached() {
            self.phase = SchedulerPhase::Stopped;
            return self.phase;
        }

        let delay = pacing_delay(self.state.knobs().interval, started.elapsed());
        self.phase = if self.shutdown.wait(delay) {
            SchedulerPhase::Stopped
        } else {
            SchedulerPhase::Idle
        };
        self.phase
    }

    /// Returns false when the round was abandoned because of shutdown.
    fn run_round(&self, round: u64) -> bool {
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, ProbeOutcome)>();
        let mut pending = 0usize;
        let mut reported = vec![false; self.state.target_count()];

        for index in 0..self.state.target_count() {
            let state = Arc::clone(&self.state);
            let tx = result_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("probe-{index}"))
                .spawn(move || {
                    let outcome = state
                        .probe(index)
                        .map(|probe| probe.run())
                        .unwrap_or_else(ProbeOutcome::failure);
                    let _ = tx.send((index, outcome));
                });
            match spawned {
                Ok(_) => pending += 1,
                Err(err) => {
                    tracing::error!(index, error = %err, "failed to spawn probe thread");
                    reported[index] = true;
                    self.state.apply_outcome(index, ProbeOutcome::failure());
                }
            }
        }
        drop(result_tx);

        while pending > 0 {
            select! {
                recv(result_rx) -> message => match message {
                    Ok((index, outcome)) => {
                        reported[index] = true;
                        self.state.apply_outcome(index, outcome);
                        pending -= 1;
                    }
                    Err(_) => {
                        // every sender is gone, so the silent threads panicked
                        tracing::warn!(round, missing = pending, "probe threads exited without a result");
                        for (index, _) in reported.iter().enumerate().filter(|(_, done)| !**done) {
                            self.state.apply_outcome(index, ProbeOutcome::failure());
                        }
                        break;
                    }
                },
                recv(self.shutdown.receiver()) -> _ => {
                    tracing::debug!(round, in_flight = pending, "round abandoned on shutdown");
                    return false;
                }
            }
        }
        tracing::debug!(round, "round complete");
        true
    }

    fn request(&self, request: RenderRequest) {
        if self.render_tx.send(request).is_err() {
            tracing::debug!(?request, "presenter gone; render request dropped");
        }
    }
}

/// Waits for a worker if it was spawned at all, handing back the spawn error
/// otherwise. Used when a sibling failed to start and the rest must wind down.
pub fn join_if_started<T>(spawned: io::Result<JoinHandle<T>>) -> Option<io::Error> {
    match spawned {
        Ok(handle) => {
            if handle.join().is_err() {
                tracing::error!("worker panicked while shutting down");
            }
            None
        }
        Err(err) => Some(err),
    }
}

#[cfg(test)]
mod tests;
