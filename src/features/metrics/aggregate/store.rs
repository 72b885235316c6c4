use super::super::HistoryEntry;
use super::stats::{average_delay, error_rate};
use crate::probe::ProbeOutcome;
use std::collections::VecDeque;
use std::time::Duration;

/// FIFO of recent results, newest at the back.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
    }

    /// Drops the oldest entries until at most `capacity` remain.
    pub fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

/// Accumulated statistics of one target. Delay figures only ever see
/// successful probes and stay zero until the first success.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TargetStats {
    pub success_count: u64,
    pub error_count: u64,
    pub last_delay: Duration,
    pub best_delay: Duration,
    pub worst_delay: Duration,
    pub delay_sum: Duration,
    pub average_delay: Duration,
    history: History,
}

impl TargetStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one probe result in and trims the history to `capacity`.
    /// Returns the delay when the probe succeeded so the caller can raise
    /// the process-wide worst delay.
    pub fn record(&mut self, outcome: ProbeOutcome, capacity: usize) -> Option<Duration> {
        let recorded = if outcome.success {
            let delay = outcome.delay;
            self.history.push(HistoryEntry::ok(delay));
            self.success_count += 1;
            self.last_delay = delay;
            if self.success_count == 1 || delay < self.best_delay {
                self.best_delay = delay;
            }
            if delay > self.worst_delay {
                self.worst_delay = delay;
            }
            self.delay_sum += delay;
            self.average_delay = average_delay(self.delay_sum, self.success_count);
            Some(delay)
        } else {
            self.history.push(HistoryEntry::failed());
            self.error_count += 1;
            None
        };

        self.history.evict_to(capacity);
        recorded
    }

    /// Clears counters, delays and history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn completed(&self) -> u64 {
        self.success_count + self.error_count
    }

    pub fn error_rate(&self) -> f64 {
        error_rate(self.success_count, self.error_count)
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}
