use super::{RenderRequest, Scheduler, SchedulerPhase, Shutdown, join_if_started};
use crate::app::{ControlEvent, MonitorState, apply_control};
use crate::config::MonitorConfig;
use crate::features::probe::testing::FakeProbe;
use crate::probe::{Probe, ProbeOutcome};
use crossbeam_channel::Receiver;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn config(interval: Duration, max_rounds: u64) -> MonitorConfig {
    MonitorConfig {
        probe_kind: "fake".to_string(),
        interval,
        max_rounds,
        ..MonitorConfig::default()
    }
}

fn scheduler(
    probes: Vec<Box<dyn Probe>>,
    config: MonitorConfig,
) -> (Scheduler, Arc<MonitorState>, Receiver<RenderRequest>, Shutdown) {
    let state = Arc::new(MonitorState::from_probes(&config, probes));
    let (render_tx, render_rx) = crossbeam_channel::unbounded();
    let shutdown = Shutdown::new();
    let scheduler = Scheduler::new(Arc::clone(&state), render_tx, shutdown.clone());
    (scheduler, state, render_rx, shutdown)
}

#[test]
fn five_rounds_with_one_healthy_and_one_failing_target() {
    let (scheduler, state, render_rx, shutdown) = scheduler(
        vec![
            Box::new(FakeProbe::succeeding(ms(10)).labelled("a")),
            Box::new(FakeProbe::failing().labelled("b")),
        ],
        config(ms(1), 5),
    );

    scheduler.run();

    let a = state.stats(0).expect("a");
    assert_eq!(a.success_count, 5);
    assert_eq!(a.error_count, 0);
    assert_eq!(a.best_delay, ms(10));
    assert_eq!(a.worst_delay, ms(10));
    assert_eq!(a.average_delay, ms(10));

    let b = state.stats(1).expect("b");
    assert_eq!(b.success_count, 0);
    assert_eq!(b.error_count, 5);
    assert_eq!(b.error_rate(), 100.0);

    assert_eq!(state.knobs().rounds, 5);
    assert_eq!(state.knobs().worst_delay_ever, ms(10));
    assert!(shutdown.is_fired());

    let requests: Vec<RenderRequest> = render_rx.try_iter().collect();
    let frames = requests
        .iter()
        .filter(|request| **request == RenderRequest::Frame)
        .count();
    assert_eq!(frames, 5);
    assert_eq!(requests.last(), Some(&RenderRequest::Shutdown));
}

#[test]
fn paused_tick_leaves_statistics_unchanged() {
    let probe = FakeProbe::succeeding(ms(3)).labelled("a");
    let calls = probe.call_counter();
    let (mut scheduler, state, render_rx, _shutdown) =
        scheduler(vec![Box::new(probe)], config(ms(1), 0));

    assert_eq!(scheduler.tick(), SchedulerPhase::Idle);
    let before = state.stats(0).expect("stats");
    let rounds_before = state.knobs().rounds;

    apply_control(&state, ControlEvent::TogglePause);
    assert_eq!(scheduler.tick(), SchedulerPhase::Idle);
    apply_control(&state, ControlEvent::TogglePause);

    assert_eq!(state.stats(0).expect("stats"), before);
    assert_eq!(state.knobs().rounds, rounds_before);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // the paused tick still asked for a frame
    let frames = render_rx
        .try_iter()
        .filter(|request| *request == RenderRequest::Frame)
        .count();
    assert_eq!(frames, 2);
}

#[test]
fn stalled_target_does_not_hold_back_the_others() {
    let (mut scheduler, state, _render_rx, shutdown) = scheduler(
        vec![
            Box::new(FakeProbe::stalling(ms(3000)).labelled("slow")),
            Box::new(FakeProbe::succeeding(ms(4)).labelled("fast")),
        ],
        config(ms(1), 0),
    );

    let started = Instant::now();
    let handle = thread::spawn(move || scheduler.tick());

    let mut fast_seen = None;
    while started.elapsed() < ms(2000) {
        if state.stats(1).expect("fast").success_count == 1 {
            fast_seen = Some(started.elapsed());
            break;
        }
        thread::sleep(ms(5));
    }

    let fast_seen = fast_seen.expect("fast target updated while the slow one stalls");
    assert!(fast_seen < ms(1000));
    assert_eq!(state.stats(0).expect("slow").completed(), 0);

    shutdown.fire();
    let phase = handle.join().expect("scheduler thread");
    assert_eq!(phase, SchedulerPhase::Stopped);
    assert!(started.elapsed() < ms(3000));
}

#[test]
fn reset_waits_for_the_next_tick() {
    let (mut scheduler, state, render_rx, _shutdown) = scheduler(
        vec![Box::new(FakeProbe::succeeding(ms(7)).labelled("a"))],
        config(ms(1), 0),
    );
    scheduler.tick();
    assert_eq!(state.stats(0).expect("stats").success_count, 1);

    apply_control(&state, ControlEvent::Reset);
    apply_control(&state, ControlEvent::TogglePause);
    assert_eq!(state.stats(0).expect("stats").success_count, 1);

    scheduler.tick();
    let stats = state.stats(0).expect("stats");
    assert_eq!(stats.completed(), 0);
    assert_eq!(state.knobs().rounds, 0);
    assert_eq!(state.knobs().worst_delay_ever, Duration::ZERO);
    assert!(render_rx.try_iter().any(|request| request == RenderRequest::Clear));
}

#[test]
fn shutdown_interrupts_the_interval_sleep() {
    let (mut scheduler, _state, _render_rx, shutdown) = scheduler(
        vec![Box::new(FakeProbe::succeeding(ms(1)).labelled("a"))],
        config(Duration::from_secs(30), 0),
    );

    let trigger = shutdown.clone();
    let firing = thread::spawn(move || {
        thread::sleep(ms(50));
        trigger.fire();
    });

    let started = Instant::now();
    assert_eq!(scheduler.tick(), SchedulerPhase::Stopped);
    assert!(started.elapsed() < ms(5000));
    firing.join().expect("trigger thread");

    assert_eq!(scheduler.tick(), SchedulerPhase::Stopped);
}

#[test]
fn slow_round_skips_the_sleep() {
    let (mut scheduler, state, _render_rx, _shutdown) = scheduler(
        vec![Box::new(FakeProbe::stalling(ms(60)).labelled("a"))],
        config(ms(20), 0),
    );

    let started = Instant::now();
    scheduler.tick();
    assert!(started.elapsed() < ms(1000));
    assert_eq!(state.stats(0).expect("stats").error_count, 1);
}

#[test]
fn results_are_folded_in_with_scripted_outcomes() {
    let probe = FakeProbe::scripted([
        ProbeOutcome::success(ms(20)),
        ProbeOutcome::failure(),
        ProbeOutcome::success(ms(40)),
    ])
    .labelled("a");
    let (scheduler, state, _render_rx, _shutdown) = scheduler(vec![Box::new(probe)], config(ms(1), 3));

    scheduler.run();

    let stats = state.stats(0).expect("stats");
    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.error_count, 1);
    assert_eq!(stats.average_delay, ms(30));
    assert_eq!(stats.best_delay, ms(20));
    assert_eq!(stats.worst_delay, ms(40));
    assert_eq!(stats.last_delay, ms(40));
}

#[test]
fn crashed_target_counts_as_an_error() {
    let (mut scheduler, state, _render_rx, _shutdown) = scheduler(
        vec![
            Box::new(FakeProbe::panicking().labelled("broken")),
            Box::new(FakeProbe::succeeding(ms(5)).labelled("healthy")),
        ],
        config(ms(1), 0),
    );

    assert_eq!(scheduler.tick(), SchedulerPhase::Idle);

    let broken = state.stats(0).expect("broken");
    assert_eq!(broken.completed(), 1);
    assert_eq!(broken.error_count, 1);
    assert_eq!(broken.history().len(), 1);

    let healthy = state.stats(1).expect("healthy");
    assert_eq!(healthy.success_count, 1);
    assert_eq!(healthy.error_count, 0);
    assert_eq!(state.knobs().rounds, 1);
}

#[test]
fn started_workers_are_joined_after_a_failed_spawn() {
    let shutdown = Shutdown::new();
    let finished = Arc::new(AtomicBool::new(false));
    let worker = {
        let shutdown = shutdown.clone();
        let finished = Arc::clone(&finished);
        thread::Builder::new().spawn(move || {
            while !shutdown.wait(ms(10)) {}
            finished.store(true, Ordering::SeqCst);
        })
    };
    let failed: io::Result<thread::JoinHandle<()>> = Err(io::Error::other("no threads left"));

    shutdown.fire();
    assert!(join_if_started(worker).is_none());
    assert!(finished.load(Ordering::SeqCst));

    let err = join_if_started(failed).expect("spawn error handed back");
    assert_eq!(err.to_string(), "no threads left");
}
