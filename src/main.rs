use netpulse::app::{MonitorState, StartupError};
use netpulse::data_model::settings::{AppSettings, SummaryFormat};
use netpulse::logging::init_logging;
use netpulse::metrics::{json_summary, text_summary};
use netpulse::probe_engine::ProbeRegistry;
use netpulse::runtime::{Scheduler, Shutdown, install_termination_handler, join_if_started};
use netpulse::settings::{SettingsError, load_from_cli};
use netpulse::ui::{run_input, run_presenter};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

fn startup(settings: &AppSettings) -> Result<MonitorState, StartupError> {
    if let Some(path) = &settings.log_file {
        init_logging(Some(path.as_path())).map_err(|source| StartupError::Logging {
            path: path.clone(),
            source,
        })?;
    }
    tracing::info!(
        kind = %settings.probe_kind,
        targets = settings.targets.len(),
        "netpulse starting"
    );

    let registry = ProbeRegistry::builtin();
    MonitorState::build(
        &registry,
        &settings.monitor_config(),
        &settings.target_specs(),
    )
}

fn print_summary(state: &MonitorState, format: SummaryFormat) {
    let snapshot = state.snapshot();
    match format {
        SummaryFormat::Text => print!("{}", text_summary(&snapshot)),
        SummaryFormat::Json => match json_summary(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("netpulse: cannot encode summary: {err}"),
        },
    }
}

fn main() -> ExitCode {
    let settings = match load_from_cli() {
        Ok(settings) => settings,
        Err(SettingsError::Cli(err)) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
        Err(err) => {
            eprintln!("netpulse: {err}");
            return ExitCode::FAILURE;
        }
    };

    let state = match startup(&settings) {
        Ok(state) => Arc::new(state),
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            eprintln!("netpulse: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = install_termination_handler() {
        tracing::warn!(error = %err, "signal handlers not installed");
    }

    let shutdown = Shutdown::new();
    let (render_tx, render_rx) = crossbeam_channel::unbounded();

    let presenter = {
        let state = Arc::clone(&state);
        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name("presenter".to_string())
            .spawn(move || run_presenter(state, render_rx, shutdown))
    };
    let input = {
        let state = Arc::clone(&state);
        let render_tx = render_tx.clone();
        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name("input".to_string())
            .spawn(move || run_input(state, render_tx, shutdown))
    };
    let scheduler = {
        let scheduler = Scheduler::new(Arc::clone(&state), render_tx, shutdown.clone());
        thread::Builder::new()
            .name("scheduler".to_string())
            .spawn(move || scheduler.run())
    };

    let (presenter, input, scheduler) = match (presenter, input, scheduler) {
        (Ok(presenter), Ok(input), Ok(scheduler)) => (presenter, input, scheduler),
        (presenter, input, scheduler) => {
            shutdown.fire();
            // the presenter restores the terminal on its way out
            let errors = [
                join_if_started(scheduler),
                join_if_started(input),
                join_if_started(presenter),
            ];
            for err in errors.into_iter().flatten() {
                eprintln!("netpulse: cannot start thread: {err}");
            }
            return ExitCode::FAILURE;
        }
    };

    let mut code = ExitCode::SUCCESS;
    if scheduler.join().is_err() {
        tracing::error!("scheduler thread panicked");
        code = ExitCode::FAILURE;
    }
    match input.join() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::error!(error = %err, "input loop failed");
            eprintln!("netpulse: input failed: {err}");
            code = ExitCode::FAILURE;
        }
        Err(_) => {
            tracing::error!("input thread panicked");
            code = ExitCode::FAILURE;
        }
    }
    match presenter.join() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            eprintln!("netpulse: {err}");
            code = ExitCode::FAILURE;
        }
        Err(_) => {
            tracing::error!("presenter thread panicked");
            code = ExitCode::FAILURE;
        }
    }

    print_summary(&state, settings.summary);
    tracing::info!("netpulse stopped");
    code
}
