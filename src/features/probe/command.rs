use super::TimeoutCell;
use crate::probe::{ConfigError, OPT_COMMAND, OPT_TIMEOUT, Probe, ProbeOptions, ProbeOutcome};
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(not(unix))]
const WAIT_POLL: Duration = Duration::from_millis(1);

#[derive(Clone, Debug)]
struct CommandSettings {
    line: String,
    program: String,
    args: Vec<String>,
}

/// Runs an external program; exit status zero counts as reachable.
#[derive(Debug, Default)]
pub struct CommandProbe {
    settings: Option<CommandSettings>,
    timeout: TimeoutCell,
}

enum Completion {
    /// Exit status and the moment the process was seen to exit.
    Exited(ExitStatus, Instant),
    TimedOut,
}

/// Blocks until `pid` has exited without reaping it, so the pid stays ours
/// until `Child::wait` runs.
#[cfg(unix)]
fn wait_for_exit(pid: u32) -> io::Result<Instant> {
    loop {
        // SAFETY: `info` is a plain C struct used only as an out-parameter.
        let rc = unsafe {
            let mut info: libc::siginfo_t = std::mem::zeroed();
            libc::waitid(
                libc::P_PID,
                pid as libc::id_t,
                &mut info,
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        if rc == 0 {
            return Ok(Instant::now());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn wait_with_deadline(child: &mut Child, deadline: Option<Instant>) -> io::Result<Completion> {
    let Some(deadline) = deadline else {
        let status = child.wait()?;
        return Ok(Completion::Exited(status, Instant::now()));
    };

    let pid = child.id();
    let (exit_tx, exit_rx) = crossbeam_channel::bounded(1);
    let watcher = thread::Builder::new()
        .name(format!("command-wait-{pid}"))
        .spawn(move || {
            let _ = exit_tx.send(wait_for_exit(pid));
        });
    if let Err(err) = watcher {
        let _ = child.kill();
        child.wait()?;
        return Err(err);
    }

    match exit_rx.recv_deadline(deadline) {
        Ok(Ok(exited_at)) => Ok(Completion::Exited(child.wait()?, exited_at)),
        Ok(Err(err)) => {
            let _ = child.kill();
            child.wait()?;
            Err(err)
        }
        Err(_) => {
            if let Err(err) = child.kill() {
                tracing::debug!(pid, error = %err, "killing timed out command failed");
            }
            // reap only once the watcher is done with the pid
            let _ = exit_rx.recv();
            child.wait()?;
            Ok(Completion::TimedOut)
        }
    }
}

#[cfg(not(unix))]
fn wait_with_deadline(child: &mut Child, deadline: Option<Instant>) -> io::Result<Completion> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Completion::Exited(status, Instant::now()));
        }
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            child.kill()?;
            child.wait()?;
            return Ok(Completion::TimedOut);
        }
        thread::sleep(WAIT_POLL);
    }
}

impl Probe for CommandProbe {
    fn kind(&self) -> &'static str {
        "command"
    }

    fn configure(&mut self, options: &ProbeOptions) -> Result<(), ConfigError> {
        let line = options.require(OPT_COMMAND)?.to_string();
        let mut words = shell_words::split(&line)
            .map_err(|err| ConfigError::invalid(OPT_COMMAND, &line, err.to_string()))?;
        if words.is_empty() {
            return Err(ConfigError::invalid(OPT_COMMAND, &line, "empty command"));
        }
        let program = words.remove(0);
        let timeout = options.require_duration(OPT_TIMEOUT)?;

        self.timeout.set(timeout);
        self.settings = Some(CommandSettings {
            line: line.trim().to_string(),
            program,
            args: words,
        });
        Ok(())
    }

    fn identify(&self) -> String {
        self.settings
            .as_ref()
            .map(|settings| settings.line.clone())
            .unwrap_or_default()
    }

    fn run(&self) -> ProbeOutcome {
        let Some(settings) = &self.settings else {
            tracing::error!(kind = self.kind(), "probe run before configure");
            return ProbeOutcome::failure();
        };
        let timeout = self.timeout.get();

        let started = Instant::now();
        let spawned = Command::new(&settings.program)
            .args(&settings.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                tracing::debug!(command = %settings.line, error = %err, "command spawn failed");
                return ProbeOutcome::failure();
            }
        };

        match wait_with_deadline(&mut child, started.checked_add(timeout)) {
            Ok(Completion::Exited(status, exited_at)) if status.success() => {
                ProbeOutcome::success(exited_at.saturating_duration_since(started))
            }
            Ok(Completion::Exited(status, _)) => {
                tracing::debug!(command = %settings.line, %status, "command exited unsuccessfully");
                ProbeOutcome::failure()
            }
            Ok(Completion::TimedOut) => {
                tracing::debug!(command = %settings.line, ?timeout, "command killed after timeout");
                ProbeOutcome::failure()
            }
            Err(err) => {
                tracing::debug!(command = %settings.line, error = %err, "waiting on command failed");
                ProbeOutcome::failure()
            }
        }
    }

    fn set_timeout(&self, timeout: Duration) {
        self.timeout.set(timeout);
    }

    fn fresh(&self) -> Box<dyn Probe> {
        Box::new(CommandProbe::default())
    }
}
