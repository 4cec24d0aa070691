//! Single invocation of the external multiply program
//!
//! The child gets the input block on stdin; stdout and stderr are drained on
//! helper threads so a chatty program cannot block on a full pipe while we
//! poll for its exit. On Unix the child leads its own process group; past the
//! deadline the whole group is killed, which closes the pipes held by
//! launcher descendants and lets the helper threads finish.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::constants::CHILD_POLL_INTERVAL_MS;
use crate::harness::Launcher;

/// Result of running the program once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code zero
    Success { elapsed: Duration, stdout: String },
    /// Nonzero exit code, or terminated by a signal (`code` is `None`)
    NonZeroExit {
        elapsed: Duration,
        code: Option<i32>,
        stderr: String,
    },
    /// Still running at the deadline; the process was killed
    TimedOut { timeout: Duration },
    /// The process could not be started or waited on
    SpawnFailed { message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    /// Wall-clock time charged to the run; a timeout is charged in full
    pub fn elapsed(&self) -> Duration {
        match self {
            RunOutcome::Success { elapsed, .. } | RunOutcome::NonZeroExit { elapsed, .. } => {
                *elapsed
            }
            RunOutcome::TimedOut { timeout } => *timeout,
            RunOutcome::SpawnFailed { .. } => Duration::ZERO,
        }
    }

    /// Short description for the results table, `None` on success
    pub fn error_message(&self) -> Option<String> {
        match self {
            RunOutcome::Success { .. } => None,
            RunOutcome::NonZeroExit { code: Some(code), .. } => Some(format!("ReturnCode:{}", code)),
            RunOutcome::NonZeroExit { code: None, .. } => Some("ReturnCode:Unknown".to_string()),
            RunOutcome::TimedOut { .. } => Some("Timeout".to_string()),
            RunOutcome::SpawnFailed { message } => Some(message.clone()),
        }
    }
}

/// Command line for running `program` with `np` processes
pub fn build_command(launcher: &Launcher, program: &Path, np: usize) -> Command {
    match launcher {
        Launcher::Mpirun { binary } => {
            let mut cmd = Command::new(binary);
            cmd.arg("-np").arg(np.to_string()).arg(program);
            cmd
        }
        Launcher::Direct => {
            let mut cmd = Command::new(program);
            cmd.arg(np.to_string());
            cmd
        }
    }
}

/// Runs the program once with `input` on stdin
pub fn run_program(
    launcher: &Launcher,
    program: &Path,
    np: usize,
    input: &str,
    timeout: Duration,
) -> RunOutcome {
    let mut cmd = build_command(launcher, program, np);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    own_process_group(&mut cmd);
    debug!(?cmd, timeout_secs = timeout.as_secs_f64(), "spawning program");

    let start = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return RunOutcome::SpawnFailed {
                message: e.to_string(),
            }
        }
    };

    let mut payload = input.as_bytes().to_vec();
    if !payload.ends_with(b"\n") {
        payload.push(b'\n');
    }
    let stdin = child.stdin.take();
    let writer = thread::spawn(move || {
        if let Some(mut stdin) = stdin {
            // A program that exits without reading its input closes the pipe
            let _ = stdin.write_all(&payload);
        }
    });
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = start + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill_tree(&mut child);
                // Helper threads see EOF or EPIPE once the group's pipe ends are closed
                return RunOutcome::TimedOut { timeout };
            }
            Ok(None) => thread::sleep(Duration::from_millis(CHILD_POLL_INTERVAL_MS)),
            Err(e) => {
                kill_tree(&mut child);
                return RunOutcome::SpawnFailed {
                    message: e.to_string(),
                };
            }
        }
    };
    let elapsed = start.elapsed();

    let _ = writer.join();
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if status.success() {
        RunOutcome::Success { elapsed, stdout }
    } else {
        RunOutcome::NonZeroExit {
            elapsed,
            code: status.code(),
            stderr,
        }
    }
}

#[cfg(unix)]
fn own_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_cmd: &mut Command) {}

/// Kills the child together with every process it started, then reaps it
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // Signals the group led by the child; `kill` avoids a libc dependency
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => debug!(%status, "process group kill failed"),
            Err(e) => warn!(error = %e, "could not run kill for the process group"),
        }
    }

    // The group kill normally took the child already
    if let Err(e) = child.kill() {
        debug!(error = %e, "kill on timed-out program failed");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "failed to reap timed-out program");
    }
}

fn drain<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_mpirun() {
        let launcher = Launcher::Mpirun {
            binary: "mpirun".into(),
        };
        let cmd = build_command(&launcher, Path::new("./Q1"), 4);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "mpirun");
        assert_eq!(args, vec!["-np", "4", "./Q1"]);
    }

    #[test]
    fn test_build_command_direct() {
        let cmd = build_command(&Launcher::Direct, Path::new("./Q1"), 2);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "./Q1");
        assert_eq!(args, vec!["2"]);
    }

    #[test]
    fn test_missing_program() {
        let outcome = run_program(
            &Launcher::Direct,
            Path::new("/nonexistent/sparsebench-q1"),
            1,
            "1 1 1\n0\n0",
            Duration::from_secs(1),
        );
        assert!(matches!(outcome, RunOutcome::SpawnFailed { .. }));
        assert_eq!(outcome.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_error_messages() {
        let failed = RunOutcome::NonZeroExit {
            elapsed: Duration::from_millis(3),
            code: Some(2),
            stderr: String::new(),
        };
        assert_eq!(failed.error_message().as_deref(), Some("ReturnCode:2"));

        let timed_out = RunOutcome::TimedOut {
            timeout: Duration::from_secs(60),
        };
        assert_eq!(timed_out.error_message().as_deref(), Some("Timeout"));
        assert_eq!(timed_out.elapsed(), Duration::from_secs(60));
    }
}
