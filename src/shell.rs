//! External command invocation for the cleanup collaborators.
//!
//! Commands are a program plus an argument list; nothing is ever passed
//! through a shell.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{CleanError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long output collection waits for the pipes to close once the child
/// has exited. A background grandchild can hold them open indefinitely.
const PIPE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub trait ShellExecutor: Send + Sync {
    fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput>;

    /// Whether `program` resolves on `PATH`, asked through `which`.
    fn is_available(&self, program: &str) -> bool {
        self.run(&CommandSpec::new("which").arg(program))
            .map(|out| out.success && !out.stdout.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Runs commands with `std::process`.
pub struct SystemShell;

impl ShellExecutor for SystemShell {
    fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CleanError::CommandUnavailable {
                    program: cmd.program.clone(),
                },
                _ => CleanError::Command {
                    program: cmd.program.clone(),
                    message: e.to_string(),
                },
            })?;

        // Drain both pipes on their own threads so a chatty child cannot
        // block on a full pipe while we wait on it.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    reap(&mut child);
                    return Err(CleanError::Command {
                        program: cmd.program.clone(),
                        message: e.to_string(),
                    });
                }
            }
            if let Some(timeout) = cmd.timeout {
                if started.elapsed() >= timeout {
                    reap(&mut child);
                    return Err(CleanError::CommandTimeout {
                        program: cmd.program.clone(),
                        timeout,
                    });
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        let deadline = Instant::now() + PIPE_GRACE;
        Ok(CommandOutput {
            success: status.success(),
            stdout: collect(stdout, deadline),
            stderr: collect(stderr, deadline),
        })
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Output of one pipe, filled by a detached thread.
struct PipeReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> PipeReader {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buf);
    let (tx, done) = mpsc::channel();
    thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => match sink.lock() {
                    Ok(mut out) => out.extend_from_slice(&chunk[..n]),
                    Err(_) => break,
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        let _ = tx.send(());
    });
    PipeReader { buf, done }
}

/// Whatever the pipe produced by end of stream or `deadline`, whichever
/// comes first.
fn collect(reader: Option<PipeReader>, deadline: Instant) -> String {
    let Some(reader) = reader else {
        return String::new();
    };
    let _ = reader
        .done
        .recv_timeout(deadline.saturating_duration_since(Instant::now()));
    let bytes = reader
        .buf
        .lock()
        .map(|out| out.clone())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = CommandSpec::new("brew").args(["cleanup", "--prune=all"]);
        assert_eq!(cmd.display(), "brew cleanup --prune=all");
        assert_eq!(cmd.timeout, None);
    }

    #[cfg(unix)]
    #[test]
    fn captures_output() {
        let out = SystemShell
            .run(&CommandSpec::new("sh").args(["-c", "echo hi; echo oops >&2"]))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "hi");
        assert_eq!(out.stderr, "oops");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let err = SystemShell
            .run(&CommandSpec::new("definitely-not-a-real-program-xyz"))
            .unwrap_err();
        assert!(matches!(err, CleanError::CommandUnavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let cmd = CommandSpec::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(200));
        let err = SystemShell.run(&cmd).unwrap_err();
        assert!(matches!(err, CleanError::CommandTimeout { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn background_grandchild_does_not_hold_up_output() {
        let started = Instant::now();
        let out = SystemShell
            .run(&CommandSpec::new("sh").args(["-c", "sleep 5 & echo done"]))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "done");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_status_and_stderr() {
        let out = SystemShell
            .run(&CommandSpec::new("sh").args(["-c", "echo nope >&2; exit 3"]))
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.stderr, "nope");
    }
}
