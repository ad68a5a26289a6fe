//! Subprocess execution utilities.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::core::errors::{DEADLINE_EXCEEDED, GENERIC_FAILURE, INTERRUPTED};
use crate::util::cancel::CancelToken;

/// Interval between child status polls.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How a waited-on subprocess ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The child exited on its own.
    Exited(ExitStatus),
    /// The deadline passed; the child was killed and reaped.
    TimedOut,
    /// The cancel token tripped; the child was killed and reaped.
    Cancelled,
}

impl ProcessOutcome {
    /// Exit status to report for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            ProcessOutcome::Exited(status) => exit_code(status),
            ProcessOutcome::TimedOut => DEADLINE_EXCEEDED,
            ProcessOutcome::Cancelled => INTERRUPTED,
        }
    }
}

/// Builder for subprocess execution.
///
/// Children inherit stdio; the caller's terminal sees their output directly.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<OsString>,
    env: HashMap<String, OsString>,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout: None,
            cancel: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Set an environment variable on top of the inherited environment.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_os_string());
        self
    }

    /// Kill the child if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kill the child once `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Get an environment override, if set.
    pub fn get_env(&self, key: &str) -> Option<&OsStr> {
        self.env.get(key).map(OsString::as_os_str)
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd
    }

    /// Spawn the command and wait for it, honouring the deadline and cancel token.
    pub fn run(&self) -> Result<ProcessOutcome> {
        tracing::debug!("running `{}`", self.display_command());

        let mut child = self
            .build_command()
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let outcome = self.wait(&mut child)?;
        tracing::debug!("`{}` finished: {:?}", self.program.display(), outcome);
        Ok(outcome)
    }

    fn wait(&self, child: &mut Child) -> Result<ProcessOutcome> {
        // Fast path: nothing to watch for, block on the child.
        if self.timeout.is_none() && self.cancel.is_none() {
            let status = child
                .wait()
                .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;
            return Ok(ProcessOutcome::Exited(status));
        }

        let deadline = self.timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(status) = child
                .try_wait()
                .with_context(|| format!("failed to wait for `{}`", self.program.display()))?
            {
                return Ok(ProcessOutcome::Exited(status));
            }

            let outcome = if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                Some(ProcessOutcome::Cancelled)
            } else if deadline.is_some_and(|d| Instant::now() >= d) {
                Some(ProcessOutcome::TimedOut)
            } else {
                None
            };

            if let Some(outcome) = outcome {
                tracing::warn!(
                    "terminating `{}` ({:?})",
                    self.program.display(),
                    outcome
                );
                // The child may have exited between the poll and the kill.
                let _ = child.kill();
                child
                    .wait()
                    .with_context(|| format!("failed to reap `{}`", self.program.display()))?;
                return Ok(outcome);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Numeric exit code of a finished process.
///
/// On Unix a signal-terminated child reports `128 + signal`, as shells do.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    GENERIC_FAILURE
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}
