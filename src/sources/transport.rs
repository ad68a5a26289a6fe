//! Clone transports - HOW a remote package is fetched into the store.
//!
//! The store manager only needs "clone URL into this empty directory and
//! tell me the exit status". Two transports provide that:
//! - [`GitCliTransport`] runs the external `git` client, whose exit status
//!   is propagated verbatim.
//! - [`LibGit2Transport`] clones in-process with libgit2 and reports
//!   failures with git's own fatal status (128).

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks};
use serde::{Deserialize, Serialize};

use crate::core::errors::{DEADLINE_EXCEEDED, INTERRUPTED};
use crate::util::cancel::CancelToken;
use crate::util::process::{find_executable, ProcessBuilder, POLL_INTERVAL};
use crate::util::Config;

/// Exit status git uses for fatal errors.
pub const GIT_FATAL: i32 = 128;

/// Which transport the installer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// External `git` client.
    #[default]
    Git,
    /// In-process libgit2.
    Libgit2,
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(TransportKind::Git),
            "libgit2" => Ok(TransportKind::Libgit2),
            _ => Err(format!(
                "invalid transport '{}'; expected 'git' or 'libgit2'",
                s
            )),
        }
    }
}

/// Something that can clone a repository into a directory.
pub trait CloneTransport {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Clone `url` into `dest`, which exists and is empty.
    ///
    /// `Ok(code)` carries the transfer's exit status (0 on success). `Err` is
    /// reserved for failures to start the transfer at all.
    fn fetch_into(&self, url: &str, dest: &Path) -> Result<i32>;
}

/// Clones with the external `git` client.
///
/// `program` is looked up on `PATH` when a clone starts, so building the
/// transport never fails.
#[derive(Debug, Clone)]
pub struct GitCliTransport {
    program: PathBuf,
    timeout: Option<Duration>,
    cancel: CancelToken,
}

impl GitCliTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        GitCliTransport {
            program: program.into(),
            timeout: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl CloneTransport for GitCliTransport {
    fn name(&self) -> &str {
        "git clone"
    }

    fn fetch_into(&self, url: &str, dest: &Path) -> Result<i32> {
        let program = find_executable(&self.program)
            .ok_or_else(|| anyhow!("`{}` not found in PATH", self.program.display()))?;
        let outcome = ProcessBuilder::new(program)
            .args(["clone", "--quiet", "--"])
            .arg(url)
            .arg(dest)
            .timeout(self.timeout)
            .cancel_token(self.cancel.clone())
            .run()?;
        Ok(outcome.code())
    }
}

/// Clones in-process with libgit2.
///
/// The clone runs on a worker thread while the caller polls the deadline and
/// the cancel token, so a server that stops answering cannot hold the caller
/// past either. An abandoned worker is told to stop at its next progress
/// callback and otherwise left to finish on its own.
#[derive(Debug, Clone, Default)]
pub struct LibGit2Transport {
    timeout: Option<Duration>,
    cancel: CancelToken,
}

impl LibGit2Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl CloneTransport for LibGit2Transport {
    fn name(&self) -> &str {
        "libgit2 clone"
    }

    fn fetch_into(&self, url: &str, dest: &Path) -> Result<i32> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let abort = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        {
            let url = url.to_string();
            let dest = dest.to_path_buf();
            let cancel = self.cancel.clone();
            let abort = abort.clone();
            thread::Builder::new()
                .name("px-libgit2-clone".to_string())
                .spawn(move || {
                    let mut callbacks = RemoteCallbacks::new();
                    // Returning false from the progress callback aborts the transfer.
                    callbacks.transfer_progress(|_| !cancel.is_cancelled() && !abort.is_cancelled());

                    let mut fetch = FetchOptions::new();
                    fetch.remote_callbacks(callbacks);

                    let result = RepoBuilder::new()
                        .fetch_options(fetch)
                        .clone(&url, &dest)
                        .map(|_| ());
                    // The receiver is gone once the caller has given up.
                    let _ = tx.send(result);
                })
                .context("failed to start libgit2 clone")?;
        }

        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(())) => return Ok(0),
                Ok(Err(e)) => {
                    tracing::error!("failed to clone {}: {}", url, e.message());
                    let code = if self.cancel.is_cancelled() {
                        INTERRUPTED
                    } else if deadline.is_some_and(|d| Instant::now() >= d) {
                        DEADLINE_EXCEEDED
                    } else {
                        GIT_FATAL
                    };
                    return Ok(code);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("libgit2 clone of {} stopped without a result", url)
                }
            }

            if self.cancel.is_cancelled() {
                abort.cancel();
                tracing::debug!("clone of {} interrupted", url);
                return Ok(INTERRUPTED);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                abort.cancel();
                tracing::error!("clone of {} exceeded its deadline", url);
                return Ok(DEADLINE_EXCEEDED);
            }
        }
    }
}

/// Build the transport selected by `config`.
pub fn from_config(config: &Config, cancel: CancelToken) -> Box<dyn CloneTransport> {
    let timeout = config.clone_timeout();
    match config.transport_kind() {
        TransportKind::Git => Box::new(
            GitCliTransport::new(config.git_program())
                .with_timeout(timeout)
                .with_cancel_token(cancel),
        ),
        TransportKind::Libgit2 => Box::new(
            LibGit2Transport::new()
                .with_timeout(timeout)
                .with_cancel_token(cancel),
        ),
    }
}
