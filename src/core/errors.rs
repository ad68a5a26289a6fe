//! Package store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Exit status used when no underlying tool status is available.
pub const GENERIC_FAILURE: i32 = 1;

/// Exit status reported when a subprocess exceeded its deadline.
pub const DEADLINE_EXCEEDED: i32 = 124;

/// Exit status reported when a subprocess was interrupted.
pub const INTERRUPTED: i32 = 130;

/// Error raised by the package store lifecycle.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} is not a directory or does not exist", path.display())]
    Configuration { path: PathBuf },

    #[error("'{locator}' is already installed at '{}'", root.display())]
    AlreadyInstalled { locator: String, root: PathBuf },

    #[error("'{locator}' is not installed at '{}'", root.display())]
    NotInstalled { locator: String, root: PathBuf },

    #[error("path `{}` escapes the store root `{}`", candidate.display(), root.display())]
    SandboxViolation { root: PathBuf, candidate: PathBuf },

    #[error("invalid package locator `{locator}`: {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("`{tool}` exited with status {code}")]
    TransportFailure { tool: String, code: i32 },

    #[error("entry `{}` is not a file or does not exist", path.display())]
    EntryNotFound { path: PathBuf },
}

impl StoreError {
    /// The process exit status this error maps to.
    ///
    /// Transport failures carry the tool's own status verbatim.
    pub fn exit_code(&self) -> i32 {
        match self {
            StoreError::TransportFailure { code, .. } => *code,
            _ => GENERIC_FAILURE,
        }
    }
}
