//! Implementation of `px run`.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::errors::StoreError;
use crate::core::store::StoreRoot;
use crate::util::cancel::CancelToken;
use crate::util::config::{DEFAULT_INTERPRETER, DEFAULT_SEARCH_PATH_VAR};
use crate::util::process::ProcessBuilder;

/// Options for running a program against the store.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Program that launches the entry; `None` executes the entry itself
    pub interpreter: Option<String>,

    /// Environment variable the store root is prepended to
    pub search_path_var: String,

    /// Extra arguments passed to the entry
    pub args: Vec<String>,

    /// Kill the program after this long
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            interpreter: Some(DEFAULT_INTERPRETER.to_string()),
            search_path_var: DEFAULT_SEARCH_PATH_VAR.to_string(),
            args: Vec::new(),
            timeout: None,
        }
    }
}

/// Run `entry` with the store root on its search path and return its exit code.
pub fn run(
    store: &StoreRoot,
    entry: &Path,
    opts: &RunOptions,
    cancel: CancelToken,
) -> Result<i32> {
    let process = build_process(store, entry, opts)?
        .timeout(opts.timeout)
        .cancel_token(cancel);

    tracing::info!("running {}", entry.display());
    let outcome = process.run()?;
    Ok(outcome.code())
}

fn build_process(store: &StoreRoot, entry: &Path, opts: &RunOptions) -> Result<ProcessBuilder> {
    if !entry.is_file() {
        return Err(StoreError::EntryNotFound {
            path: entry.to_path_buf(),
        }
        .into());
    }

    let search_path = search_path(store.path(), env::var_os(&opts.search_path_var))?;

    let builder = match opts.interpreter.as_deref() {
        Some(interpreter) => ProcessBuilder::new(interpreter).arg(entry),
        // A bare relative name would be looked up in PATH instead.
        None => ProcessBuilder::new(absolute(entry)?),
    };

    Ok(builder
        .args(&opts.args)
        .env(&opts.search_path_var, search_path))
}

/// `root` followed by the entries of `existing`, joined for the platform.
fn search_path(root: &Path, existing: Option<OsString>) -> Result<OsString> {
    let mut paths = vec![root.to_path_buf()];
    if let Some(existing) = existing {
        paths.extend(env::split_paths(&existing).filter(|p| !p.as_os_str().is_empty()));
    }
    env::join_paths(paths).context("store root cannot be placed on a search path")
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("failed to resolve {}", path.display()))
}
