//! Global context for px operations.
//!
//! Bundles the validated store root, the merged configuration and the
//! cancel token so every operation receives them explicitly instead of
//! reading process-wide state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::store::StoreRoot;
use crate::util::cancel::{self, CancelToken};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Validated store root
    store: StoreRoot,

    /// Merged configuration
    config: Config,

    /// Token tripped on interrupt
    cancel: CancelToken,
}

impl GlobalContext {
    /// Create a context for the current directory.
    ///
    /// `store_override` (from `--pkgs` / `PX_PKGS`) wins over the configured
    /// store root. Fails with a configuration error if the resulting root is
    /// not an existing directory.
    pub fn new(store_override: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let config = load_config(
            global_config_path().as_deref(),
            &project_config_path(&cwd),
        );
        Self::with_config(cwd, config, store_override)
    }

    /// Create a context from explicit parts.
    pub fn with_config(cwd: PathBuf, config: Config, store_override: Option<&Path>) -> Result<Self> {
        let root = store_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.store_root());
        let store = StoreRoot::open(cwd.join(root))?;

        Ok(GlobalContext {
            store,
            config,
            cancel: cancel::global(),
        })
    }

    /// Get the store root.
    pub fn store(&self) -> &StoreRoot {
        &self.store
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration, for command-line overrides.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Get the cancel token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}
