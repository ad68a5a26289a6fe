//! Configuration file support for px.
//!
//! px reads two configuration files:
//! - Global: `~/.px/config.toml` - User-wide defaults
//! - Project: `.px/config.toml` - Overrides for the current directory
//!
//! Project config takes precedence over global config. Command-line flags
//! and `PX_PKGS` take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::locator::Scheme;
use crate::sources::transport::TransportKind;

/// Default store root, relative to the working directory.
pub const DEFAULT_STORE_ROOT: &str = "./.pkgs";

/// Default program used to launch `px run` entries.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Default search-path variable the store root is exposed through.
pub const DEFAULT_SEARCH_PATH_VAR: &str = "PYTHONPATH";

/// px configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store settings
    pub store: StoreConfig,

    /// Install/uninstall settings
    pub install: InstallConfig,

    /// `px run` settings
    pub run: RunConfig,
}

/// Store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store root directory
    pub root: Option<PathBuf>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Scheme for locators without one; applies to install and uninstall alike
    pub default_scheme: Option<Scheme>,

    /// Clone transport (git, libgit2)
    pub transport: Option<TransportKind>,

    /// Client program for the `git` transport
    pub git: Option<String>,

    /// Clone timeout in seconds (0 = none)
    pub clone_timeout: Option<u64>,

    /// Remove the `.git` directory after a successful clone
    pub strip_vcs: Option<bool>,
}

/// Run-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Program that launches the entry; empty runs the entry directly
    pub interpreter: Option<String>,

    /// Environment variable the store root is prepended to
    pub search_path_var: Option<String>,

    /// Run timeout in seconds (0 = none)
    pub timeout: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.store.root.is_some() {
            self.store.root = other.store.root;
        }

        if other.install.default_scheme.is_some() {
            self.install.default_scheme = other.install.default_scheme;
        }
        if other.install.transport.is_some() {
            self.install.transport = other.install.transport;
        }
        if other.install.git.is_some() {
            self.install.git = other.install.git;
        }
        if other.install.clone_timeout.is_some() {
            self.install.clone_timeout = other.install.clone_timeout;
        }
        if other.install.strip_vcs.is_some() {
            self.install.strip_vcs = other.install.strip_vcs;
        }

        if other.run.interpreter.is_some() {
            self.run.interpreter = other.run.interpreter;
        }
        if other.run.search_path_var.is_some() {
            self.run.search_path_var = other.run.search_path_var;
        }
        if other.run.timeout.is_some() {
            self.run.timeout = other.run.timeout;
        }
    }

    /// Store root, falling back to `./.pkgs`.
    pub fn store_root(&self) -> PathBuf {
        self.store
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT))
    }

    pub fn default_scheme(&self) -> Scheme {
        self.install.default_scheme.unwrap_or_default()
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.install.transport.unwrap_or_default()
    }

    pub fn git_program(&self) -> &str {
        self.install.git.as_deref().unwrap_or("git")
    }

    pub fn clone_timeout(&self) -> Option<Duration> {
        seconds(self.install.clone_timeout)
    }

    pub fn strip_vcs(&self) -> bool {
        self.install.strip_vcs.unwrap_or(true)
    }

    /// Interpreter for `px run`; `None` means the entry is executed directly.
    pub fn interpreter(&self) -> Option<&str> {
        match self.run.interpreter.as_deref() {
            Some("") => None,
            Some(program) => Some(program),
            None => Some(DEFAULT_INTERPRETER),
        }
    }

    pub fn search_path_var(&self) -> &str {
        self.run
            .search_path_var
            .as_deref()
            .unwrap_or(DEFAULT_SEARCH_PATH_VAR)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        seconds(self.run.timeout)
    }
}

fn seconds(value: Option<u64>) -> Option<Duration> {
    value.filter(|s| *s > 0).map(Duration::from_secs)
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.px/config.toml)
/// 2. Global config (~/.px/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global px config directory (~/.px).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".px"))
}

/// Get the global config path (~/.px/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.px/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".px").join("config.toml")
}
