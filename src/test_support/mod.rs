//! Test utilities and mocks for px unit tests.
//!
//! Provides a scripted clone transport so lifecycle operations can be
//! exercised without a network or a `git` binary, plus fixtures for local
//! repositories and bundle inputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use px::test_support::MockTransport;
//!
//! let transport = MockTransport::succeeding(&[("lib.txt", "hello")]);
//! // Hand `&transport` to `install(...)` ...
//! assert_eq!(transport.calls().len(), 1);
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;

pub use fixtures::*;

use crate::sources::CloneTransport;

/// One recorded `fetch_into` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneCall {
    pub url: String,
    pub dest: PathBuf,
}

/// A clone transport that writes canned files and returns a canned status.
///
/// On success it also creates a `.git` directory, like a real clone. On
/// failure it still writes the files first, simulating a half-finished
/// transfer.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    files: Vec<(String, String)>,
    code: i32,
    calls: Arc<Mutex<Vec<CloneCall>>>,
}

impl MockTransport {
    /// A transport whose clones succeed with the given files.
    pub fn succeeding(files: &[(&str, &str)]) -> Self {
        MockTransport {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            code: 0,
            calls: Arc::default(),
        }
    }

    /// A transport whose clones leave partial files and exit with `code`.
    pub fn failing(code: i32) -> Self {
        MockTransport {
            files: vec![("partial.pack".to_string(), "garbage".to_string())],
            code,
            calls: Arc::default(),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<CloneCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CloneTransport for MockTransport {
    fn name(&self) -> &str {
        "mock clone"
    }

    fn fetch_into(&self, url: &str, dest: &Path) -> Result<i32> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(CloneCall {
                url: url.to_string(),
                dest: dest.to_path_buf(),
            });
        }

        for (path, content) in &self.files {
            let full = dest.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }
        if self.code == 0 {
            std::fs::create_dir_all(dest.join(".git").join("objects"))?;
            std::fs::write(dest.join(".git").join("HEAD"), "ref: refs/heads/main\n")?;
        }
        Ok(self.code)
    }
}
