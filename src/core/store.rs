//! The package store - the local root that holds installed packages.
//!
//! Every path derived from a locator goes through [`contained_path`] before
//! the filesystem is touched. There is no manifest: a package is installed
//! exactly when its destination directory exists.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::core::errors::StoreError;
use crate::core::locator::ResolvedLocator;

/// A validated, canonical store root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRoot {
    path: PathBuf,
}

impl StoreRoot {
    /// Open an existing store root.
    ///
    /// Fails with [`StoreError::Configuration`] unless `path` exists and is a
    /// directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(StoreError::Configuration {
                path: path.to_path_buf(),
            });
        }
        let canonical = path
            .canonicalize()
            .map_err(|_| StoreError::Configuration {
                path: path.to_path_buf(),
            })?;
        Ok(StoreRoot { path: canonical })
    }

    /// The canonical root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locate the package a resolved locator refers to.
    pub fn package(&self, locator: &ResolvedLocator) -> Result<InstalledPackage, StoreError> {
        let dest = contained_path(self, &locator.relative_path())?;
        Ok(InstalledPackage {
            name: locator.display_name(),
            dest,
        })
    }
}

impl fmt::Display for StoreRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Whether a package is present in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Absent,
    Installed,
}

/// A package's slot in the store, whether or not it is currently installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    name: String,
    dest: PathBuf,
}

impl InstalledPackage {
    /// `host` + `path` of the locator this package came from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination directory inside the store root.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn state(&self) -> PackageState {
        if self.dest.is_dir() {
            PackageState::Installed
        } else {
            PackageState::Absent
        }
    }
}

/// Join `relative` onto the store root, refusing anything that escapes it.
///
/// Rejects absolute paths, `..` segments, paths that resolve to the root
/// itself, and paths whose existing prefix is a symlink leading outside the
/// root. Reads metadata only; never creates or removes anything.
pub fn contained_path(root: &StoreRoot, relative: &Path) -> Result<PathBuf, StoreError> {
    let violation = || StoreError::SandboxViolation {
        root: root.path().to_path_buf(),
        candidate: root.path().join(relative),
    };

    let mut normal = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => normal.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(violation());
            }
        }
    }
    if normal.is_empty() {
        return Err(violation());
    }

    // Canonicalize the deepest existing ancestor so symlinks are followed,
    // then re-append the components that do not exist yet.
    let mut resolved = root.path().to_path_buf();
    let mut pending = normal.into_iter().peekable();
    while let Some(part) = pending.peek() {
        let next = resolved.join(part);
        if next.symlink_metadata().is_err() {
            break;
        }
        resolved = next.canonicalize().map_err(|_| violation())?;
        pending.next();
    }
    for part in pending {
        resolved.push(part);
    }

    if resolved == root.path() || !resolved.starts_with(root.path()) {
        return Err(violation());
    }
    Ok(resolved)
}
