//! Implementation of `px install` and `px uninstall`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::StoreError;
use crate::core::locator::{resolve, PackageLocator, Scheme};
use crate::core::store::{PackageState, StoreRoot};
use crate::sources::CloneTransport;
use crate::util::fs::{create_dir_exclusive, remove_dir_all_if_exists};

/// Name of the version-control metadata directory a clone leaves behind.
const VCS_DIR: &str = ".git";

/// Options for installing a package.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Scheme for locators without one
    pub default_scheme: Scheme,

    /// Remove the `.git` directory after a successful clone
    pub strip_vcs: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            default_scheme: Scheme::default(),
            strip_vcs: true,
        }
    }
}

/// Result of an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    Installed { name: String, url: String, dest: PathBuf },
    /// The locator had neither host nor path; nothing was done.
    Skipped,
}

/// Result of an uninstall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallResult {
    Removed { name: String, dest: PathBuf },
    /// The locator had neither host nor path; nothing was done.
    Skipped,
}

/// Clone a package into the store.
///
/// The destination is claimed by creating it exclusively before the clone,
/// so two racing installs cannot both proceed. A failed clone removes what
/// it left behind and reports the transport's status.
pub fn install(
    store: &StoreRoot,
    locator: &PackageLocator,
    transport: &dyn CloneTransport,
    opts: &InstallOptions,
) -> Result<InstallResult> {
    let Some(resolved) = resolve(locator, opts.default_scheme) else {
        tracing::debug!("locator `{}` has no host or path, skipping", locator);
        return Ok(InstallResult::Skipped);
    };

    let url = resolved.validated_url()?;
    let pkg = store.package(&resolved)?;

    if !create_dir_exclusive(pkg.dest())? {
        return Err(StoreError::AlreadyInstalled {
            locator: pkg.name().to_string(),
            root: store.path().to_path_buf(),
        }
        .into());
    }

    tracing::info!("cloning {} into {}", url, pkg.dest().display());
    let code = match transport.fetch_into(url.as_str(), pkg.dest()) {
        Ok(code) => code,
        Err(e) => {
            discard_partial(store, pkg.dest());
            return Err(e);
        }
    };

    if code != 0 {
        discard_partial(store, pkg.dest());
        return Err(StoreError::TransportFailure {
            tool: transport.name().to_string(),
            code,
        }
        .into());
    }

    if opts.strip_vcs {
        let vcs = pkg.dest().join(VCS_DIR);
        if let Err(e) = remove_dir_all_if_exists(&vcs) {
            tracing::warn!("{:#}", e);
        }
    }

    Ok(InstallResult::Installed {
        name: pkg.name().to_string(),
        url: url.to_string(),
        dest: pkg.dest().to_path_buf(),
    })
}

/// Remove an installed package from the store.
pub fn uninstall(
    store: &StoreRoot,
    locator: &PackageLocator,
    default_scheme: Scheme,
) -> Result<UninstallResult> {
    let Some(resolved) = resolve(locator, default_scheme) else {
        tracing::debug!("locator `{}` has no host or path, skipping", locator);
        return Ok(UninstallResult::Skipped);
    };

    let pkg = store.package(&resolved)?;
    if pkg.state() == PackageState::Absent {
        return Err(StoreError::NotInstalled {
            locator: pkg.name().to_string(),
            root: store.path().to_path_buf(),
        }
        .into());
    }

    tracing::info!("removing {}", pkg.dest().display());
    remove_dir_all_if_exists(pkg.dest())?;
    prune_empty_parents(store, pkg.dest());

    Ok(UninstallResult::Removed {
        name: pkg.name().to_string(),
        dest: pkg.dest().to_path_buf(),
    })
}

/// Best-effort removal of a half-finished clone.
fn discard_partial(store: &StoreRoot, dest: &Path) {
    tracing::debug!("discarding partial clone at {}", dest.display());
    if let Err(e) = remove_dir_all_if_exists(dest) {
        tracing::warn!("{:#}", e);
    }
    prune_empty_parents(store, dest);
}

/// Remove now-empty directories between `dest` and the store root.
fn prune_empty_parents(store: &StoreRoot, dest: &Path) {
    let mut current = dest.parent();
    while let Some(dir) = current {
        if dir == store.path() || !dir.starts_with(store.path()) {
            break;
        }
        // Fails (and stops) at the first non-empty directory.
        if fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::GitCliTransport;
    use crate::test_support::MockTransport;
    use tempfile::TempDir;

    fn store() -> (TempDir, StoreRoot) {
        let tmp = TempDir::new().unwrap();
        let root = StoreRoot::open(tmp.path()).unwrap();
        (tmp, root)
    }

    fn loc(s: &str) -> PackageLocator {
        PackageLocator::parse(s)
    }

    #[test]
    fn test_install_clones_and_strips_vcs() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[("lib.txt", "hello")]);

        let result = install(&root, &loc("example.org/pkg"), &transport, &InstallOptions::default())
            .unwrap();

        let dest = root.path().join("pkg");
        assert_eq!(
            result,
            InstallResult::Installed {
                name: "example.org/pkg".to_string(),
                url: "https://example.org/pkg".to_string(),
                dest: dest.clone(),
            }
        );
        assert_eq!(fs::read_to_string(dest.join("lib.txt")).unwrap(), "hello");
        assert!(!dest.join(".git").exists());

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://example.org/pkg");
        assert_eq!(calls[0].dest, dest);
    }

    #[test]
    fn test_install_keeps_vcs_when_asked() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[]);
        let opts = InstallOptions {
            strip_vcs: false,
            ..InstallOptions::default()
        };

        install(&root, &loc("example.org/pkg"), &transport, &opts).unwrap();
        assert!(root.path().join("pkg").join(".git").is_dir());
    }

    #[test]
    fn test_install_uses_configured_scheme() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[]);
        let opts = InstallOptions {
            default_scheme: Scheme::Http,
            ..InstallOptions::default()
        };

        install(&root, &loc("example.org/pkg"), &transport, &opts).unwrap();
        assert_eq!(transport.calls()[0].url, "http://example.org/pkg");
    }

    #[test]
    fn test_install_twice_is_already_installed() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[("lib.txt", "v1")]);
        let opts = InstallOptions::default();
        install(&root, &loc("example.org/pkg"), &transport, &opts).unwrap();

        let again = MockTransport::succeeding(&[("lib.txt", "v2")]);
        let err = install(&root, &loc("example.org/pkg"), &again, &opts).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::AlreadyInstalled { .. })
        ));
        assert!(again.calls().is_empty());
        assert_eq!(
            fs::read_to_string(root.path().join("pkg").join("lib.txt")).unwrap(),
            "v1"
        );
    }

    #[test]
    fn test_already_installed_wins_over_missing_git() {
        let (_tmp, root) = store();
        let opts = InstallOptions::default();
        install(&root, &loc("example.org/pkg"), &MockTransport::succeeding(&[]), &opts).unwrap();

        let git = GitCliTransport::new("px-no-such-git");
        let err = install(&root, &loc("example.org/pkg"), &git, &opts).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::AlreadyInstalled { .. })
        ));
    }

    #[test]
    fn test_failed_clone_propagates_code_and_cleans_up() {
        let (_tmp, root) = store();
        let transport = MockTransport::failing(128);

        let err = install(&root, &loc("example.org/org/pkg"), &transport, &InstallOptions::default())
            .unwrap_err();

        match err.downcast_ref::<StoreError>() {
            Some(e @ StoreError::TransportFailure { .. }) => assert_eq!(e.exit_code(), 128),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!root.path().join("org").exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_install_sandbox_violation_has_no_side_effects() {
        let (tmp, root) = store();
        let transport = MockTransport::succeeding(&[]);

        let err = install(&root, &loc("https://example.org/../escape"), &transport, &InstallOptions::default())
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::SandboxViolation { .. })
        ));
        assert!(transport.calls().is_empty());
        assert!(!tmp.path().parent().unwrap().join("escape").exists());
    }

    #[test]
    fn test_install_host_only_is_rejected() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[]);

        let err = install(&root, &loc("https://example.org"), &transport, &InstallOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::SandboxViolation { .. })
        ));
    }

    #[test]
    fn test_install_empty_locator_is_skipped() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[]);

        let result = install(&root, &loc(""), &transport, &InstallOptions::default()).unwrap();
        assert_eq!(result, InstallResult::Skipped);
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_uninstall_twice() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[("lib.txt", "x")]);
        install(&root, &loc("example.org/org/pkg"), &transport, &InstallOptions::default()).unwrap();

        let result = uninstall(&root, &loc("example.org/org/pkg"), Scheme::Https).unwrap();
        assert!(matches!(result, UninstallResult::Removed { .. }));
        assert!(!root.path().join("org").join("pkg").exists());
        assert!(!root.path().join("org").exists());

        let err = uninstall(&root, &loc("example.org/org/pkg"), Scheme::Https).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotInstalled { .. })
        ));
    }

    #[test]
    fn test_uninstall_keeps_siblings() {
        let (_tmp, root) = store();
        let transport = MockTransport::succeeding(&[]);
        let opts = InstallOptions::default();
        install(&root, &loc("example.org/org/a"), &transport, &opts).unwrap();
        install(&root, &loc("example.org/org/b"), &transport, &opts).unwrap();

        uninstall(&root, &loc("example.org/org/a"), Scheme::Https).unwrap();
        assert!(root.path().join("org").join("b").is_dir());
    }

    #[test]
    fn test_uninstall_empty_locator_is_skipped() {
        let (_tmp, root) = store();
        assert_eq!(
            uninstall(&root, &loc(""), Scheme::Https).unwrap(),
            UninstallResult::Skipped
        );
    }
}
