//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Create `path` as a new, empty directory, creating missing parents.
///
/// Returns `Ok(false)` without touching anything if `path` already exists.
/// The final `create_dir` is the exclusive step: of two racing callers only
/// one observes `Ok(true)`.
pub fn create_dir_exclusive(path: &Path) -> Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("failed to create directory: {}", path.display()))
        }
    }
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Replace `path` with `contents` without exposing a partially written file.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("failed to write temporary file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to flush temporary file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_dir_exclusive() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("org").join("pkg");

        assert!(create_dir_exclusive(&dest).unwrap());
        assert!(dest.is_dir());
        assert!(!create_dir_exclusive(&dest).unwrap());
    }

    #[test]
    fn test_remove_dir_all_if_exists() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("pkg");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("file.txt"), "x").unwrap();

        remove_dir_all_if_exists(&dir).unwrap();
        assert!(!dir.exists());

        // Absent is fine.
        remove_dir_all_if_exists(&dir).unwrap();
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.bundle");
        fs::write(&out, "old").unwrap();

        write_atomic(&out, b"new").unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "new");
        // No stray temporary files remain.
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
