//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use git2::{Repository, Signature};

/// Create a git repository at `path` with one commit containing `files`.
pub fn init_repo(path: &Path, files: &[(&str, &str)]) -> PathBuf {
    std::fs::create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();

    let mut index = repo.index().unwrap();
    for (name, content) in files {
        let full = path.join(name);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full, content).unwrap();
        index.add_path(Path::new(name)).unwrap();
    }
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("px", "px@example.org").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();

    path.canonicalize().unwrap()
}

/// Write a unit source file and return its path.
pub fn write_unit(dir: &Path, file_name: &str, source: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, source).unwrap();
    path
}
