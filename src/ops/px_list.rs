//! Implementation of `px list`.

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::store::StoreRoot;

/// A rendered listing of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreListing {
    /// Box-drawing tree, one entry per line, root first
    pub tree: String,
    pub dirs: usize,
    pub files: usize,
}

impl StoreListing {
    /// The `N directories, M files` summary line.
    pub fn summary(&self) -> String {
        format!(
            "{} {}, {} {}",
            self.dirs,
            if self.dirs == 1 { "directory" } else { "directories" },
            self.files,
            if self.files == 1 { "file" } else { "files" }
        )
    }
}

/// Render the store as a tree. Entries are sorted by name; symlinks are
/// listed but not followed.
pub fn list(store: &StoreRoot) -> Result<StoreListing> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(store.path())
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("failed to list {}", store))?;
        entries.push(entry);
    }

    // An entry is the last of its siblings when no later entry shares its
    // depth before the walk climbs above it.
    let mut is_last = vec![false; entries.len()];
    let mut seen: Vec<bool> = Vec::new();
    for (idx, entry) in entries.iter().enumerate().rev() {
        let depth = entry.depth();
        if seen.len() <= depth {
            seen.resize(depth + 1, false);
        }
        is_last[idx] = !seen[depth];
        seen[depth] = true;
        for deeper in seen.iter_mut().skip(depth + 1) {
            *deeper = false;
        }
    }

    let mut tree = format!("{}\n", store);
    let mut dirs = 0;
    let mut files = 0;
    // ancestors[d] is true when the open entry at depth d was a last child.
    let mut ancestors: Vec<bool> = Vec::new();

    for (entry, last) in entries.iter().zip(is_last) {
        let depth = entry.depth();
        ancestors.truncate(depth - 1);

        for ancestor_last in &ancestors {
            tree.push_str(if *ancestor_last { "    " } else { "│   " });
        }
        tree.push_str(if last { "└── " } else { "├── " });
        tree.push_str(&entry.file_name().to_string_lossy());
        tree.push('\n');

        if entry.file_type().is_dir() {
            dirs += 1;
        } else {
            files += 1;
        }
        ancestors.push(last);
    }

    Ok(StoreListing { tree, dirs, files })
}
