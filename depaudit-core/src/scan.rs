//! Snapshot file discovery with efficient directory pruning.
//!
//! A multi-project build may export one snapshot per included build; this
//! walks a directory tree, prunes directories that never hold snapshots,
//! and returns every `*.depsnap.json` in deterministic order.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File suffix identifying a build-graph snapshot export.
pub const SNAPSHOT_SUFFIX: &str = ".depsnap.json";

/// Directories to exclude by default.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", ".cargo"];

/// Checks if a directory entry should be pruned from traversal.
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Gathers all snapshot files under the root, sorted by path.
pub fn gather_snapshot_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_snapshot_files_with_excludes(root, EXCLUDED_DIRS)
}

/// Gathers all snapshot files under the root with custom excluded
/// directory names.
pub fn gather_snapshot_files_with_excludes(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let exclude_set: HashSet<&str> = excludes.iter().copied().collect();

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &exclude_set))
        .filter_map(|e| e.ok())
        .par_bridge()
        .filter(|e| {
            e.file_type().is_file()
                && e.file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(SNAPSHOT_SUFFIX))
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Whether a path names a single snapshot file rather than a tree to scan.
pub fn is_snapshot_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(SNAPSHOT_SUFFIX) || name.ends_with(".json"))
}
