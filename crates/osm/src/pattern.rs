//! Expanding wildcard file patterns.

use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;

/// List regular files matching `pattern`, sorted.
///
/// Wildcards may appear in any path segment, e.g. `data/*/tiles_*.json`.
/// Backslash separators are accepted and treated as `/`.
pub fn files_matching(pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.replace('\\', "/");

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path {}: {}", e.path().display(), e.error());
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    Ok(files)
}
