//! Single-filesystem directory sizing.
//!
//! Sums the apparent size of every regular file below a root, never crossing
//! onto another device and never entering an excluded mount. Unreadable
//! directories and entries that vanish mid-scan count as zero.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform::{is_under_any, metadata_device};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSize {
    pub bytes: u64,
    pub directories: u64,
    /// directories or entries that could not be read
    pub unreadable: u64,
    /// entries skipped for living on another device
    pub foreign: u64,
}

/// Total bytes of regular files under `root` on device `device_id`.
pub fn compute_size(root: &Path, device_id: u64, excluded: &HashSet<PathBuf>) -> u64 {
    scan_tree(root, device_id, excluded).bytes
}

/// Like [`compute_size`], with traversal counters.
pub fn scan_tree(root: &Path, device_id: u64, excluded: &HashSet<PathBuf>) -> TreeSize {
    let mut result = TreeSize::default();

    if is_under_any(root, excluded) {
        return result;
    }

    // explicit stack keeps deep trees off the call stack
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let read_dir = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
                result.unreadable += 1;
                continue;
            }
        };
        result.directories += 1;

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => {
                    result.unreadable += 1;
                    continue;
                }
            };

            let path = entry.path();
            if excluded.contains(&path) {
                continue;
            }

            // DirEntry::metadata does not follow symlinks
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(_) => {
                    result.unreadable += 1;
                    continue;
                }
            };

            if metadata_device(&meta) != device_id {
                result.foreign += 1;
                continue;
            }

            let file_type = meta.file_type();
            if file_type.is_file() {
                result.bytes = result.bytes.saturating_add(meta.len());
            } else if file_type.is_dir() {
                pending.push(path);
            }
        }
    }

    result
}
