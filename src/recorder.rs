//! Snapshot recorder.
//!
//! Walks each target top-down, sizes every directory on the target's
//! filesystem, and appends a row only where the size differs from the last
//! recorded one. All rows of one run share a timestamp.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::Result;
use crate::platform::{self, is_under_any, MountTable};
use crate::scan;
use crate::store::Store;
use crate::util;

/// A directory whose size differed from its last snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub path: String,
    /// None when the path had never been recorded
    pub previous: Option<u64>,
    pub size: u64,
}

impl Change {
    pub fn delta(&self) -> i64 {
        let new = i64::try_from(self.size).unwrap_or(i64::MAX);
        let old = i64::try_from(self.previous.unwrap_or(0)).unwrap_or(i64::MAX);
        new.saturating_sub(old)
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResult {
    pub timestamp: i64,
    pub changes: Vec<Change>,
    pub unchanged: u64,
    pub directories: u64,
    /// entries inside sized trees that could not be read
    pub unreadable: u64,
    pub diagnostics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_bytes: Option<usize>,
}

impl RecordResult {
    fn empty(timestamp: i64) -> Self {
        RecordResult {
            timestamp,
            changes: Vec::new(),
            unchanged: 0,
            directories: 0,
            unreadable: 0,
            diagnostics: Vec::new(),
            duration_ms: None,
            peak_memory_bytes: None,
        }
    }
}

pub struct Recorder<'a> {
    store: &'a Store,
    mounts: MountTable,
}

impl<'a> Recorder<'a> {
    pub fn new(store: &'a Store, mounts: MountTable) -> Self {
        Recorder { store, mounts }
    }

    pub fn run(&self, targets: &[PathBuf]) -> Result<RecordResult> {
        self.run_at(targets, util::now_timestamp())
    }

    /// Records every target with `timestamp` on all written rows.
    pub fn run_at(&self, targets: &[PathBuf], timestamp: i64) -> Result<RecordResult> {
        let start = Instant::now();
        let mut result = RecordResult::empty(timestamp);
        let excluded_mounts = self.mounts.excluded_prefixes();

        for target in targets {
            let root = match target.canonicalize() {
                Ok(root) => root,
                Err(e) => {
                    result.diagnostics.push(format!("skipping {}: {e}", target.display()));
                    continue;
                }
            };

            if !root.is_dir() {
                result
                    .diagnostics
                    .push(format!("skipping {}: not a directory", root.display()));
                continue;
            }

            if is_under_any(&root, &excluded_mounts) {
                result
                    .diagnostics
                    .push(format!("skipping {}: inside an excluded mount", root.display()));
                continue;
            }

            let device_id = match platform::device_id(&root) {
                Ok(dev) => dev,
                Err(e) => {
                    result.diagnostics.push(format!("skipping {}: {e}", root.display()));
                    continue;
                }
            };

            let mut excluded = excluded_mounts.clone();
            excluded.extend(self.mounts.nested_mounts(&root));

            self.record_tree(&root, device_id, &excluded, &mut result)?;
        }

        result.duration_ms = Some(start.elapsed().as_millis());
        result.peak_memory_bytes = memory_stats::memory_stats().map(|m| m.physical_mem);

        info!(
            changed = result.changes.len(),
            unchanged = result.unchanged,
            directories = result.directories,
            "recorder run finished"
        );

        Ok(result)
    }

    fn record_tree(
        &self,
        root: &Path,
        device_id: u64,
        excluded: &HashSet<PathBuf>,
        result: &mut RecordResult,
    ) -> Result<()> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .same_file_system(true)
            .into_iter()
            .filter_entry(|e| e.file_type().is_dir() && !excluded.contains(e.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable directory");
                    result.unreadable += 1;
                    continue;
                }
            };

            self.record_directory(entry.path(), device_id, excluded, result)?;
        }

        Ok(())
    }

    fn record_directory(
        &self,
        dir: &Path,
        device_id: u64,
        excluded: &HashSet<PathBuf>,
        result: &mut RecordResult,
    ) -> Result<()> {
        let tree = scan::scan_tree(dir, device_id, excluded);
        result.directories += 1;
        result.unreadable += tree.unreadable;

        let key = dir.to_string_lossy();
        let previous = self.store.last_size(&key)?;

        if previous == Some(tree.bytes) {
            result.unchanged += 1;
            return Ok(());
        }

        self.store.append(&key, tree.bytes, result.timestamp)?;
        debug!(path = %key, size = tree.bytes, ?previous, "size changed");

        result.changes.push(Change {
            path: key.into_owned(),
            previous,
            size: tree.bytes,
        });

        Ok(())
    }
}
