//! Log file retention management
//!
//! Keeps each context folder under a file-count cap. Entries are ordered by
//! file name, which for timestamp-named logs is oldest first.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// When entries selected for retention are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionMode {
    /// Remove while the instance is initialized
    #[default]
    Immediate,
    /// Queue for removal at registry shutdown
    Deferred,
}

/// Outcome of the retention check run at initialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Entries in the folder before the check
    pub existing: usize,
    /// Entries chosen for removal, oldest first
    pub selected: Vec<PathBuf>,
    /// Entries actually removed (always 0 in deferred mode)
    pub removed: usize,
}

/// Choose the entries to drop so a new file fits under `max_files`
///
/// Returns the `count - max_files + 1` entries with the smallest names when
/// the folder holds `max_files` or more entries, otherwise nothing.
pub fn select_for_retention(folder: &Path, max_files: usize) -> Result<Vec<PathBuf>, LogError> {
    let to_error = |source| LogError::ListFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(folder)
        .map_err(to_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_error)?;

    if entries.len() < max_files {
        return Ok(Vec::new());
    }

    let excess = (entries.len() - max_files + 1).min(entries.len());
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    entries.truncate(excess);
    Ok(entries)
}

/// Remove the given entries, returning how many were removed
///
/// Files are unlinked; directories are removed only if empty. Failures are
/// logged and skipped.
pub fn remove_entries(paths: &[PathBuf]) -> usize {
    let mut removed = 0;

    for path in paths {
        let result = if path.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove old log entry");
            }
        }
    }

    removed
}

/// Entries queued by deferred retention
#[derive(Debug, Default)]
pub struct PendingDeletions {
    paths: Mutex<Vec<PathBuf>>,
}

impl PendingDeletions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue entries, ignoring ones already queued
    pub fn schedule(&self, paths: impl IntoIterator<Item = PathBuf>) {
        let mut pending = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        for path in paths {
            if !pending.contains(&path) {
                pending.push(path);
            }
        }
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.paths
            .lock()
            .map(|p| p.len())
            .unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every queued entry and empty the queue
    ///
    /// Returns the number of entries removed.
    pub fn run(&self) -> usize {
        let paths = std::mem::take(&mut *self.paths.lock().unwrap_or_else(PoisonError::into_inner));
        if paths.is_empty() {
            return 0;
        }

        let removed = remove_entries(&paths);
        tracing::debug!(queued = paths.len(), removed, "Ran deferred log retention");
        removed
    }
}
