//! Recursive folder removal with per-path outcomes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{OPERATION_CHANNEL_SIZE, OperationError};

/// How removals are carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalOptions {
    /// Move to the OS trash instead of deleting permanently.
    pub use_trash: bool,
}

impl RemovalOptions {
    /// Options that send removed folders to the trash.
    pub fn with_trash() -> Self {
        Self { use_trash: true }
    }
}

/// Result of removing one path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalOutcome {
    /// The path that was targeted.
    pub path: PathBuf,
    /// Size the caller attributed to it.
    pub size_bytes: u64,
    /// Whether the path is gone.
    pub success: bool,
    /// Why it is not gone, on failure.
    pub error: Option<OperationError>,
}

/// Progress of a background batch.
#[derive(Debug, Clone, Default)]
pub struct RemovalProgress {
    /// Number of paths in the batch.
    pub total: usize,
    /// Paths removed so far.
    pub removed: usize,
    /// Paths that failed so far.
    pub failed: usize,
    /// Bytes attributed to removed paths.
    pub bytes_freed: u64,
    /// Path about to be processed.
    pub current: Option<PathBuf>,
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalSummary {
    pub removed: usize,
    pub failed: usize,
    pub bytes_freed: u64,
}

impl RemovalSummary {
    fn record(&mut self, outcome: &RemovalOutcome) {
        if outcome.success {
            self.removed += 1;
            self.bytes_freed = self.bytes_freed.saturating_add(outcome.size_bytes);
        } else {
            self.failed += 1;
        }
    }

    /// Check if every removal succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        let freed = humansize::format_size(self.bytes_freed, humansize::BINARY);
        if self.failed == 0 {
            format!("Removed {} folders, freed {}", self.removed, freed)
        } else {
            format!(
                "Removed {}, failed {} (freed {})",
                self.removed, self.failed, freed
            )
        }
    }
}

/// Events sent while a background batch runs.
#[derive(Debug, Clone)]
pub enum RemovalEvent {
    /// Progress update before each path.
    Progress(RemovalProgress),
    /// One path has been processed.
    Removed(RemovalOutcome),
    /// The batch is done.
    Complete(RemovalSummary),
}

/// Permanently remove `path` and everything beneath it.
///
/// A path that no longer exists counts as removed.
pub fn remove_folder(path: &Path) -> Result<(), OperationError> {
    remove_folder_with(path, RemovalOptions::default())
}

/// Remove `path` according to `options`.
pub fn remove_folder_with(path: &Path, options: RemovalOptions) -> Result<(), OperationError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "already gone");
            return Ok(());
        }
        Err(err) => return Err(OperationError::new(path, err.to_string())),
    };

    let result = if options.use_trash {
        trash::delete(path).map_err(|e| OperationError::new(path, e.to_string()))
    } else if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| OperationError::new(path, e.to_string()))
    } else {
        fs::remove_file(path).map_err(|e| OperationError::new(path, e.to_string()))
    };

    match &result {
        Ok(()) => tracing::info!(path = %path.display(), trash = options.use_trash, "removed"),
        Err(err) => tracing::warn!(path = %path.display(), error = %err.message, "removal failed"),
    }

    result
}

fn remove_one(path: PathBuf, size_bytes: u64, options: RemovalOptions) -> RemovalOutcome {
    match remove_folder_with(&path, options) {
        Ok(()) => RemovalOutcome {
            path,
            size_bytes,
            success: true,
            error: None,
        },
        Err(err) => RemovalOutcome {
            path,
            size_bytes,
            success: false,
            error: Some(err),
        },
    }
}

/// Remove each `(path, size)` in turn on the current thread.
pub fn remove_folders(
    items: Vec<(PathBuf, u64)>,
    options: RemovalOptions,
) -> (Vec<RemovalOutcome>, RemovalSummary) {
    let mut summary = RemovalSummary::default();
    let outcomes = items
        .into_iter()
        .map(|(path, size)| {
            let outcome = remove_one(path, size, options);
            summary.record(&outcome);
            outcome
        })
        .collect();

    (outcomes, summary)
}

/// Start background removal of folders.
///
/// Takes a list of (path, size) tuples and returns a receiver for progress
/// updates. Must be called from within a tokio runtime.
pub fn start_removal(
    items: Vec<(PathBuf, u64)>,
    options: RemovalOptions,
) -> mpsc::Receiver<RemovalEvent> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
    let total = items.len();

    tokio::spawn(async move {
        let mut summary = RemovalSummary::default();

        for (path, size) in items {
            let _ = tx
                .send(RemovalEvent::Progress(RemovalProgress {
                    total,
                    removed: summary.removed,
                    failed: summary.failed,
                    bytes_freed: summary.bytes_freed,
                    current: Some(path.clone()),
                }))
                .await;

            // Perform removal in blocking task to not block the async runtime
            let target = path.clone();
            let outcome = tokio::task::spawn_blocking(move || remove_one(target, size, options))
                .await
                .unwrap_or_else(|e| RemovalOutcome {
                    error: Some(OperationError::new(&path, format!("Task failed: {e}"))),
                    path,
                    size_bytes: size,
                    success: false,
                });

            summary.record(&outcome);
            let _ = tx.send(RemovalEvent::Removed(outcome)).await;
        }

        let _ = tx.send(RemovalEvent::Complete(summary)).await;
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_folder_deletes_subtree() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("cache");
        fs::create_dir_all(target.join("a/b")).unwrap();
        fs::write(target.join("a/b/f"), "data").unwrap();

        remove_folder(&target).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_missing_path_counts_as_removed() {
        let temp = TempDir::new().unwrap();
        assert!(remove_folder(&temp.path().join("gone")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_removes_link_not_target() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("keep"), "x").unwrap();

        let temp = TempDir::new().unwrap();
        let link = temp.path().join("linkcache");
        std::os::unix::fs::symlink(target.path(), &link).unwrap();

        remove_folder(&link).unwrap();
        assert!(!link.exists());
        assert!(target.path().join("keep").exists());
    }

    #[test]
    fn test_summary_text() {
        let ok = RemovalSummary {
            removed: 2,
            failed: 0,
            bytes_freed: 2048,
        };
        assert!(ok.is_success());
        assert_eq!(ok.summary(), "Removed 2 folders, freed 2 KiB");

        let partial = RemovalSummary {
            removed: 1,
            failed: 1,
            bytes_freed: 0,
        };
        assert!(!partial.is_success());
        assert!(partial.summary().contains("failed 1"));
    }
}
