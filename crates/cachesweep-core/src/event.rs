//! Events emitted by a running scan.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CacheFolderInfo, SkippedEntry};

/// One item in the event sequence of a scan.
///
/// Every scan produces zero or more `Progress` and `Found` events followed
/// by exactly one `Finished`. Nothing is emitted after `Finished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ScanEvent {
    /// The walker reached this directory entry.
    Progress(PathBuf),
    /// A cache folder at or above the size threshold.
    Found(CacheFolderInfo),
    /// The scan is over, either completed or cancelled.
    Finished(ScanSummary),
}

impl ScanEvent {
    /// Whether this is the terminal event.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// The matched folder, for `Found` events.
    pub fn as_found(&self) -> Option<&CacheFolderInfo> {
        match self {
            Self::Found(info) => Some(info),
            _ => None,
        }
    }
}

/// Totals attached to the `Finished` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of `Found` events emitted.
    pub found: u64,
    /// Sum of the sizes of all reported folders.
    pub bytes_found: u64,
    /// Number of directory entries visited.
    pub entries_visited: u64,
    /// Entries the walker could not read.
    pub skipped: Vec<SkippedEntry>,
    /// Whether the scan stopped because it was cancelled.
    pub cancelled: bool,
    /// Wall-clock time from start to finish.
    pub duration: Duration,
}

impl ScanSummary {
    /// Record a reported folder.
    pub fn record_found(&mut self, info: &CacheFolderInfo) {
        self.found += 1;
        self.bytes_found = self.bytes_found.saturating_add(info.size_bytes);
    }

    /// Record a skipped entry.
    pub fn record_skip(&mut self, entry: SkippedEntry) {
        self.skipped.push(entry);
    }
}
