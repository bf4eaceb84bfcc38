//! Sequential cache folder walker.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use cachesweep_core::{
    CacheFolderInfo, ScanConfig, ScanError, ScanEvent, ScanSummary, SkippedEntry,
    is_cache_folder_name,
};

use crate::size::directory_size;

/// Walks a directory tree and reports folders whose name marks them as cache.
#[derive(Debug, Clone)]
pub struct CacheScanner {
    config: ScanConfig,
}

impl CacheScanner {
    /// Create a scanner for the given configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// The configuration this scanner runs with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the scan on the current thread, handing each event to `emit`.
    ///
    /// Always ends with exactly one [`ScanEvent::Finished`], including when
    /// the root is missing or the token was cancelled.
    pub fn run<F>(&self, cancel: &CancellationToken, mut emit: F)
    where
        F: FnMut(ScanEvent),
    {
        let start = Instant::now();
        let mut summary = ScanSummary::default();

        match self.resolve_root() {
            Some(root) => {
                tracing::info!(root = %root.display(), min_size = self.config.min_size_bytes, "scan started");
                self.walk(&root, cancel, &mut summary, &mut emit);
            }
            None => {
                tracing::debug!(root = %self.config.root.display(), "scan root is not a directory");
            }
        }

        summary.cancelled = cancel.is_cancelled();
        summary.duration = start.elapsed();

        tracing::info!(
            found = summary.found,
            bytes = summary.bytes_found,
            skipped = summary.skipped.len(),
            cancelled = summary.cancelled,
            "scan finished"
        );

        emit(ScanEvent::Finished(summary));
    }

    /// Run the scan and collect the matched folders.
    pub fn collect(&self, cancel: &CancellationToken) -> (Vec<CacheFolderInfo>, ScanSummary) {
        let mut found = Vec::new();
        let mut summary = ScanSummary::default();

        self.run(cancel, |event| match event {
            ScanEvent::Found(info) => found.push(info),
            ScanEvent::Finished(s) => summary = s,
            ScanEvent::Progress(_) => {}
        });

        (found, summary)
    }

    /// Absolute form of the root, or `None` if it is not an existing directory.
    ///
    /// The root is made absolute without resolving links, so reported paths
    /// keep the plain form the caller used (never a `\\?\` verbatim path).
    fn resolve_root(&self) -> Option<PathBuf> {
        let root = &self.config.root;
        if !root.is_dir() {
            return None;
        }
        match std::path::absolute(root) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::debug!(root = %root.display(), error = %err, "cannot resolve scan root");
                None
            }
        }
    }

    /// Depth-first walk over an explicit stack of pending directories.
    fn walk<F>(
        &self,
        root: &Path,
        cancel: &CancellationToken,
        summary: &mut ScanSummary,
        emit: &mut F,
    ) where
        F: FnMut(ScanEvent),
    {
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            if cancel.is_cancelled() {
                return;
            }

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    skip(summary, ScanError::io(&dir, err).into());
                    continue;
                }
            };

            // Children are pushed in reverse so they pop in listing order.
            let mut subdirs = Vec::new();

            for entry_result in entries {
                if cancel.is_cancelled() {
                    return;
                }

                let entry = match entry_result {
                    Ok(e) => e,
                    Err(err) => {
                        skip(summary, SkippedEntry::from_io(&dir, &err));
                        continue;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(t) => t,
                    Err(err) => {
                        skip(summary, SkippedEntry::from_io(&path, &err));
                        continue;
                    }
                };

                if file_type.is_symlink() || !file_type.is_dir() {
                    continue;
                }

                summary.entries_visited += 1;
                emit(ScanEvent::Progress(path.clone()));

                if is_cache_folder_name(&entry.file_name()) {
                    let size = directory_size(&path, cancel);
                    if cancel.is_cancelled() {
                        return;
                    }
                    if self.config.accepts_size(size) {
                        let info = CacheFolderInfo::new(path, size);
                        summary.record_found(&info);
                        emit(ScanEvent::Found(info));
                    }
                } else {
                    subdirs.push(path);
                }
            }

            pending.extend(subdirs.into_iter().rev());
        }
    }
}

fn skip(summary: &mut ScanSummary, entry: SkippedEntry) {
    tracing::debug!(path = %entry.path.display(), kind = %entry.kind, "skipping entry");
    summary.record_skip(entry);
}
