//! Background scan worker and its event channel.

use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use cachesweep_core::{CacheFolderInfo, ScanConfig, ScanError, ScanEvent, ScanSummary};

use crate::scanner::CacheScanner;

/// Channel buffer size for scan events.
pub const SCAN_CHANNEL_SIZE: usize = 100;

const WORKER_NAME: &str = "cachesweep-scan";

/// A scan running on its own worker thread.
///
/// Events can be consumed from async code with [`ScanHandle::recv`] or from
/// a plain thread with [`ScanHandle::blocking_recv`]. Dropping the handle
/// cancels the scan.
#[derive(Debug)]
pub struct ScanHandle {
    events: mpsc::Receiver<ScanEvent>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Receive the next event. Returns `None` after `Finished` has been received.
    pub async fn recv(&mut self) -> Option<ScanEvent> {
        self.events.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv).
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_recv(&mut self) -> Option<ScanEvent> {
        self.events.blocking_recv()
    }

    /// Ask the worker to stop. `Finished` is still delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The token this scan polls.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Drain every remaining event, returning the matches and the final summary.
    pub fn collect_blocking(mut self) -> Result<(Vec<CacheFolderInfo>, ScanSummary), ScanError> {
        let mut found = Vec::new();
        let mut summary = None;

        while let Some(event) = self.blocking_recv() {
            match event {
                ScanEvent::Found(info) => found.push(info),
                ScanEvent::Finished(s) => summary = Some(s),
                ScanEvent::Progress(_) => {}
            }
        }

        self.join()?;

        let summary = summary.ok_or_else(|| ScanError::Other {
            message: "scan worker ended without finishing".to_string(),
        })?;
        Ok((found, summary))
    }

    /// Wait for the worker thread to exit.
    pub fn join(mut self) -> Result<(), ScanError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| ScanError::Other {
                message: "scan worker panicked".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl CacheScanner {
    /// Run this scanner on a dedicated worker thread.
    ///
    /// Events are forwarded over a bounded channel. If the receiving side
    /// goes away the worker cancels itself.
    pub fn spawn(self, cancel: CancellationToken) -> Result<ScanHandle, ScanError> {
        let (tx, rx) = mpsc::channel(SCAN_CHANNEL_SIZE);
        let worker_cancel = cancel.clone();

        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let token = worker_cancel.clone();
                self.run(&worker_cancel, |event| {
                    // Late progress from an in-flight entry is dropped once cancelled.
                    if !event.is_finished() && token.is_cancelled() {
                        return;
                    }
                    if tx.blocking_send(event).is_err() {
                        token.cancel();
                    }
                });
            })
            .map_err(|e| ScanError::Other {
                message: format!("failed to spawn scan worker: {e}"),
            })?;

        Ok(ScanHandle {
            events: rx,
            cancel,
            worker: Some(worker),
        })
    }
}

/// Start a background scan with a fresh cancellation token.
pub fn start_scan(config: ScanConfig) -> Result<ScanHandle, ScanError> {
    CacheScanner::new(config).spawn(CancellationToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_emits_only_finished() {
        let temp = TempDir::new().unwrap();
        let mut handle = start_scan(ScanConfig::new(temp.path().join("missing"))).unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.blocking_recv() {
            events.push(event);
        }

        assert_eq!(events.len(), 1);
        assert!(events[0].is_finished());
    }

    #[test]
    fn test_root_that_is_a_file_emits_only_finished() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("cache.txt");
        fs::write(&file, "x").unwrap();

        let (found, summary) = start_scan(ScanConfig::new(&file))
            .unwrap()
            .collect_blocking()
            .unwrap();

        assert!(found.is_empty());
        assert_eq!(summary.entries_visited, 0);
    }

    #[test]
    fn test_cancel_before_start_still_finishes() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cache")).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut handle = CacheScanner::new(ScanConfig::new(temp.path()))
            .spawn(cancel)
            .unwrap();

        let first = handle.blocking_recv().unwrap();
        match first {
            ScanEvent::Finished(summary) => assert!(summary.cancelled),
            other => panic!("expected Finished, got {other:?}"),
        }
        assert!(handle.blocking_recv().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_async_consumption() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/Cache")).unwrap();
        fs::write(temp.path().join("a/Cache/blob"), vec![0u8; 512]).unwrap();

        let mut handle = start_scan(ScanConfig::new(temp.path())).unwrap();

        let mut found = Vec::new();
        let mut finished = 0;
        while let Some(event) = handle.recv().await {
            match event {
                ScanEvent::Found(info) => found.push(info),
                ScanEvent::Finished(_) => finished += 1,
                ScanEvent::Progress(_) => {}
            }
        }

        assert_eq!(finished, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].size_bytes, 512);
    }
}
