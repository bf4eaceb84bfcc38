//! Cache folder scanning engine for cachesweep.
//!
//! # Overview
//!
//! `cachesweep-scan` walks a directory tree looking for folders whose name
//! contains "cache" (ignoring case), measures each one and reports it if it
//! is at least as large as the configured threshold. Key properties:
//!
//! - **Matches are leaves**: a matched folder is never descended into
//! - **Sequential walk** over an explicit stack of pending directories
//! - **Cooperative cancellation** via [`CancellationToken`]
//! - **Skip, never fail**: unreadable entries are recorded and ignored
//!
//! # Example
//!
//! ```rust,no_run
//! use cachesweep_scan::{ScanConfig, ScanEvent, start_scan};
//!
//! let config = ScanConfig::new("/home/user").with_min_size(50 * 1024 * 1024);
//! let mut handle = start_scan(config).unwrap();
//!
//! while let Some(event) = handle.blocking_recv() {
//!     match event {
//!         ScanEvent::Progress(_) => {}
//!         ScanEvent::Found(info) => println!("{} {}", info.path.display(), info.size_bytes),
//!         ScanEvent::Finished(summary) => println!("{} folders", summary.found),
//!     }
//! }
//! ```

mod handle;
mod scanner;
mod size;

pub use handle::{SCAN_CHANNEL_SIZE, ScanHandle, start_scan};
pub use scanner::CacheScanner;
pub use size::directory_size;

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use cachesweep_core::{
    CacheFolderInfo, ScanConfig, ScanError, ScanEvent, ScanSummary, SkipKind, SkippedEntry,
    is_cache_folder_name,
};
