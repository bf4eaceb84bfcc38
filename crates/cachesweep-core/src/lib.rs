//! Core types for cachesweep.
//!
//! This crate provides the data structures shared by the scanner, the
//! favorites store and the command line front end: scan configuration,
//! the events a scan emits, matched folders and error classification.

mod config;
mod error;
mod event;
mod folder;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{ScanError, SkipKind, SkippedEntry};
pub use event::{ScanEvent, ScanSummary};
pub use folder::{CACHE_MARKER, CacheFolderInfo, is_cache_folder_name};
