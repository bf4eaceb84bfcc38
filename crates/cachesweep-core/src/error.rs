//! Error types for scanning operations.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading a directory during a scan.
///
/// None of these terminate a scan. The walker converts them into
/// [`SkippedEntry`] records and moves on.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found (usually removed while the scan was running).
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> SkipKind {
        match self {
            Self::PermissionDenied { .. } => SkipKind::PermissionDenied,
            Self::NotFound { .. } => SkipKind::NotFound,
            Self::Io { .. } => SkipKind::Io,
            Self::Other { .. } => SkipKind::Other,
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied { path } | Self::NotFound { path } | Self::Io { path, .. } => {
                Some(path)
            }
            Self::Other { .. } => None,
        }
    }
}

/// Why an entry was left out of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// Permission was denied.
    PermissionDenied,
    /// The entry vanished between listing and reading.
    NotFound,
    /// Error reading the directory or its metadata.
    Io,
    /// Anything else.
    Other,
}

impl SkipKind {
    /// Classify an I/O error.
    pub fn classify(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::Other => Self::Other,
            _ => Self::Io,
        }
    }
}

impl std::fmt::Display for SkipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotFound => write!(f, "not found"),
            Self::Io => write!(f, "I/O error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// An entry the walker skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Path that could not be processed.
    pub path: PathBuf,
    /// Classification of the failure.
    pub kind: SkipKind,
    /// Human-readable message.
    pub message: String,
}

impl SkippedEntry {
    /// Create a new skipped entry record.
    pub fn new(path: impl Into<PathBuf>, kind: SkipKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Record an I/O failure at `path`.
    pub fn from_io(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        Self::new(path, SkipKind::classify(error), error.to_string())
    }
}

impl From<ScanError> for SkippedEntry {
    fn from(error: ScanError) -> Self {
        let kind = error.kind();
        let path = error.path().cloned().unwrap_or_default();
        Self::new(path, kind, error.to_string())
    }
}
