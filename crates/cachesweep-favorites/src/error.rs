//! Error types for the favorites store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by [`FavoritesStore`](crate::FavoritesStore).
///
/// Loading never fails; these only come from persisting changes.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The platform has no per-user application data directory.
    #[error("No application data directory available")]
    NoDataDir,

    /// The document could not be written.
    #[error("Failed to write favorites to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The set could not be serialized.
    #[error("Failed to serialize favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl FavoritesError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
