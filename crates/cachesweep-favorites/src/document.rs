//! On-disk favorites document.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::FavoritesError;
use crate::path::normalize_path;

/// File name of the persisted document.
pub const FAVORITES_FILE_NAME: &str = "favorites.json";

const APP_DIR: &str = "cachesweep";

/// Serialized form: `{"favorites": [path, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl FavoritesDocument {
    /// Build a document from a set, in sorted order.
    pub fn from_set(set: &BTreeSet<String>) -> Self {
        Self {
            favorites: set.iter().cloned().collect(),
        }
    }

    /// Normalized set of the paths in this document.
    pub fn into_set(self) -> BTreeSet<String> {
        self.favorites.iter().map(|p| normalize_path(p)).collect()
    }
}

/// Default document location inside the per-user application data directory.
pub fn default_favorites_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR).join(FAVORITES_FILE_NAME))
}

/// Read the document at `path`. Missing or malformed files yield an empty set.
pub(crate) fn read_set(path: &Path) -> BTreeSet<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no favorites file yet");
            return BTreeSet::new();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot read favorites file");
            return BTreeSet::new();
        }
    };

    match serde_json::from_str::<FavoritesDocument>(&content) {
        Ok(doc) => doc.into_set(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring malformed favorites file");
            BTreeSet::new()
        }
    }
}

/// Write `set` to `path`, creating parent directories as needed.
///
/// The document is written to a sibling temporary file and renamed into
/// place, so readers never see a truncated file.
pub(crate) fn write_set(path: &Path, set: &BTreeSet<String>) -> Result<(), FavoritesError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| FavoritesError::write(parent, e))?;
        }
    }

    let content = serde_json::to_string_pretty(&FavoritesDocument::from_set(set))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content).map_err(|e| FavoritesError::write(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FavoritesError::write(path, e)
    })?;

    tracing::debug!(path = %path.display(), count = set.len(), "favorites saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_shape() {
        let set: BTreeSet<String> = ["/b".to_string(), "/a".to_string()].into_iter().collect();
        let json = serde_json::to_value(FavoritesDocument::from_set(&set)).unwrap();

        assert_eq!(json, serde_json::json!({ "favorites": ["/a", "/b"] }));
    }

    #[test]
    fn test_missing_key_is_empty() {
        let doc: FavoritesDocument = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(doc.favorites.is_empty());
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(read_set(&temp.path().join("none.json")).is_empty());
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/favorites.json");
        let set: BTreeSet<String> = ["/x".to_string()].into_iter().collect();

        write_set(&path, &set).unwrap();

        assert_eq!(read_set(&path), set);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = default_favorites_path() {
            assert!(path.ends_with("cachesweep/favorites.json"));
        }
    }
}
