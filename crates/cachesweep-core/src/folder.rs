//! Matched cache folders and name classification.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Substring that marks a directory name as cache storage.
pub const CACHE_MARKER: &str = "cache";

/// Returns `true` if a directory name contains [`CACHE_MARKER`], ignoring case.
///
/// Names that are not valid UTF-8 are converted lossily first, so a
/// `cache` run surrounded by invalid bytes still matches.
pub fn is_cache_folder_name(name: &OsStr) -> bool {
    name.to_string_lossy().to_lowercase().contains(CACHE_MARKER)
}

/// A directory whose name matched, with the total size of its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheFolderInfo {
    /// Absolute path of the folder.
    pub path: PathBuf,
    /// Sum of the sizes of every regular file beneath it.
    pub size_bytes: u64,
}

impl CacheFolderInfo {
    /// Create a new matched folder record.
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    /// Final component of the path.
    pub fn name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// Borrow the path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_matches_anywhere_in_name() {
        assert!(is_cache_folder_name(OsStr::new("cache")));
        assert!(is_cache_folder_name(OsStr::new("MyCache")));
        assert!(is_cache_folder_name(OsStr::new(".CACHE")));
        assert!(is_cache_folder_name(OsStr::new("webcache-v2")));
        assert!(is_cache_folder_name(OsStr::new("ShaderCacheData")));
    }

    #[test]
    fn test_marker_rejects_other_names() {
        assert!(!is_cache_folder_name(OsStr::new("NormalDir")));
        assert!(!is_cache_folder_name(OsStr::new("cach")));
        assert!(!is_cache_folder_name(OsStr::new("ca-che")));
        assert!(!is_cache_folder_name(OsStr::new("")));
    }

    #[test]
    fn test_folder_name() {
        let info = CacheFolderInfo::new("/home/user/.cache", 10);
        assert_eq!(info.name(), Some(OsStr::new(".cache")));
        assert_eq!(info.path(), Path::new("/home/user/.cache"));
    }
}
