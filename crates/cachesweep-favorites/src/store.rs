//! Thread-safe favorites service.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::FavoritesError;
use crate::document::{default_favorites_path, read_set, write_set};
use crate::path::normalize_path;

/// Buffer size for change notifications.
const CHANGE_CHANNEL_SIZE: usize = 16;

/// Kind of membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
}

/// Notification sent to subscribers after a change has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesChanged {
    /// Normalized path whose membership changed.
    pub path: String,
    /// What happened to it.
    pub change: ChangeKind,
}

/// A set of favorite paths mirrored to a JSON document.
///
/// All operations take one lock for the duration of the set access and, for
/// mutations, the write to disk. Concurrent callers therefore observe a
/// single linear order of changes, and a reader waits while a save is in
/// progress.
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    favorites: Mutex<BTreeSet<String>>,
    changes: broadcast::Sender<FavoritesChanged>,
}

impl FavoritesStore {
    /// Open the store backed by `path`, loading whatever is persisted there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let favorites = read_set(&path);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);

        tracing::debug!(path = %path.display(), count = favorites.len(), "favorites loaded");

        Self {
            path,
            favorites: Mutex::new(favorites),
            changes,
        }
    }

    /// Open the store at the default per-user location.
    pub fn open_default() -> Result<Self, FavoritesError> {
        let path = default_favorites_path().ok_or(FavoritesError::NoDataDir)?;
        Ok(Self::open(path))
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesChanged> {
        self.changes.subscribe()
    }

    /// Replace the in-memory set with the persisted document.
    ///
    /// A missing or unparseable document yields an empty set. Returns a
    /// snapshot of the loaded set.
    pub fn load(&self) -> BTreeSet<String> {
        let mut favorites = self.lock();
        *favorites = read_set(&self.path);
        favorites.clone()
    }

    /// Persist the current set.
    pub fn save(&self) -> Result<(), FavoritesError> {
        let favorites = self.lock();
        write_set(&self.path, &favorites)
    }

    /// Mark `path` as a favorite.
    ///
    /// Returns `Ok(true)` if the set changed. If persisting fails the
    /// insertion is undone and the error is returned.
    pub fn add_favorite(&self, path: impl AsRef<Path>) -> Result<bool, FavoritesError> {
        let key = key_for(path.as_ref());
        {
            let mut favorites = self.lock();
            if !favorites.insert(key.clone()) {
                return Ok(false);
            }
            if let Err(err) = write_set(&self.path, &favorites) {
                favorites.remove(&key);
                return Err(err);
            }
        }

        self.notify(key, ChangeKind::Added);
        Ok(true)
    }

    /// Remove `path` from the favorites.
    ///
    /// Returns `Ok(true)` if the set changed. If persisting fails the
    /// removal is undone and the error is returned.
    pub fn remove_favorite(&self, path: impl AsRef<Path>) -> Result<bool, FavoritesError> {
        let key = key_for(path.as_ref());
        {
            let mut favorites = self.lock();
            if !favorites.remove(&key) {
                return Ok(false);
            }
            if let Err(err) = write_set(&self.path, &favorites) {
                favorites.insert(key);
                return Err(err);
            }
        }

        self.notify(key, ChangeKind::Removed);
        Ok(true)
    }

    /// Whether `path` is a favorite.
    pub fn is_favorite(&self, path: impl AsRef<Path>) -> bool {
        let key = key_for(path.as_ref());
        self.lock().contains(&key)
    }

    /// Snapshot of the current set.
    pub fn list(&self) -> BTreeSet<String> {
        self.lock().clone()
    }

    /// Number of favorites.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether there are no favorites.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.favorites.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, path: String, change: ChangeKind) {
        tracing::debug!(path = %path, ?change, "favorites changed");
        // No subscribers is fine.
        let _ = self.changes.send(FavoritesChanged { path, change });
    }
}

fn key_for(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> FavoritesStore {
        FavoritesStore::open(temp.path().join("favorites.json"))
    }

    #[test]
    fn test_add_reports_change_once() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert!(store.add_favorite("/data/cache").unwrap());
        assert!(!store.add_favorite("/data/cache").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop_without_write() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert!(!store.remove_favorite("/nothing").unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.add_favorite("/a").unwrap();

        let mut snapshot = store.list();
        snapshot.insert("/b".to_string());
        snapshot.remove("/a");

        assert!(store.is_favorite("/a"));
        assert!(!store.is_favorite("/b"));
    }

    #[test]
    fn test_notifications_follow_changes() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let mut rx = store.subscribe();

        store.add_favorite("/a").unwrap();
        store.add_favorite("/a").unwrap();
        store.remove_favorite("/a").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            FavoritesChanged {
                path: normalize_path("/a"),
                change: ChangeKind::Added
            }
        );
        assert_eq!(rx.try_recv().unwrap().change, ChangeKind::Removed);
        assert!(rx.try_recv().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_save_rolls_back_and_reports() {
        let temp = TempDir::new().unwrap();
        // A regular file where the parent directory should be.
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = FavoritesStore::open(blocker.join("favorites.json"));
        let mut rx = store.subscribe();

        let result = store.add_favorite("/a");

        assert!(matches!(result, Err(FavoritesError::Write { .. })));
        assert!(!store.is_favorite("/a"));
        assert!(rx.try_recv().is_err());
    }
}
