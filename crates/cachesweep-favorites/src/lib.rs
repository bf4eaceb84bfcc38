//! Persistent favorite paths for cachesweep.
//!
//! A [`FavoritesStore`] keeps a set of user-designated paths in memory and
//! mirrors every change to a small JSON document before returning. Paths are
//! normalized to the platform's native separator form so that equivalent
//! spellings compare equal.
//!
//! ```rust,no_run
//! use cachesweep_favorites::FavoritesStore;
//!
//! let store = FavoritesStore::open_default().unwrap();
//! store.add_favorite("/home/user/.cache/keep-me").unwrap();
//! assert!(store.is_favorite("/home/user/.cache/keep-me"));
//! ```

mod document;
mod error;
mod path;
mod store;

pub use document::{FAVORITES_FILE_NAME, FavoritesDocument, default_favorites_path};
pub use error::FavoritesError;
pub use path::normalize_path;
pub use store::{ChangeKind, FavoritesChanged, FavoritesStore};
