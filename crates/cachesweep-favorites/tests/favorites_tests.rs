use cachesweep_favorites::{FavoritesDocument, FavoritesStore};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_round_trip_through_fresh_store() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("favorites.json");
    let target = temp.path().join("projects/app/.cache");

    let store = FavoritesStore::open(&file);
    store.add_favorite(&target).unwrap();

    let reopened = FavoritesStore::open(&file);
    assert!(reopened.is_favorite(&target));

    reopened.remove_favorite(&target).unwrap();

    let reopened_again = FavoritesStore::open(&file);
    assert!(!reopened_again.is_favorite(&target));
    assert!(reopened_again.is_empty());
}

#[cfg(unix)]
#[test]
fn test_persisted_document_shape() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("favorites.json");

    let store = FavoritesStore::open(&file);
    store.add_favorite("/z/cache").unwrap();
    store.add_favorite("/a/cache").unwrap();

    let doc: FavoritesDocument = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(doc.favorites, vec!["/a/cache".to_string(), "/z/cache".to_string()]);
}

#[test]
fn test_missing_file_loads_empty() {
    let temp = TempDir::new().unwrap();
    let store = FavoritesStore::open(temp.path().join("absent/favorites.json"));

    assert!(store.is_empty());
    assert!(store.load().is_empty());
}

#[test]
fn test_corrupt_files_load_empty() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("favorites.json");

    for content in [
        "not json at all",
        "",
        "[1, 2, 3]",
        r#"{"favorites": "nope"}"#,
        r#"{"favorites": [1, 2]}"#,
        "{\"favorites\": [\"/a\"",
    ] {
        fs::write(&file, content).unwrap();
        let store = FavoritesStore::open(&file);
        assert!(store.is_empty(), "content {content:?} should load as empty");
    }
}

#[test]
fn test_load_discards_unsaved_view_of_disk() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("favorites.json");

    let store = FavoritesStore::open(&file);
    store.add_favorite("/kept").unwrap();

    // Another process rewrites the document.
    fs::write(&file, r#"{"favorites": ["/external"]}"#).unwrap();

    let loaded = store.load();
    assert!(loaded.contains("/external"));
    assert!(!store.is_favorite("/kept"));
}

#[test]
fn test_save_creates_missing_parents() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("deep/er/favorites.json");

    let store = FavoritesStore::open(&file);
    store.save().unwrap();

    assert!(file.exists());
    assert!(FavoritesStore::open(&file).is_empty());
}

#[test]
fn test_concurrent_mutations_are_all_persisted() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("favorites.json");
    let store = Arc::new(FavoritesStore::open(&file));

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store.add_favorite(format!("/t{t}/cache{i}")).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(store.len(), 200);
    assert_eq!(FavoritesStore::open(&file).list(), store.list());
}

#[cfg(windows)]
#[test]
fn test_separator_styles_are_equivalent() {
    let temp = TempDir::new().unwrap();
    let store = FavoritesStore::open(temp.path().join("favorites.json"));

    store.add_favorite("C:/Users/me/AppData/Local/cache").unwrap();
    assert!(store.is_favorite("C:\\Users\\me\\AppData\\Local\\cache"));

    assert!(!store.add_favorite("C:\\Users\\me\\AppData\\Local\\cache").unwrap());
    assert!(store.remove_favorite("C:/Users/me/AppData/Local/cache").unwrap());
}

#[cfg(unix)]
#[test]
fn test_equivalent_spelling_matches_native_form() {
    let temp = TempDir::new().unwrap();
    let store = FavoritesStore::open(temp.path().join("favorites.json"));

    store.add_favorite(std::path::PathBuf::from("/home/user/.cache")).unwrap();
    assert!(store.is_favorite("/home/user/.cache"));
}
