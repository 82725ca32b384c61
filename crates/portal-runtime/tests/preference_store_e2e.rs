//! Preference persistence end-to-end tests.
//!
//! # Invariants
//!
//! 1. **Round-trip integrity**: values flushed by one store are loaded by the next
//! 2. **Graceful degradation**: corrupt files surface errors, never panics
//! 3. **Concurrent safety**: multiple threads can share one store

#![cfg(test)]

use std::sync::{Arc, Barrier};
use std::thread;

use portal_runtime::preference_store::{MemoryStorage, PreferenceStore, StorageBackend};

#[test]
fn reload_sees_flushed_values() {
    let backend = Arc::new(MemoryStorage::new());

    let session = PreferenceStore::new(Box::new(Arc::clone(&backend)));
    session.set("theme", "dark");
    session.set("fontSize", "20");
    session.set("fontStyle", "serif");
    assert!(session.flush().unwrap());

    let reloaded = PreferenceStore::new(Box::new(backend));
    assert_eq!(reloaded.load().unwrap(), 3);
    assert_eq!(reloaded.get("theme").as_deref(), Some("dark"));
    assert_eq!(reloaded.get("fontSize").as_deref(), Some("20"));
    assert_eq!(reloaded.get("fontStyle").as_deref(), Some("serif"));
}

#[test]
fn last_write_before_flush_wins() {
    let backend = Arc::new(MemoryStorage::new());
    let store = PreferenceStore::new(Box::new(Arc::clone(&backend)));
    store.set("theme", "dark");
    store.set("theme", "light");
    store.flush().unwrap();
    assert_eq!(backend.load_all().unwrap()["theme"], "light");
}

#[test]
fn concurrent_writers_do_not_lose_keys() {
    let store = PreferenceStore::in_memory().shared();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for j in 0..25 {
                    store.set(format!("k{i}-{j}"), j.to_string());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 100);
    assert!(store.flush().unwrap());
}

#[cfg(feature = "persistence")]
mod file_backed {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn corrupt_file_is_an_error_and_cache_survives() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let store = PreferenceStore::with_file(&path);
        store.set("theme", "dark");
        assert!(store.load().is_err());
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn file_contents_are_versioned_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");

        let store = PreferenceStore::with_file(&path);
        store.set("fontSize", "18");
        store.flush().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["format_version"], 1);
        assert_eq!(value["entries"]["fontSize"], "18");
    }
}
