//! Persisted display preferences.
//!
//! This module provides the [`PreferenceStore`] and [`StorageBackend`]
//! infrastructure behind the site's theme and font toggles: a string-keyed
//! key/value store that survives page reloads.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     PreferenceStore                           │
//! │   - In-memory cache of preference values                      │
//! │   - Delegates to StorageBackend for persistence               │
//! │   - Provides load/flush/clear operations                      │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires persistence)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: Storage failures never panic; operations return `Result`.
//! 2. **Atomic writes**: File storage uses write-rename pattern to prevent corruption.
//! 3. **Partial load tolerance**: Entries that are not strings are skipped.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, cache unaffected |
//! | `StorageError::Serialization` | JSON encode/decode | Returns error, cache unaffected |
//! | `StorageError::Corruption` | Lock poisoned | Returns error |
//! | Missing key | First visit | Caller's default is used |

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during preference storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Storage is corrupted or a lock was poisoned.
    #[error("storage corruption: {0}")]
    Corruption(String),
    /// Backend is not available.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable preference storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`) so a store can be
/// shared between the model and the runner.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load all stored values.
    ///
    /// Returns an empty map if nothing was stored yet.
    fn load_all(&self) -> StorageResult<HashMap<String, String>>;

    /// Save all values, replacing whatever was stored.
    fn save_all(&self, entries: &HashMap<String, String>) -> StorageResult<()>;

    /// Clear all stored values.
    fn clear(&self) -> StorageResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_all(&self) -> StorageResult<HashMap<String, String>> {
        (**self).load_all()
    }

    fn save_all(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        (**self).save_all(entries)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for tests and ephemeral sessions.
///
/// Wrap it in an `Arc` and hand clones to successive stores to simulate a
/// page reload.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with values.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load_all(&self) -> StorageResult<HashMap<String, String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        *guard = entries.clone();
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File format for stored preferences (JSON).
    #[derive(Serialize, Deserialize)]
    struct PreferenceFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Map of key -> value. Non-string values are skipped on load.
        entries: HashMap<String, serde_json::Value>,
    }

    impl PreferenceFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// File-based storage backend using JSON.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "theme": "dark",
    ///     "fontSize": "18",
    ///     "fontStyle": "mono"
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// Writes use a temporary file + rename pattern to prevent corruption:
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// The backing file path.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load_all(&self) -> StorageResult<HashMap<String, String>> {
            if !self.path.exists() {
                // First visit - nothing stored yet
                return Ok(HashMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);

            let stored: PreferenceFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse preference file: {e}"))
            })?;

            if stored.format_version != PreferenceFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = stored.format_version,
                    expected = PreferenceFile::FORMAT_VERSION,
                    "preference file format version mismatch, ignoring stored values"
                );
                return Ok(HashMap::new());
            }

            let mut result = HashMap::new();
            for (key, value) in stored.entries {
                match value {
                    serde_json::Value::String(s) => {
                        result.insert(key, s);
                    }
                    other => {
                        tracing::warn!(key = %key, value = %other, "non-string preference, skipping");
                    }
                }
            }
            Ok(result)
        }

        fn save_all(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let stored = PreferenceFile {
                format_version: PreferenceFile::FORMAT_VERSION,
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            };

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &stored).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize preferences: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = entries.len(),
                "saved preferences"
            );

            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }

        fn is_available(&self) -> bool {
            match self.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    parent.exists() || fs::create_dir_all(parent).is_ok()
                }
                _ => true,
            }
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "persistence")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Preference Store
// ─────────────────────────────────────────────────────────────────────────────

/// Key/value store for display preferences.
///
/// Maintains an in-memory cache and delegates to a [`StorageBackend`].
/// Writes mark the store dirty; [`flush`](Self::flush) persists them.
///
/// # Example
///
/// ```ignore
/// use portal_runtime::preference_store::PreferenceStore;
///
/// let store = PreferenceStore::in_memory();
/// store.set("theme", "dark");
/// store.flush()?;
/// assert_eq!(store.get("theme").as_deref(), Some("dark"));
/// ```
pub struct PreferenceStore {
    backend: Box<dyn StorageBackend>,
    cache: RwLock<HashMap<String, String>>,
    dirty: RwLock<bool>,
}

impl PreferenceStore {
    /// Create a new store with the given storage backend.
    ///
    /// Does not automatically load from storage; call [`load`](Self::load) first.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(HashMap::new()),
            dirty: RwLock::new(false),
        }
    }

    /// Create a store with memory storage (ephemeral, for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Create a store with file storage at the given path.
    #[cfg(feature = "persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    /// Load all values from the storage backend.
    ///
    /// Replaces the in-memory cache. Returns the number of values loaded.
    pub fn load(&self) -> StorageResult<usize> {
        let entries = self.backend.load_all()?;
        let count = entries.len();

        let mut cache = self
            .cache
            .write()
            .map_err(|_| StorageError::Corruption("cache lock poisoned".into()))?;
        *cache = entries;

        let mut dirty = self
            .dirty
            .write()
            .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))?;
        *dirty = false;

        tracing::debug!(backend = %self.backend.name(), count, "loaded preferences");
        Ok(count)
    }

    /// Flush pending changes to the storage backend.
    ///
    /// Returns `Ok(true)` if data was written, `Ok(false)` if nothing changed.
    pub fn flush(&self) -> StorageResult<bool> {
        let dirty = {
            let guard = self
                .dirty
                .read()
                .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))?;
            *guard
        };

        if !dirty {
            return Ok(false);
        }

        let cache = self
            .cache
            .read()
            .map_err(|_| StorageError::Corruption("cache lock poisoned".into()))?;

        self.backend.save_all(&cache)?;

        let mut dirty_guard = self
            .dirty
            .write()
            .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))?;
        *dirty_guard = false;

        Ok(true)
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let cache = self.cache.read().ok()?;
        cache.get(key).cloned()
    }

    /// Set a value.
    ///
    /// Marks the store dirty only if the value changed.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Ok(mut cache) = self.cache.write() {
            if cache.get(&key) == Some(&value) {
                return;
            }
            cache.insert(key, value);
            if let Ok(mut dirty) = self.dirty.write() {
                *dirty = true;
            }
        }
    }

    /// Remove a value, returning it if it existed.
    pub fn remove(&self, key: &str) -> Option<String> {
        let result = self.cache.write().ok()?.remove(key);
        if result.is_some()
            && let Ok(mut dirty) = self.dirty.write()
        {
            *dirty = true;
        }
        result
    }

    /// Clear all values from both cache and storage.
    pub fn clear(&self) -> StorageResult<()> {
        self.backend.clear()?;
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
        if let Ok(mut dirty) = self.dirty.write() {
            *dirty = false;
        }
        Ok(())
    }

    /// Number of cached values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.read().map(|d| *d).unwrap_or(false)
    }

    /// Backend name for logging.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the storage backend is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// All cached keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.cache
            .read()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Wrap in `Arc` for shared ownership.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("backend", &self.backend.name())
            .field("entries", &self.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics
// ─────────────────────────────────────────────────────────────────────────────

/// Statistics about the preference store.
#[derive(Clone, Debug, Default)]
pub struct StoreStats {
    /// Number of cached values.
    pub entry_count: usize,
    /// Total bytes of keys and values.
    pub total_bytes: usize,
    /// Whether there are unsaved changes.
    pub dirty: bool,
    /// Backend name.
    pub backend: String,
}

impl PreferenceStore {
    /// Get statistics about the store.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let (entry_count, total_bytes) = self
            .cache
            .read()
            .map(|c| {
                let bytes: usize = c.iter().map(|(k, v)| k.len() + v.len()).sum();
                (c.len(), bytes)
            })
            .unwrap_or((0, 0));

        StoreStats {
            entry_count,
            total_bytes,
            dirty: self.is_dirty(),
            backend: self.backend.name().to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────


#[cfg(all(test, feature = "persistence"))]
mod file_storage_tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        let storage = FileStorage::new(&path);

        let mut entries = HashMap::new();
        entries.insert("theme".to_string(), "dark".to_string());
        storage.save_all(&entries).unwrap();
        assert!(path.exists());

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn file_storage_load_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("missing.json"));
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn file_storage_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dirs").join("prefs.json");
        let storage = FileStorage::new(&path);
        storage.save_all(&HashMap::new()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_storage_skips_non_string_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"format_version":1,"entries":{{"fontSize":18,"theme":"dark"}}}}"#
        )
        .unwrap();

        let loaded = FileStorage::new(&path).load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["theme"], "dark");
    }

    #[test]
    fn file_storage_ignores_future_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        std::fs::write(&path, r#"{"format_version":9,"entries":{"theme":"dark"}}"#).unwrap();
        assert!(FileStorage::new(&path).load_all().unwrap().is_empty());
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FileStorage::new(&path).load_all().unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn store_with_file_survives_restart() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");

        let store = PreferenceStore::with_file(&path);
        store.set("fontStyle", "readable");
        assert!(store.flush().unwrap());

        let restarted = PreferenceStore::with_file(&path);
        restarted.load().unwrap();
        assert_eq!(restarted.get("fontStyle").as_deref(), Some("readable"));
    }

    #[test]
    fn file_storage_clear() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        std::fs::write(&path, "{}").unwrap();
        FileStorage::new(&path).clear().unwrap();
        assert!(!path.exists());
    }
}
