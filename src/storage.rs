//! Storage layer for goaltree
//!
//! Reads and writes the goals document (a single JSON file):
//!
//! ```text
//! goals_data.json            # {"next_id": N, "goals": [ ...nested goals... ]}
//! goals_data.json.lock       # advisory lock held while a command updates goals
//! goals_data.json.corrupted  # an unreadable document, moved aside before overwriting
//! ```
//!
//! Loading never fails: a missing or unreadable document yields an empty
//! store so the user can keep working. An unreadable document is kept on
//! disk until the next save moves it aside.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::goal::GoalDocument;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::store::GoalStore;

/// Persistence adapter for one goals document
#[derive(Debug, Clone)]
pub struct Storage {
    data_file: PathBuf,
    lock_timeout_ms: u64,
}

/// Result of a lenient load.
#[derive(Debug)]
pub struct Loaded {
    pub store: GoalStore,
    /// Why an existing document could not be read, when the store started empty.
    pub unreadable: Option<String>,
}

impl Storage {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Storage for the configured data file.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_file.clone()).with_lock_timeout(config.storage.lock_timeout_ms)
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn lock_file(&self) -> PathBuf {
        lock::lock_path_for(&self.data_file)
    }

    pub fn exists(&self) -> bool {
        self.data_file.exists()
    }

    /// Take the document lock, waiting up to the configured timeout.
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.lock_file(), self.lock_timeout_ms)
    }

    /// Read and validate the document, reporting every failure.
    pub fn try_load(&self) -> Result<GoalStore> {
        let content = fs::read_to_string(&self.data_file)?;
        let document = GoalDocument::from_json(&content)?;
        GoalStore::from_document(&document)
    }

    /// Read the document, starting from an empty store when it is missing
    /// or unreadable.
    pub fn load(&self) -> Loaded {
        match self.try_load() {
            Ok(store) => {
                debug!(path = %self.data_file.display(), goals = store.len(), "goals loaded");
                Loaded {
                    store,
                    unreadable: None,
                }
            }
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.data_file.display(), "no goals file; starting empty");
                Loaded {
                    store: GoalStore::new(),
                    unreadable: None,
                }
            }
            Err(err) => {
                warn!(
                    path = %self.data_file.display(),
                    %err,
                    "unreadable goals file; starting empty"
                );
                Loaded {
                    store: GoalStore::new(),
                    unreadable: Some(err.to_string()),
                }
            }
        }
    }

    /// Move the current document to the first free `<file>.corrupted[.N]`.
    pub fn set_aside(&self) -> Result<PathBuf> {
        let base = format!("{}.corrupted", self.data_file.display());
        let mut target = PathBuf::from(&base);
        let mut n = 1;
        while target.exists() {
            target = PathBuf::from(format!("{base}.{n}"));
            n += 1;
        }
        fs::rename(&self.data_file, &target)?;
        warn!(
            from = %self.data_file.display(),
            to = %target.display(),
            "unreadable goals file moved aside"
        );
        Ok(target)
    }

    /// Write the whole forest atomically, taking the lock for the write.
    pub fn save(&self, store: &GoalStore) -> Result<()> {
        let lock = self.lock()?;
        self.save_locked(store, &lock)
    }

    /// Write the whole forest atomically while the caller holds the lock.
    pub fn save_locked(&self, store: &GoalStore, _lock: &FileLock) -> Result<()> {
        let json = store.to_document().to_json()?;
        lock::write_atomic(&self.data_file, json.as_bytes())?;
        debug!(path = %self.data_file.display(), goals = store.len(), "goals saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty_store() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("goals_data.json"));

        assert!(!storage.exists());
        let loaded = storage.load();
        assert!(loaded.store.is_empty());
        assert_eq!(loaded.store.next_id(), 1);
        assert!(loaded.unreadable.is_none());
        assert!(matches!(storage.try_load(), Err(Error::Io(_))));
    }

    #[test]
    fn malformed_file_loads_empty_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("goals_data.json");
        fs::write(&path, "{\"next_id\": 4, \"goals\": [").unwrap();

        let storage = Storage::new(&path);
        assert!(matches!(storage.try_load(), Err(Error::Json(_))));
        let loaded = storage.load();
        assert!(loaded.store.is_empty());
        assert_eq!(loaded.store.next_id(), 1);
        assert!(loaded.unreadable.is_some());
    }

    #[test]
    fn set_aside_keeps_every_unreadable_copy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("goals_data.json");
        let storage = Storage::new(&path);

        fs::write(&path, "first").unwrap();
        let first = storage.set_aside().unwrap();
        fs::write(&path, "second").unwrap();
        let second = storage.set_aside().unwrap();

        assert_eq!(first, temp.path().join("goals_data.json.corrupted"));
        assert_eq!(second, temp.path().join("goals_data.json.corrupted.1"));
        assert_eq!(fs::read_to_string(first).unwrap(), "first");
        assert_eq!(fs::read_to_string(second).unwrap(), "second");
        assert!(!storage.exists());
    }

    #[test]
    fn save_waits_for_a_held_lock() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("goals_data.json")).with_lock_timeout(50);

        let held = storage.lock().unwrap();
        assert!(matches!(
            storage.save(&GoalStore::new()),
            Err(Error::LockFailed(_))
        ));
        storage.save_locked(&GoalStore::new(), &held).unwrap();
        drop(held);
        storage.save(&GoalStore::new()).unwrap();
        assert!(storage.exists());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("goals_data.json"));

        let mut store = GoalStore::new();
        let root = store
            .add("Learn X", NaiveDate::from_ymd_opt(2026, 12, 1), None)
            .unwrap();
        let child = store.add("Read docs", None, Some(root)).unwrap();
        store.add_resource(child, "the book").unwrap();
        store
            .complete_on(child, NaiveDate::from_ymd_opt(2026, 10, 2).unwrap())
            .unwrap();

        storage.save(&store).unwrap();
        assert!(storage.exists());
        assert!(storage.lock_file().exists());

        let loaded = storage.load().store;
        assert_eq!(loaded, store);
        assert_eq!(loaded.next_id(), 3);
    }

    #[test]
    fn saved_document_uses_nested_layout() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("goals_data.json"));

        let mut store = GoalStore::new();
        let root = store.add("Root", None, None).unwrap();
        store.add("Child", None, Some(root)).unwrap();
        storage.save(&store).unwrap();

        let raw = fs::read_to_string(storage.data_file()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["next_id"], 3);
        assert_eq!(value["goals"][0]["parent_id"], serde_json::Value::Null);
        assert_eq!(value["goals"][0]["sub_goals"][0]["title"], "Child");
        assert_eq!(value["goals"][0]["sub_goals"][0]["parent_id"], 1);
        assert_eq!(value["goals"][0]["sub_goals"][0]["completed"], false);
    }

    #[test]
    fn from_config_uses_configured_path() {
        let mut config = Config::default();
        config.data_file = PathBuf::from("/tmp/elsewhere/goals.json");
        config.storage.lock_timeout_ms = 100;
        let storage = Storage::from_config(&config);
        assert_eq!(storage.data_file(), Path::new("/tmp/elsewhere/goals.json"));
        assert_eq!(storage.lock_file(), PathBuf::from("/tmp/elsewhere/goals.json.lock"));
    }
}
