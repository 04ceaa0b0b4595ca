//! Synchronous, quota-limited key/value storage.
//!
//! This is the medium the relational store and the legacy migration persist
//! into. Keys and values are plain strings. Every store enforces a byte quota
//! over the sum of key and value lengths of all entries; a write that would
//! exceed it is rejected with [`PersistenceError::QuotaExceeded`] and leaves
//! the previous contents untouched.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`]: process-local map, used by tests and dry runs
//! - [`FileStore`]: JSON object on disk, rewritten atomically on each change

use crate::libs::config::StorageConfig;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::PersistenceError;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_warning};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default quota, matching the usual 5 MiB budget of browser local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Removes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

type Entries = BTreeMap<String, String>;

fn used_bytes(entries: &Entries, skip: &str) -> usize {
    entries.iter().filter(|(k, _)| k.as_str() != skip).map(|(k, v)| k.len() + v.len()).sum()
}

fn check_quota(entries: &Entries, key: &str, value: &str, quota: usize) -> Result<(), PersistenceError> {
    let required = used_bytes(entries, key) + key.len() + value.len();
    if required > quota {
        return Err(PersistenceError::QuotaExceeded {
            key: key.to_string(),
            required,
            quota,
        });
    }
    Ok(())
}

#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
    quota: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota: usize) -> Self {
        MemoryStore {
            entries: Mutex::new(Entries::new()),
            quota,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock();
        check_quota(&entries, key, value, self.quota)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Key/value store kept as a single JSON object in a file.
///
/// The whole map is held in memory; every `set`/`remove` rewrites the file
/// through a temporary sibling and a rename, and only updates the in-memory
/// map once the file is in place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
    quota: usize,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>, quota: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<Entries>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    msg_warning!(Message::StorageFileUnreadable(path.display().to_string(), e.to_string()));
                    Entries::new()
                }
            }
        } else {
            Entries::new()
        };
        msg_debug!(format!("Opened storage {} with {} key(s)", path.display(), entries.len()));

        Ok(FileStore {
            path,
            entries: Mutex::new(entries),
            quota,
        })
    }

    /// Opens the store configured for this installation.
    pub fn from_config(config: &StorageConfig) -> io::Result<Self> {
        let path = DataStorage::new().get_path(&config.file_name)?;
        Self::open(path, config.quota_bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, entries: &Entries) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(entries).map_err(|source| PersistenceError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, encoded)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock();
        check_quota(&entries, key, value, self.quota)?;

        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.write_file(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.remove(key);
        self.write_file(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_rejects_writes_over_quota() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();

        let err = store.set("other", "123456").unwrap_err();
        assert!(matches!(err, PersistenceError::QuotaExceeded { required: 17, quota: 10, .. }));
        assert_eq!(store.get("other"), None);
        assert_eq!(store.get("k").as_deref(), Some("12345"));
    }

    #[test]
    fn overwriting_a_key_only_counts_the_new_value() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "123456789").unwrap();
        store.set("k", "987654321").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("987654321"));
    }

    #[test]
    fn removing_absent_key_is_ok() {
        let store = MemoryStore::new();
        store.remove("missing").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
        store.set("todos", "[]").unwrap();
        store.set("migration-completed", "true").unwrap();
        store.remove("todos").unwrap();
        drop(store);

        let reopened = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
        assert_eq!(reopened.get("migration-completed").as_deref(), Some("true"));
        assert!(!reopened.contains("todos"));
    }

    #[test]
    fn file_store_keeps_file_unchanged_on_quota_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = FileStore::open(&path, 16).unwrap();
        store.set("a", "1").unwrap();
        assert!(store.set("b", "a value that is far too long").is_err());

        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, r#"{"a":"1"}"#);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
        assert_eq!(store.get("anything"), None);
    }
}
