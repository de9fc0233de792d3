//! Key-value storage backends
//!
//! The collection lives in one string slot; these backends only know about
//! opaque keys and string values.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;

/// String-keyed persistent slots
pub trait KeyValueStore {
    /// Read a slot, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a slot with a new value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a slot; removing a missing slot is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.slots.remove(key);
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per slot
///
/// Writes go to a temp file in the same directory and are renamed over the
/// slot under an exclusive lock on `.lock`, so a reader never sees a torn
/// value.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "FileStore::open: opened store");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File backing a slot
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn lock(&self) -> Result<fs::File, StoreError> {
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(".lock"))?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        let path = self.slot_path(key);
        debug!(?path, "FileStore::get: called");
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.slot_path(key);
        debug!(?path, bytes = value.len(), "FileStore::set: called");

        let lock = self.lock()?;
        let mut tmp = NamedTempFile::new_in(&self.base_path)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        FileExt::unlock(&lock)?;

        debug!("FileStore::set: slot written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.slot_path(key);
        debug!(?path, "FileStore::remove: called");
        let lock = self.lock()?;
        let result = match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        };
        FileExt::unlock(&lock)?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("recipes").unwrap(), None);

        store.set("recipes", "[]").unwrap();
        assert_eq!(store.get("recipes").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.len(), 1);

        store.remove("recipes").unwrap();
        assert!(store.is_empty());
        store.remove("recipes").unwrap();
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path().join("data")).unwrap();

        assert_eq!(store.get("recipes").unwrap(), None);
        store.set("recipes", r#"[{"a":1}]"#).unwrap();
        assert_eq!(store.get("recipes").unwrap().as_deref(), Some(r#"[{"a":1}]"#));
        assert!(store.slot_path("recipes").exists());

        store.set("recipes", "[]").unwrap();
        assert_eq!(store.get("recipes").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = FileStore::open(temp.path()).unwrap();
            store.set("recipes", "[1,2,3]").unwrap();
        }
        let store = FileStore::open(temp.path()).unwrap();
        assert_eq!(store.get("recipes").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_file_store_remove() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();
        store.set("recipes.corrupt-1", "garbage").unwrap();
        store.remove("recipes.corrupt-1").unwrap();
        assert_eq!(store.get("recipes.corrupt-1").unwrap(), None);
        store.remove("never-written").unwrap();
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut store = MemoryStore::new();
        for key in ["", "../escape", "a/b", ".lock", "with space"] {
            assert!(
                matches!(store.set(key, "x"), Err(StoreError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
