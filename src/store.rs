//! A small key-value store that holds the dashboard's persisted state.
//!
//! The file-backed implementation keeps every entry in a single JSON object on disk, e.g.
//! `{"daydash_ledger": "[...]"}`, and rewrites the whole file on each `set`.

use crate::backup::Backup;
use crate::{utils, Result};
use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix for copies of a storage file that was not a JSON object of strings.
pub const UNREADABLE_STORAGE: &str = "storage-unreadable";

/// String values stored under string keys.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing has been stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// A `KeyValueStore` persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store. A file that cannot be parsed,
    /// including one that is not UTF-8, is also treated as empty after an attempt to save a copy
    /// of it with `backup`. Only failing to read the file at all is an error.
    pub async fn open(path: impl Into<PathBuf>, backup: &Backup) -> Result<Self> {
        let path = path.into();
        let entries = match utils::read_optional(&path).await? {
            None => {
                debug!("No storage file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Some(content) => match serde_json::from_slice(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "The storage file {} could not be parsed and will be ignored: {e}",
                        path.display()
                    );
                    match backup.save_raw(UNREADABLE_STORAGE, &content).await {
                        Ok(copy) => warn!(
                            "A copy of the unreadable storage file was saved to {}",
                            copy.display()
                        ),
                        Err(e) => warn!("Unable to save a copy of the unreadable storage file: {e:#}"),
                    }
                    BTreeMap::new()
                }
            },
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.entries)
            .context("Unable to serialize the storage entries")?;
        utils::write_atomic(&self.path, data)
            .await
            .context("Unable to write the storage file")
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    /// On failure the entries are left as they were before the call.
    async fn set(&mut self, key: &str, value: String) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value);
        let written = self.write().await;
        if written.is_err() {
            match previous {
                Some(previous) => {
                    let _ = self.entries.insert(key.to_string(), previous);
                }
                None => {
                    let _ = self.entries.remove(key);
                }
            }
        }
        written
    }
}

/// An in-memory `KeyValueStore`, used by tests and by test mode.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `value` under `key`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: String) -> Result<()> {
        let _ = self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backup(dir: &TempDir) -> Backup {
        Backup::new(dir.path().join(".backups"), 5)
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("storage.json"), &backup(&dir))
            .await
            .unwrap();
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_set_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = FileStore::open(&path, &backup(&dir)).await.unwrap();
        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "[]".to_string()).await.unwrap();
        store.set("a", "2".to_string()).await.unwrap();

        let reopened = FileStore::open(&path, &backup(&dir)).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_file_store_malformed_file_is_empty_and_backed_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        utils::write(&path, "{not json").await.unwrap();

        let store = FileStore::open(&path, &backup(&dir)).await.unwrap();
        assert_eq!(store.get("daydash_ledger").await.unwrap(), None);

        let mut backups = std::fs::read_dir(dir.path().join(".backups")).unwrap();
        let entry = backups.next().unwrap().unwrap();
        assert!(entry
            .file_name()
            .to_string_lossy()
            .starts_with(UNREADABLE_STORAGE));
        assert_eq!(std::fs::read_to_string(entry.path()).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn test_file_store_invalid_utf8_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();

        let mut store = FileStore::open(&path, &backup(&dir)).await.unwrap();
        assert_eq!(store.get("daydash_ledger").await.unwrap(), None);
        let entry = std::fs::read_dir(dir.path().join(".backups"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(std::fs::read(entry.path()).unwrap(), [0xff, 0xfe, b'{', b'}']);

        store.set("a", "1".to_string()).await.unwrap();
        let reopened = FileStore::open(&path, &backup(&dir)).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_file_store_opens_when_backup_cannot_be_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        utils::write(&path, "{not json").await.unwrap();
        // A plain file where the backups directory should be.
        utils::write(dir.path().join(".backups"), "").await.unwrap();

        let store = FileStore::open(&path, &backup(&dir)).await.unwrap();
        assert_eq!(store.get("daydash_ledger").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_failed_set_keeps_previous_entries() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("not-yet");
        let path = parent.join("storage.json");
        let mut store = FileStore::open(&path, &backup(&dir)).await.unwrap();

        assert!(store.set("a", "1".to_string()).await.is_err());
        assert_eq!(store.get("a").await.unwrap(), None);

        std::fs::create_dir(&parent).unwrap();
        store.set("b", "2".to_string()).await.unwrap();
        let reopened = FileStore::open(&path, &backup(&dir)).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap(), None);
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let mut store = MemoryStore::with_entry("k", "v");
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.set("k", "w".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("w"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }
}
