//! Flat on-disk key/value store.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::storage::{StoreError, StoreResult};

const FILE_EXTENSION: &str = "json";

/// On-disk layout of one entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: Value,
}

/// A directory of JSON files mirrored into a concurrent map.
///
/// Keys are restricted to `[A-Za-z0-9_-]` so they map directly to file names.
pub struct KvStore {
    dir: PathBuf,
    entries: DashMap<String, Value>,
}

impl KvStore {
    /// Open (creating if needed) the store at `dir` and load every entry.
    ///
    /// Files that cannot be parsed are skipped with a warning.
    pub async fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let entries = DashMap::new();
        let mut listing = tokio::fs::read_dir(&dir).await.map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        loop {
            let entry = match listing.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(StoreError::Io { path: dir.clone(), source }),
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }

            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Skipping unreadable storage file");
                    continue;
                }
            };
            match serde_json::from_slice::<StoredEntry>(&raw) {
                Ok(stored) => {
                    entries.insert(stored.key, stored.value);
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Skipping corrupt storage file");
                }
            }
        }

        tracing::info!(dir = ?dir, entries = entries.len(), "Storage opened");
        Ok(Self { dir, entries })
    }

    fn validate_key(key: &str) -> StoreResult<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, FILE_EXTENSION))
    }

    /// Write `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        Self::validate_key(key)?;

        let stored = StoredEntry {
            key: key.to_string(),
            value,
        };
        let encoded = serde_json::to_vec(&stored)?;

        // Write to a sibling file then rename so readers never see a partial entry.
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &encoded)
            .await
            .map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;

        self.entries.insert(stored.key, stored.value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    /// Snapshot of every `(key, value)` pair.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Remove `key`. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        Self::validate_key(key)?;

        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { path, source }),
        }
        Ok(self.entries.remove(key).is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
