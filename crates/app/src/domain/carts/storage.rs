//! Local cart storage.
//!
//! A key-value contract over raw JSON records, so the cart store never cares
//! whether records live on disk or in memory.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use tokio::{fs, sync::RwLock};

use crate::domain::carts::errors::CartStorageError;

#[automock]
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the record stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError>;

    /// Replace the record stored under `key`.
    async fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError>;

    /// Drop the record stored under `key`; absent keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), CartStorageError>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        self.dir.join(format!("{name}.json"))
    }

    /// Keys of every record in the directory. A missing directory holds none.
    pub async fn keys(&self) -> Result<Vec<String>, CartStorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if let Some(key) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
            {
                keys.push(key.to_owned());
            }
        }

        keys.sort_unstable();

        Ok(keys)
    }
}

#[async_trait]
impl CartStorage for FileCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir).await?;
        fs::write(&staging, value).await?;
        fs::rename(&staging, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CartStorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

/// Process-local storage, for tests and single-node deployments without a
/// writable storage directory.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    records: RwLock<FxHashMap<String, String>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CartStorageError> {
        self.records.write().await.remove(key);

        Ok(())
    }
}
