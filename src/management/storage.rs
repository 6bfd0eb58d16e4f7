use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Key/value storage scope used for persisted auth data.
///
/// Reads never fail: anything that cannot be read is reported as absent.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;
    async fn remove(&self, key: &str) -> Result<(), String>;
}

/// Durable storage keeping one JSON file per key inside a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        match async_fs::read_to_string(self.path(key)).await {
            Ok(content) => Some(content),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!(key, error = %e, "cannot read stored value");
                }
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        async_fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| e.to_string())?;
        async_fs::write(self.path(key), value)
            .await
            .map_err(|e| e.to_string())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        match async_fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Process-scoped storage. Values are gone once the program exits.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
