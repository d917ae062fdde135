use async_trait::async_trait;
use mockshop_core::repository::{CasOutcome, DocumentStore, StoreError, Version, Versioned};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Stores each document as a pretty-printed JSON file `<root>/<key>.json`.
///
/// The version of a document is a hash of its bytes on disk, so edits made by
/// other processes are seen as conflicts by `compare_and_swap`. Writes from this
/// process are serialized; writes from other processes are not.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Like `new`, but creates the root directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io {
                key: root.display().to_string(),
                source,
            })?;
        info!("Using file store at {}", root.display());
        Ok(Self::new(root))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    async fn read_raw(&self, key: &str, path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn write_raw(&self, key: &str, path: &Path, value: &Value) -> Result<Version, StoreError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;

        // Write next to the target, then rename over it
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

        let version = content_version(&bytes);
        debug!("Wrote {} ({} bytes, version {})", path.display(), bytes.len(), version);
        Ok(version)
    }
}

fn content_version(bytes: &[u8]) -> Version {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned<Value>>, StoreError> {
        let path = self.path_for(key)?;
        let Some(bytes) = self.read_raw(key, &path).await? else {
            return Ok(None);
        };

        let value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;

        Ok(Some(Versioned {
            version: content_version(&bytes),
            value,
        }))
    }

    async fn put(&self, key: &str, value: &Value) -> Result<Version, StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;
        self.write_raw(key, &path, value).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &Value,
    ) -> Result<CasOutcome, StoreError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;

        let current = self
            .read_raw(key, &path)
            .await?
            .map(|bytes| content_version(&bytes));
        if current != expected {
            debug!("CAS conflict on {}: expected {:?}, found {:?}", key, expected, current);
            return Ok(CasOutcome::Conflict { current });
        }

        let version = self.write_raw(key, &path, value).await?;
        Ok(CasOutcome::Swapped(version))
    }
}
