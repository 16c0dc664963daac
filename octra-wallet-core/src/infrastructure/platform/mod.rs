//! Storage backends for the session persistence record
//!
//! This module contains the storage abstraction and its concrete backends.
//! The popup surface binds the extension-scoped backend, the expanded
//! surface binds the browser-local backend; both satisfy the same contract
//! despite one being immediately consistent and the other completing
//! asynchronously. Values are opaque serialized blobs; the session store
//! owns the encoding.

use crate::shared::constants::{
    EXTENSION_STORE_SUBDIR, LOCAL_STORE_SUBDIR, STORAGE_DIR_NAME,
};
use crate::shared::error::WalletError;
use crate::shared::types::WalletResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Key/value persistence contract shared by every backend.
///
/// Callers must treat every operation as potentially suspending, and must
/// not assume ordering between two `set` calls issued without awaiting the
/// first. A multi-key `set` is applied as one call so that related keys
/// (the wallet collection and the active pointer) land together.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Fetch the requested keys. Absent keys are omitted from the result.
    async fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Vec<u8>>>;

    /// Persist all entries of the mapping.
    async fn set(&self, entries: HashMap<String, Vec<u8>>) -> WalletResult<()>;

    /// Delete one key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> WalletResult<()>;

    /// Delete every key owned by this backend.
    async fn clear(&self) -> WalletResult<()>;
}

fn default_base_dir(subdir: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("./octra-storage"))
        .join(STORAGE_DIR_NAME)
        .join(subdir)
}

fn value_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.dat", key))
}

/// Browser-local storage equivalent: a synchronous file-per-key store.
///
/// Bound by the expanded surface. Writes go through a temp file and a
/// rename so an aborted operation never leaves a partial value behind.
pub struct LocalStorageAdapter {
    dir: PathBuf,
}

impl LocalStorageAdapter {
    pub fn new() -> Self {
        Self {
            dir: default_base_dir(LOCAL_STORE_SUBDIR),
        }
    }

    /// Create an adapter over a custom directory (for testing)
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn write_value(&self, key: &str, value: &[u8]) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.dir)?;
        let path = value_path(&self.dir, key);
        let tmp = path.with_extension("dat.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl Default for LocalStorageAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageAdapter for LocalStorageAdapter {
    async fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Vec<u8>>> {
        let mut result = HashMap::new();
        for key in keys {
            match std::fs::read(value_path(&self.dir, key)) {
                Ok(value) => {
                    result.insert((*key).to_string(), value);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(WalletError::storage_unavailable(format!(
                        "Failed to read key '{}': {}",
                        key, err
                    )));
                }
            }
        }
        Ok(result)
    }

    async fn set(&self, entries: HashMap<String, Vec<u8>>) -> WalletResult<()> {
        for (key, value) in &entries {
            self.write_value(key, value).map_err(|err| {
                WalletError::storage_unavailable(format!(
                    "Failed to write key '{}': {}",
                    key, err
                ))
            })?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> WalletResult<()> {
        match std::fs::remove_file(value_path(&self.dir, key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(WalletError::storage_unavailable(format!(
                "Failed to remove key '{}': {}",
                key, err
            ))),
        }
    }

    async fn clear(&self) -> WalletResult<()> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("dat") {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Extension-scoped storage equivalent: the completion-based asynchronous
/// backend bound by the popup surface. Same on-disk layout and rename
/// discipline as the local backend, but all I/O suspends.
pub struct ExtensionStorageAdapter {
    dir: PathBuf,
}

impl ExtensionStorageAdapter {
    pub fn new() -> Self {
        Self {
            dir: default_base_dir(EXTENSION_STORE_SUBDIR),
        }
    }

    /// Create an adapter over a custom directory (for testing)
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    async fn write_value(&self, key: &str, value: &[u8]) -> Result<(), std::io::Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = value_path(&self.dir, key);
        let tmp = path.with_extension("dat.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

impl Default for ExtensionStorageAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageAdapter for ExtensionStorageAdapter {
    async fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Vec<u8>>> {
        let mut result = HashMap::new();
        for key in keys {
            match tokio::fs::read(value_path(&self.dir, key)).await {
                Ok(value) => {
                    result.insert((*key).to_string(), value);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(WalletError::storage_unavailable(format!(
                        "Failed to read key '{}': {}",
                        key, err
                    )));
                }
            }
        }
        Ok(result)
    }

    async fn set(&self, entries: HashMap<String, Vec<u8>>) -> WalletResult<()> {
        for (key, value) in &entries {
            self.write_value(key, value).await.map_err(|err| {
                WalletError::storage_unavailable(format!(
                    "Failed to write key '{}': {}",
                    key, err
                ))
            })?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> WalletResult<()> {
        match tokio::fs::remove_file(value_path(&self.dir, key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(WalletError::storage_unavailable(format!(
                "Failed to remove key '{}': {}",
                key, err
            ))),
        }
    }

    async fn clear(&self) -> WalletResult<()> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("dat") {
                tokio::fs::remove_file(path).await?;
            }
        }
        Ok(())
    }
}

/// In-memory backend for ephemeral sessions and tests.
#[derive(Default)]
pub struct MemoryStorageAdapter {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorageAdapter {
    async fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Vec<u8>>> {
        let data = self.data.read().await;
        let mut result = HashMap::new();
        for key in keys {
            if let Some(value) = data.get(*key) {
                result.insert((*key).to_string(), value.clone());
            }
        }
        Ok(result)
    }

    async fn set(&self, entries: HashMap<String, Vec<u8>>) -> WalletResult<()> {
        let mut data = self.data.write().await;
        data.extend(entries);
        Ok(())
    }

    async fn remove(&self, key: &str) -> WalletResult<()> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }

    async fn clear(&self) -> WalletResult<()> {
        let mut data = self.data.write().await;
        data.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise_adapter(adapter: &dyn StorageAdapter) {
        let mut entries = HashMap::new();
        entries.insert("wallets".to_string(), b"[]".to_vec());
        entries.insert("activeWalletId".to_string(), b"\"oct1abc\"".to_vec());
        adapter.set(entries).await.expect("Failed to set entries");

        let fetched = adapter
            .get(&["wallets", "activeWalletId", "missing"])
            .await
            .expect("Failed to get entries");
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.get("wallets"), Some(&b"[]".to_vec()));
        assert!(!fetched.contains_key("missing"));

        adapter
            .remove("activeWalletId")
            .await
            .expect("Failed to remove key");
        let fetched = adapter
            .get(&["activeWalletId"])
            .await
            .expect("Failed to get after remove");
        assert!(fetched.is_empty());

        // Removing an absent key is not an error
        adapter
            .remove("activeWalletId")
            .await
            .expect("Second remove should be a no-op");

        adapter.clear().await.expect("Failed to clear");
        let fetched = adapter
            .get(&["wallets"])
            .await
            .expect("Failed to get after clear");
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_memory_adapter_contract() {
        let adapter = MemoryStorageAdapter::new();
        exercise_adapter(&adapter).await;
    }

    #[tokio::test]
    async fn test_local_adapter_contract() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let adapter = LocalStorageAdapter::with_dir(dir.path().to_path_buf());
        exercise_adapter(&adapter).await;
    }

    #[tokio::test]
    async fn test_extension_adapter_contract() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let adapter = ExtensionStorageAdapter::with_dir(dir.path().to_path_buf());
        exercise_adapter(&adapter).await;
    }

    #[tokio::test]
    async fn test_clear_on_missing_directory_is_a_no_op() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let adapter = LocalStorageAdapter::with_dir(dir.path().join("never-created"));
        adapter.clear().await.expect("Clear should tolerate a missing directory");
    }

    #[tokio::test]
    async fn test_unwritable_backend_surfaces_storage_unavailable() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").expect("Failed to create blocker file");

        // The adapter directory path is occupied by a regular file, so the
        // write cannot even start; nothing partial lands on disk.
        let adapter = LocalStorageAdapter::with_dir(blocker);
        let mut entries = HashMap::new();
        entries.insert("wallets".to_string(), b"[]".to_vec());
        let result = adapter.set(entries).await;
        assert!(matches!(result, Err(WalletError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let adapter = MemoryStorageAdapter::new();
        let mut first = HashMap::new();
        first.insert("wallets".to_string(), b"[1]".to_vec());
        adapter.set(first).await.expect("Failed to set");

        let mut second = HashMap::new();
        second.insert("wallets".to_string(), b"[2]".to_vec());
        adapter.set(second).await.expect("Failed to overwrite");

        let fetched = adapter.get(&["wallets"]).await.expect("Failed to get");
        assert_eq!(fetched.get("wallets"), Some(&b"[2]".to_vec()));
    }
}
