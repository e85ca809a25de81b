//! Durable key-value storage for serialized blobs.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use directories::ProjectDirs;

use crate::error::CoreError;

/// Synchronous string-blob storage scoped to one user profile.
pub trait BlobStore: Send + Sync {
    fn read_blob(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn write_blob(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory.
    pub fn in_data_dir() -> Result<Self, CoreError> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast").ok_or_else(|| {
            CoreError::Persistence("Could not determine platform data directory".into())
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path).map(Some).map_err(|e| {
            CoreError::Persistence(format!("Failed to read {}: {e}", path.display()))
        })
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CoreError::Persistence(format!(
                "Failed to create data directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| {
            CoreError::Persistence(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

/// In-process store. Can be switched to reject writes.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock_blobs().insert(key.to_string(), value.to_string());
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// Current raw value for `key`, bypassing the trait.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock_blobs().get(key).cloned()
    }

    fn lock_blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BlobStore for MemoryBlobStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.get(key))
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), CoreError> {
        if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(CoreError::Persistence("storage quota exceeded".into()));
        }
        self.lock_blobs().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn read_blob(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).read_blob(key)
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), CoreError> {
        (**self).write_blob(key, value)
    }
}
