use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StoragePath;

/// HashMap-backed store for tests and local harnesses.
#[derive(Default)]
pub struct InMemoryMediaStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &StoragePath) -> bool {
        self.objects.read().await.contains_key(path.as_str())
    }
}

#[async_trait::async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<(), MediaStoreError> {
        self.objects
            .write()
            .await
            .insert(path.as_str().to_string(), data);
        Ok(())
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, MediaStoreError> {
        self.objects
            .read()
            .await
            .get(path.as_str())
            .map(|b| b.to_vec())
            .ok_or_else(|| MediaStoreError::NotFound(path.as_str().to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError> {
        self.objects.write().await.remove(path.as_str());
        Ok(())
    }
}

/// Store whose every operation fails, for exercising fallback paths.
pub struct FailingMediaStore;

#[async_trait::async_trait]
impl MediaStore for FailingMediaStore {
    async fn put(&self, _path: &StoragePath, _data: Bytes) -> Result<(), MediaStoreError> {
        Err(MediaStoreError::UploadFailed("store unavailable".into()))
    }

    async fn fetch(&self, _path: &StoragePath) -> Result<Vec<u8>, MediaStoreError> {
        Err(MediaStoreError::DownloadFailed("store unavailable".into()))
    }

    async fn delete(&self, _path: &StoragePath) -> Result<(), MediaStoreError> {
        Err(MediaStoreError::DeleteFailed("store unavailable".into()))
    }
}
