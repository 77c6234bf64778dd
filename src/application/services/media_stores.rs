use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::{StorageKind, StoragePath};

/// The configured primary store paired with the always-available local
/// store. A primary `put` failure falls back to local instead of failing
/// the write; the caller records which kind actually holds the bytes.
pub struct MediaStores {
    primary: Arc<dyn MediaStore>,
    primary_kind: StorageKind,
    local: Arc<dyn MediaStore>,
}

impl MediaStores {
    pub fn new(
        primary: Arc<dyn MediaStore>,
        primary_kind: StorageKind,
        local: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            primary,
            primary_kind,
            local,
        }
    }

    /// Local-only configuration: one store serving both roles.
    pub fn local_only(local: Arc<dyn MediaStore>) -> Self {
        Self {
            primary: Arc::clone(&local),
            primary_kind: StorageKind::Local,
            local,
        }
    }

    pub fn primary_kind(&self) -> StorageKind {
        self.primary_kind
    }

    /// Writes to the primary store; on failure falls back to local. The
    /// fallback is a deliberate availability trade-off, surfaced only in
    /// the returned kind and a WARN log.
    pub async fn put_with_fallback(
        &self,
        path: &StoragePath,
        data: Bytes,
    ) -> Result<StorageKind, MediaStoreError> {
        match self.primary.put(path, data.clone()).await {
            Ok(()) => Ok(self.primary_kind),
            Err(e) if self.primary_kind != StorageKind::Local => {
                tracing::warn!(
                    error = %e,
                    path = %path,
                    "Primary store write failed, falling back to local storage"
                );
                self.local.put(path, data).await?;
                Ok(StorageKind::Local)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn fetch(
        &self,
        kind: StorageKind,
        path: &StoragePath,
    ) -> Result<Vec<u8>, MediaStoreError> {
        self.store_for(kind).fetch(path).await
    }

    /// Filesystem path for locally stored objects, so transcription can pass
    /// a path instead of re-reading the bytes.
    pub fn local_file_path(&self, kind: StorageKind, path: &StoragePath) -> Option<PathBuf> {
        match kind {
            StorageKind::Local => self.local.local_file_path(path),
            StorageKind::S3 => None,
        }
    }

    fn store_for(&self, kind: StorageKind) -> &dyn MediaStore {
        match kind {
            StorageKind::Local => self.local.as_ref(),
            StorageKind::S3 => self.primary.as_ref(),
        }
    }
}
