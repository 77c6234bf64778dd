use std::io;
use std::path::PathBuf;

use bytes::Bytes;

use crate::domain::StoragePath;

/// Durable byte storage for call recordings and narration audio. Payloads
/// are bounded by the intake size cap, so whole buffers rather than streams.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<(), MediaStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, MediaStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError>;

    /// Filesystem location of the object, for stores backed by a local
    /// directory. Object stores return None and callers fall back to
    /// fetching the bytes.
    fn local_file_path(&self, _path: &StoragePath) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
