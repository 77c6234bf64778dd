use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::MediaStoreError;
use crate::application::services::MediaStores;
use crate::domain::StorageKind;
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::local_store::LocalMediaStore;
use super::s3_store::S3MediaStore;

pub struct MediaStoreFactory;

impl MediaStoreFactory {
    /// Builds the primary/local store pair. The local store is always
    /// constructed, since it doubles as the fallback target for S3 outages.
    pub fn create(settings: &StorageSettings) -> Result<MediaStores, MediaStoreError> {
        let local = Arc::new(LocalMediaStore::new(PathBuf::from(&settings.local_path))?);

        match settings.provider {
            StorageProviderSetting::Local => Ok(MediaStores::local_only(local)),
            StorageProviderSetting::S3 => {
                let region = settings
                    .s3_region
                    .as_deref()
                    .ok_or_else(|| MediaStoreError::UploadFailed("s3_region required".into()))?;
                let bucket = settings
                    .s3_bucket
                    .as_deref()
                    .ok_or_else(|| MediaStoreError::UploadFailed("s3_bucket required".into()))?;
                let access_key_id = settings.s3_access_key_id.as_deref().ok_or_else(|| {
                    MediaStoreError::UploadFailed("s3_access_key_id required".into())
                })?;
                let secret_access_key =
                    settings.s3_secret_access_key.as_deref().ok_or_else(|| {
                        MediaStoreError::UploadFailed("s3_secret_access_key required".into())
                    })?;

                let primary = S3MediaStore::new(
                    region,
                    bucket,
                    access_key_id,
                    secret_access_key,
                    settings.s3_endpoint.as_deref(),
                )?;
                Ok(MediaStores::new(
                    Arc::new(primary),
                    StorageKind::S3,
                    local,
                ))
            }
        }
    }
}
