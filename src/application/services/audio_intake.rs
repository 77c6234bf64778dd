use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::application::ports::{
    AudioRepository, MediaStoreError, RepositoryError, SessionRepository,
};
use crate::domain::{AudioReference, SessionId, SessionStatus, StoragePath};

use super::media_stores::MediaStores;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/wav",
    "audio/x-wav",
    "audio/webm",
    "audio/ogg",
    "audio/flac",
    "audio/m4a",
    "audio/x-m4a",
];

/// Validates and persists an uploaded recording, producing exactly one
/// audio reference per session. Validation happens before any state
/// mutation; the only transparently recovered failure is the primary-store
/// fallback inside [`MediaStores`].
pub struct AudioIntakeService {
    stores: Arc<MediaStores>,
    sessions: Arc<dyn SessionRepository>,
    audio: Arc<dyn AudioRepository>,
    max_upload_bytes: u64,
}

/// Result of an intake: the reference plus whether the caller should
/// re-trigger the downstream pipeline only (reprocess of existing audio).
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub reference: AudioReference,
    pub reused_existing: bool,
}

impl AudioIntakeService {
    pub fn new(
        stores: Arc<MediaStores>,
        sessions: Arc<dyn SessionRepository>,
        audio: Arc<dyn AudioRepository>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            stores,
            sessions,
            audio,
            max_upload_bytes,
        }
    }

    pub async fn receive(
        &self,
        session_id: SessionId,
        filename: &str,
        mime_type: &str,
        data: Bytes,
        reprocess: bool,
    ) -> Result<IntakeOutcome, IntakeError> {
        if !ALLOWED_MIME_TYPES.contains(&mime_type) {
            return Err(IntakeError::UnsupportedMediaType(mime_type.to_string()));
        }
        if data.len() as u64 > self.max_upload_bytes {
            return Err(IntakeError::PayloadTooLarge {
                size: data.len() as u64,
                limit: self.max_upload_bytes,
            });
        }

        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| IntakeError::SessionNotFound(session_id))?;

        if let Some(existing) = self.audio.get_for_session(session_id).await? {
            if !reprocess {
                return Err(IntakeError::Conflict(session_id));
            }
            // Reprocess keeps the stored bytes; only the pipeline re-runs.
            tracing::info!(
                session_id = %session_id.as_uuid(),
                "Reusing existing audio reference for reprocessing"
            );
            return Ok(IntakeOutcome {
                reference: existing,
                reused_existing: true,
            });
        }

        let unique_name = format!("{}_{}", Uuid::new_v4().simple(), sanitize(filename));
        let path = StoragePath::for_audio(&session_id, &unique_name);
        let size_bytes = data.len() as u64;

        let stored_kind = self.stores.put_with_fallback(&path, data).await?;

        let reference = AudioReference::new(
            session_id,
            unique_name,
            path,
            stored_kind,
            size_bytes,
            mime_type.to_string(),
        );
        self.audio.create(&reference).await?;

        if matches!(
            session.status,
            SessionStatus::Draft | SessionStatus::Uploading
        ) {
            self.sessions
                .update_status(session_id, SessionStatus::Processing, None)
                .await?;
        }

        tracing::info!(
            session_id = %session_id.as_uuid(),
            storage_kind = %stored_kind,
            bytes = size_bytes,
            "Audio intake completed"
        );

        Ok(IntakeOutcome {
            reference,
            reused_existing: false,
        })
    }
}

fn sanitize(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "recording.webm".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
    #[error("audio already uploaded for session {}", .0.as_uuid())]
    Conflict(SessionId),
    #[error("session not found: {}", .0.as_uuid())]
    SessionNotFound(SessionId),
    #[error("storage: {0}")]
    Storage(#[from] MediaStoreError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
