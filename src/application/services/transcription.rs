use std::sync::Arc;

use crate::application::ports::{
    AudioRepository, AudioSource, MediaStoreError, RepositoryError, SpeechToText,
    SpeechToTextError, TranscriptRepository,
};
use crate::domain::{SessionId, StorageKind, Transcript};

use super::media_stores::MediaStores;

/// Drives one transcription pass: resolves the stored recording, calls the
/// speech-to-text capability, and replaces the session's transcript. Prior
/// transcript and verdict data is discarded before the new row is written,
/// so a re-run never leaves mixed results behind.
pub struct TranscriptionService {
    stores: Arc<MediaStores>,
    audio: Arc<dyn AudioRepository>,
    transcripts: Arc<dyn TranscriptRepository>,
    stt: Arc<dyn SpeechToText>,
    language_hint: String,
}

impl TranscriptionService {
    pub fn new(
        stores: Arc<MediaStores>,
        audio: Arc<dyn AudioRepository>,
        transcripts: Arc<dyn TranscriptRepository>,
        stt: Arc<dyn SpeechToText>,
        language_hint: String,
    ) -> Self {
        Self {
            stores,
            audio,
            transcripts,
            stt,
            language_hint,
        }
    }

    pub async fn run(&self, session_id: SessionId) -> Result<Transcript, TranscriptionRunError> {
        let reference = self
            .audio
            .get_for_session(session_id)
            .await?
            .ok_or(TranscriptionRunError::MissingAudio(session_id))?;

        let source = match reference.storage_kind {
            StorageKind::Local => {
                match self
                    .stores
                    .local_file_path(StorageKind::Local, &reference.storage_path)
                {
                    Some(path) => AudioSource::Path(path),
                    None => self.buffer_source(&reference).await?,
                }
            }
            // Object storage streams into memory; no temp files on disk.
            StorageKind::S3 => self.buffer_source(&reference).await?,
        };

        tracing::debug!(
            session_id = %session_id.as_uuid(),
            storage_kind = %reference.storage_kind,
            "Submitting audio for transcription"
        );

        let outcome = self.stt.transcribe(source, &self.language_hint).await?;

        // Invalidate everything derived from the old text before writing.
        self.transcripts.delete_for_session(session_id).await?;

        let transcript = Transcript::new(
            session_id,
            outcome.text,
            outcome.language,
            outcome.duration_seconds,
        );
        self.transcripts.create(&transcript).await?;

        if let Some(duration) = outcome.duration_seconds {
            self.audio.set_duration(session_id, duration).await?;
        }

        tracing::info!(
            session_id = %session_id.as_uuid(),
            words = transcript.word_count,
            language = %transcript.language,
            "Transcription completed"
        );

        Ok(transcript)
    }

    async fn buffer_source(
        &self,
        reference: &crate::domain::AudioReference,
    ) -> Result<AudioSource, TranscriptionRunError> {
        let data = self
            .stores
            .fetch(reference.storage_kind, &reference.storage_path)
            .await?;
        Ok(AudioSource::Buffer {
            data,
            filename: reference.filename.clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionRunError {
    #[error("no audio uploaded for session {}", .0.as_uuid())]
    MissingAudio(SessionId),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(#[from] SpeechToTextError),
    #[error("storage: {0}")]
    Storage(#[from] MediaStoreError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
