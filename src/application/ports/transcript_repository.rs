use async_trait::async_trait;

use crate::domain::{SessionId, Transcript};

use super::RepositoryError;

#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    async fn create(&self, transcript: &Transcript) -> Result<(), RepositoryError>;

    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Transcript>, RepositoryError>;

    /// Removes the transcript together with the session's criterion verdicts
    /// and their sub-question evaluations, as one unit. Re-transcription
    /// invalidates everything derived from the old text.
    async fn delete_for_session(&self, session_id: SessionId) -> Result<(), RepositoryError>;
}
