use async_trait::async_trait;

use crate::domain::{AudioReference, SessionId};

use super::RepositoryError;

#[async_trait]
pub trait AudioRepository: Send + Sync {
    async fn create(&self, reference: &AudioReference) -> Result<(), RepositoryError>;

    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<AudioReference>, RepositoryError>;

    /// Backfills the duration once transcription has reported it.
    async fn set_duration(
        &self,
        session_id: SessionId,
        duration_seconds: f64,
    ) -> Result<(), RepositoryError>;
}
