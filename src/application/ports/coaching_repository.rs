use async_trait::async_trait;

use crate::domain::{CoachingFeedback, SessionId};

use super::RepositoryError;

#[async_trait]
pub trait CoachingRepository: Send + Sync {
    /// Stores the feedback, replacing any prior row for the session
    /// (regeneration is delete + recreate).
    async fn upsert(&self, feedback: &CoachingFeedback) -> Result<(), RepositoryError>;

    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<CoachingFeedback>, RepositoryError>;

    async fn delete_for_session(&self, session_id: SessionId) -> Result<(), RepositoryError>;
}
