use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{CallSession, SessionId, SessionStatus};

use super::RepositoryError;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &CallSession) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: SessionId) -> Result<Option<CallSession>, RepositoryError>;

    async fn update_status(
        &self,
        id: SessionId,
        status: SessionStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    async fn mark_submitted(
        &self,
        id: SessionId,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    async fn mark_completed(
        &self,
        id: SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CallSession>, RepositoryError>;
}
