use async_trait::async_trait;

use crate::domain::{ScoreHistoryEntry, ScoreSnapshot, SessionId};

use super::RepositoryError;

#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn current(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ScoreSnapshot>, RepositoryError>;

    /// Replaces the current snapshot and appends the history entry in one
    /// transaction. History rows are never updated or deleted.
    async fn record(
        &self,
        snapshot: &ScoreSnapshot,
        entry: &ScoreHistoryEntry,
    ) -> Result<(), RepositoryError>;

    /// Full audit trail, oldest first.
    async fn history(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ScoreHistoryEntry>, RepositoryError>;
}
