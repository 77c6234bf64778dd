use async_trait::async_trait;

use crate::domain::{CriterionVerdict, NewVerdict, SessionId, SubQuestionEvaluation};

use super::RepositoryError;

#[async_trait]
pub trait VerdictRepository: Send + Sync {
    /// Atomically replaces the session's whole verdict set and the attached
    /// sub-question evaluations: delete-then-insert in a single transaction,
    /// so no reader ever observes a partial or mixed set.
    async fn replace_for_session(
        &self,
        session_id: SessionId,
        verdicts: Vec<NewVerdict>,
    ) -> Result<(), RepositoryError>;

    /// Verdicts ordered by criterion position.
    async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<CriterionVerdict>, RepositoryError>;

    async fn sub_questions_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<SubQuestionEvaluation>, RepositoryError>;

    /// Records a human override on one verdict, marking it changed.
    async fn apply_override(
        &self,
        session_id: SessionId,
        position: u8,
        override_met: bool,
    ) -> Result<CriterionVerdict, RepositoryError>;
}
