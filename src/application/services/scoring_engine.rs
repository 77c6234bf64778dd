use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::{RepositoryError, ScoreRepository, VerdictRepository};
use crate::domain::{
    CriterionVerdict, RiskBand, ScoreHistoryEntry, ScoreSnapshot, ScoreTrigger, SessionId,
};

/// Converts the current verdict set into the 0-100 score and risk band.
/// Every recalculation replaces the snapshot and appends exactly one history
/// entry, even when the score is unchanged: history is a complete audit
/// trail, not a deduplicated trend line.
pub struct ScoringEngine {
    verdicts: Arc<dyn VerdictRepository>,
    scores: Arc<dyn ScoreRepository>,
}

/// Pure derivation from a verdict set; persistence-free and deterministic.
pub fn compute_snapshot(session_id: SessionId, verdicts: &[CriterionVerdict]) -> ScoreSnapshot {
    let met_count = verdicts.iter().filter(|v| v.effective_met()).count() as u32;
    let score = met_count * 10;
    ScoreSnapshot {
        session_id,
        score,
        risk_band: RiskBand::from_score(score),
        met_count,
        total_count: verdicts.len() as u32,
        calculated_at: Utc::now(),
    }
}

impl ScoringEngine {
    pub fn new(verdicts: Arc<dyn VerdictRepository>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { verdicts, scores }
    }

    pub async fn recalculate(
        &self,
        session_id: SessionId,
        trigger: ScoreTrigger,
    ) -> Result<ScoreSnapshot, ScoringError> {
        let verdicts = self.verdicts.list_for_session(session_id).await?;
        if verdicts.is_empty() {
            return Err(ScoringError::NoVerdicts(session_id));
        }

        let snapshot = compute_snapshot(session_id, &verdicts);
        let previous = self.scores.current(session_id).await?;
        let delta = previous
            .as_ref()
            .map(|p| snapshot.score as i32 - p.score as i32);

        let entry = ScoreHistoryEntry::from_snapshot(&snapshot, delta, trigger);
        self.scores.record(&snapshot, &entry).await?;

        tracing::info!(
            session_id = %session_id.as_uuid(),
            score = snapshot.score,
            risk_band = %snapshot.risk_band,
            trigger = %trigger,
            delta = ?delta,
            "Score recalculated"
        );
        Ok(snapshot)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("no criterion verdicts for session {}; run analysis first", .0.as_uuid())]
    NoVerdicts(SessionId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
