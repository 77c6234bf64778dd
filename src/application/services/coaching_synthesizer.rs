use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    CoachingRepository, RepositoryError, ScoreRepository, SessionRepository, SpeechSynthesis,
    VerdictRepository,
};
use crate::domain::{
    criterion_at, CoachingContent, CoachingFeedback, NarrationReference, SessionId, StoragePath,
};

use super::coaching_strategy::{CoachingStrategy, CoachingStrategyError, Gap, GapReport};
use super::media_stores::MediaStores;

// mp3_44100_128: 128 kbps, 16 KiB per second of audio.
const NARRATION_BYTES_PER_SECOND: usize = 16 * 1024;

/// Produces the coaching feedback row for a scored session: extracts the
/// gaps, delegates text generation to the configured strategy, and narrates
/// the result best-effort. A perfect checklist short-circuits to a fixed
/// message with zero external calls.
pub struct CoachingSynthesizer {
    sessions: Arc<dyn SessionRepository>,
    verdicts: Arc<dyn VerdictRepository>,
    scores: Arc<dyn ScoreRepository>,
    coaching: Arc<dyn CoachingRepository>,
    strategy: Arc<dyn CoachingStrategy>,
    narrator: Option<Arc<dyn SpeechSynthesis>>,
    stores: Arc<MediaStores>,
    narration_voice: String,
}

impl CoachingSynthesizer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        verdicts: Arc<dyn VerdictRepository>,
        scores: Arc<dyn ScoreRepository>,
        coaching: Arc<dyn CoachingRepository>,
        strategy: Arc<dyn CoachingStrategy>,
        narrator: Option<Arc<dyn SpeechSynthesis>>,
        stores: Arc<MediaStores>,
        narration_voice: String,
    ) -> Self {
        Self {
            sessions,
            verdicts,
            scores,
            coaching,
            strategy,
            narrator,
            stores,
            narration_voice,
        }
    }

    pub async fn synthesize(
        &self,
        session_id: SessionId,
    ) -> Result<CoachingFeedback, CoachingError> {
        // Coaching cannot precede scoring.
        let snapshot = self
            .scores
            .current(session_id)
            .await?
            .ok_or(CoachingError::ScoreMissing(session_id))?;

        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| CoachingError::SessionNotFound(session_id))?;

        let verdicts = self.verdicts.list_for_session(session_id).await?;

        let mut met = Vec::new();
        let mut gaps = Vec::new();
        for verdict in &verdicts {
            let criterion = criterion_at(verdict.position).ok_or_else(|| {
                CoachingError::Strategy(CoachingStrategyError::Parse(format!(
                    "verdict position {} has no catalog entry",
                    verdict.position
                )))
            })?;
            if verdict.effective_met() {
                met.push(criterion);
            } else {
                gaps.push(Gap {
                    criterion,
                    rationale: verdict.ai_rationale.clone(),
                });
            }
        }

        let content = if gaps.is_empty() {
            tracing::info!(
                session_id = %session_id.as_uuid(),
                "Perfect checklist, returning fixed congratulatory feedback"
            );
            CoachingContent::perfect_score()
        } else {
            let report = GapReport {
                score: snapshot.score,
                risk_band: snapshot.risk_band,
                customer_name: session.customer_name.clone(),
                met,
                gaps,
            };
            self.strategy.generate(&report).await?
        };

        let audio = self.narrate(session_id, &content.feedback_text).await;

        let feedback = CoachingFeedback::new(session_id, content, audio);
        self.coaching.upsert(&feedback).await?;

        tracing::info!(
            session_id = %session_id.as_uuid(),
            has_audio = feedback.audio.is_some(),
            "Coaching feedback stored"
        );
        Ok(feedback)
    }

    /// Delete + recreate, for the explicit regenerate operation.
    pub async fn regenerate(
        &self,
        session_id: SessionId,
    ) -> Result<CoachingFeedback, CoachingError> {
        self.coaching.delete_for_session(session_id).await?;
        self.synthesize(session_id).await
    }

    /// Narration is an independently failable enhancement: any error here is
    /// logged and swallowed, the text feedback still persists.
    async fn narrate(&self, session_id: SessionId, text: &str) -> Option<NarrationReference> {
        let narrator = self.narrator.as_ref()?;

        let audio_bytes = match narrator.synthesize(text, &self.narration_voice).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id.as_uuid(),
                    error = %e,
                    "Narration failed, keeping text-only feedback"
                );
                return None;
            }
        };

        let duration_seconds = (audio_bytes.len() / NARRATION_BYTES_PER_SECOND) as u32;
        let path = StoragePath::for_narration(&session_id);
        match self
            .stores
            .put_with_fallback(&path, Bytes::from(audio_bytes))
            .await
        {
            Ok(kind) => Some(NarrationReference {
                storage_path: path,
                storage_kind: kind,
                duration_seconds,
            }),
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id.as_uuid(),
                    error = %e,
                    "Failed to store narration audio, keeping text-only feedback"
                );
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoachingError {
    #[error("no score snapshot for session {}; calculate a score first", .0.as_uuid())]
    ScoreMissing(SessionId),
    #[error("session not found: {}", .0.as_uuid())]
    SessionNotFound(SessionId),
    #[error("strategy: {0}")]
    Strategy(#[from] CoachingStrategyError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
