//! HashMap-backed repositories for tests and local harnesses. Each mirrors
//! the transactional guarantees of its Postgres counterpart by doing all of
//! an operation's mutations under a single write lock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{
    AudioRepository, CoachingRepository, RepositoryError, ScoreRepository, SessionRepository,
    TranscriptRepository, VerdictRepository,
};
use crate::domain::{
    AudioReference, CallSession, CoachingFeedback, CriterionVerdict, NewVerdict,
    ScoreHistoryEntry, ScoreSnapshot, SessionId, SessionStatus, SubQuestionEvaluation,
    Transcript, VerdictId,
};

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, CallSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &CallSession) -> Result<(), RepositoryError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: SessionId) -> Result<Option<CallSession>, RepositoryError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: SessionId,
        status: SessionStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        session.status = status;
        session.last_error = error_message.map(|m| m.to_string());
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_submitted(
        &self,
        id: SessionId,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        session.submitted_at = Some(submitted_at);
        session.updated_at = submitted_at;
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        session.completed_at = Some(completed_at);
        session.updated_at = completed_at;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CallSession>, RepositoryError> {
        let mut sessions: Vec<CallSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }
}

#[derive(Default)]
pub struct InMemoryAudioRepository {
    references: RwLock<HashMap<SessionId, AudioReference>>,
}

impl InMemoryAudioRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioRepository for InMemoryAudioRepository {
    async fn create(&self, reference: &AudioReference) -> Result<(), RepositoryError> {
        let mut references = self.references.write().await;
        if references.contains_key(&reference.session_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "audio reference exists for session {}",
                reference.session_id.as_uuid()
            )));
        }
        references.insert(reference.session_id, reference.clone());
        Ok(())
    }

    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<AudioReference>, RepositoryError> {
        Ok(self.references.read().await.get(&session_id).cloned())
    }

    async fn set_duration(
        &self,
        session_id: SessionId,
        duration_seconds: f64,
    ) -> Result<(), RepositoryError> {
        if let Some(reference) = self.references.write().await.get_mut(&session_id) {
            reference.duration_seconds = Some(duration_seconds);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTranscriptRepository {
    transcripts: RwLock<HashMap<SessionId, Transcript>>,
    verdicts: Option<std::sync::Arc<InMemoryVerdictRepository>>,
}

impl InMemoryTranscriptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links the verdict repository so deletes cascade the way the
    /// database schema does.
    pub fn with_verdicts(verdicts: std::sync::Arc<InMemoryVerdictRepository>) -> Self {
        Self {
            transcripts: RwLock::new(HashMap::new()),
            verdicts: Some(verdicts),
        }
    }
}

#[async_trait]
impl TranscriptRepository for InMemoryTranscriptRepository {
    async fn create(&self, transcript: &Transcript) -> Result<(), RepositoryError> {
        self.transcripts
            .write()
            .await
            .insert(transcript.session_id, transcript.clone());
        Ok(())
    }

    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Transcript>, RepositoryError> {
        Ok(self.transcripts.read().await.get(&session_id).cloned())
    }

    async fn delete_for_session(&self, session_id: SessionId) -> Result<(), RepositoryError> {
        self.transcripts.write().await.remove(&session_id);
        if let Some(verdicts) = &self.verdicts {
            verdicts.clear_for_session(session_id).await;
        }
        Ok(())
    }
}

#[derive(Default)]
struct VerdictState {
    verdicts: HashMap<SessionId, Vec<CriterionVerdict>>,
    sub_questions: HashMap<SessionId, Vec<SubQuestionEvaluation>>,
}

#[derive(Default)]
pub struct InMemoryVerdictRepository {
    state: RwLock<VerdictState>,
}

impl InMemoryVerdictRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn clear_for_session(&self, session_id: SessionId) {
        let mut state = self.state.write().await;
        state.verdicts.remove(&session_id);
        state.sub_questions.remove(&session_id);
    }
}

#[async_trait]
impl VerdictRepository for InMemoryVerdictRepository {
    async fn replace_for_session(
        &self,
        session_id: SessionId,
        verdicts: Vec<NewVerdict>,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut stored_verdicts = Vec::with_capacity(verdicts.len());
        let mut stored_subs = Vec::new();

        for verdict in verdicts {
            let id = VerdictId::new();
            for sub in &verdict.sub_questions {
                stored_subs.push(SubQuestionEvaluation {
                    id: Uuid::new_v4(),
                    verdict_id: id,
                    question_order: sub.question_order,
                    evidence_found: sub.evidence_found,
                    evidence_text: sub.evidence_text.clone(),
                    reasoning: sub.reasoning.clone(),
                    confidence: sub.confidence,
                });
            }
            stored_verdicts.push(CriterionVerdict {
                id,
                session_id,
                position: verdict.position,
                ai_met: verdict.ai_met,
                ai_rationale: verdict.ai_rationale,
                override_met: None,
                changed: false,
                changed_at: None,
                created_at: now,
            });
        }
        stored_verdicts.sort_by_key(|v| v.position);

        let mut state = self.state.write().await;
        state.verdicts.insert(session_id, stored_verdicts);
        state.sub_questions.insert(session_id, stored_subs);
        Ok(())
    }

    async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<CriterionVerdict>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .verdicts
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn sub_questions_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<SubQuestionEvaluation>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .sub_questions
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_override(
        &self,
        session_id: SessionId,
        position: u8,
        override_met: bool,
    ) -> Result<CriterionVerdict, RepositoryError> {
        let mut state = self.state.write().await;
        let verdict = state
            .verdicts
            .get_mut(&session_id)
            .and_then(|verdicts| verdicts.iter_mut().find(|v| v.position == position))
            .ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "verdict for session {} position {}",
                    session_id.as_uuid(),
                    position
                ))
            })?;
        verdict.override_met = Some(override_met);
        verdict.changed = true;
        verdict.changed_at = Some(Utc::now());
        Ok(verdict.clone())
    }
}

#[derive(Default)]
struct ScoreState {
    snapshots: HashMap<SessionId, ScoreSnapshot>,
    history: HashMap<SessionId, Vec<ScoreHistoryEntry>>,
}

#[derive(Default)]
pub struct InMemoryScoreRepository {
    state: RwLock<ScoreState>,
}

impl InMemoryScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    async fn current(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ScoreSnapshot>, RepositoryError> {
        Ok(self.state.read().await.snapshots.get(&session_id).cloned())
    }

    async fn record(
        &self,
        snapshot: &ScoreSnapshot,
        entry: &ScoreHistoryEntry,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.snapshots.insert(snapshot.session_id, snapshot.clone());
        state
            .history
            .entry(entry.session_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn history(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ScoreHistoryEntry>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .history
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryCoachingRepository {
    feedback: RwLock<HashMap<SessionId, CoachingFeedback>>,
}

impl InMemoryCoachingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoachingRepository for InMemoryCoachingRepository {
    async fn upsert(&self, feedback: &CoachingFeedback) -> Result<(), RepositoryError> {
        self.feedback
            .write()
            .await
            .insert(feedback.session_id, feedback.clone());
        Ok(())
    }

    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<CoachingFeedback>, RepositoryError> {
        Ok(self.feedback.read().await.get(&session_id).cloned())
    }

    async fn delete_for_session(&self, session_id: SessionId) -> Result<(), RepositoryError> {
        self.feedback.write().await.remove(&session_id);
        Ok(())
    }
}
