use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{
    AudioRepository, RepositoryError, ScoreRepository, SessionRepository, VerdictRepository,
};
use crate::domain::{
    CriterionVerdict, ScoreSnapshot, ScoreTrigger, SessionId, SessionStatus, CRITERION_COUNT,
};

use super::checklist_analyzer::ChecklistAnalyzer;
use super::coaching_synthesizer::CoachingSynthesizer;
use super::scoring_engine::{ScoringEngine, ScoringError};
use super::transcription::TranscriptionService;

/// Unit of deferred work handed to the worker. `Process` is the
/// transcription + analysis run; `Coach` is the post-submit synthesis.
#[derive(Debug, Clone, Copy)]
pub enum PipelineMessage {
    Process { session_id: SessionId },
    Coach { session_id: SessionId },
}

/// Enqueue side of the orchestrator: guards the state machine invariants
/// (one run in flight per session, review before submit) and hands the
/// long-running work to the background worker so callers return immediately.
pub struct PipelineService {
    sender: mpsc::Sender<PipelineMessage>,
    sessions: Arc<dyn SessionRepository>,
    audio: Arc<dyn AudioRepository>,
    verdicts: Arc<dyn VerdictRepository>,
    scores: Arc<dyn ScoreRepository>,
    scoring: Arc<ScoringEngine>,
}

impl PipelineService {
    pub fn new(
        sender: mpsc::Sender<PipelineMessage>,
        sessions: Arc<dyn SessionRepository>,
        audio: Arc<dyn AudioRepository>,
        verdicts: Arc<dyn VerdictRepository>,
        scores: Arc<dyn ScoreRepository>,
        scoring: Arc<ScoringEngine>,
    ) -> Self {
        Self {
            sender,
            sessions,
            audio,
            verdicts,
            scores,
            scoring,
        }
    }

    /// Follows a successful intake, which has already moved the session to
    /// `processing`; no in-flight guard here.
    pub async fn enqueue_processing(&self, session_id: SessionId) -> Result<(), PipelineError> {
        self.send(PipelineMessage::Process { session_id }).await
    }

    /// Explicit (re-)transcription request. Rejected while a run is in
    /// flight; `failed`, `pending_review`, and `completed` sessions may be
    /// re-driven.
    pub async fn request_processing(&self, session_id: SessionId) -> Result<(), PipelineError> {
        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or(PipelineError::SessionNotFound(session_id))?;

        if session.status.is_in_flight() {
            return Err(PipelineError::Conflict(session_id));
        }
        if self.audio.get_for_session(session_id).await?.is_none() {
            return Err(PipelineError::MissingAudio(session_id));
        }

        self.sessions
            .update_status(session_id, SessionStatus::Processing, None)
            .await?;
        self.send(PipelineMessage::Process { session_id }).await
    }

    /// Explicit checklist submission: recomputes the score, completes the
    /// session, and schedules coaching synthesis in the background.
    pub async fn submit(&self, session_id: SessionId) -> Result<ScoreSnapshot, PipelineError> {
        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or(PipelineError::SessionNotFound(session_id))?;

        if session.status != SessionStatus::PendingReview {
            return Err(PipelineError::InvalidState {
                session_id,
                status: session.status,
                expected: SessionStatus::PendingReview,
            });
        }

        self.sessions
            .update_status(session_id, SessionStatus::Scoring, None)
            .await?;

        let trigger = if self.scores.current(session_id).await?.is_some() {
            ScoreTrigger::ManualCalculation
        } else {
            ScoreTrigger::InitialCalculation
        };

        let snapshot = match self.scoring.recalculate(session_id, trigger).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.sessions
                    .update_status(session_id, SessionStatus::Failed, Some(&e.to_string()))
                    .await?;
                return Err(e.into());
            }
        };

        let now = Utc::now();
        self.sessions.mark_submitted(session_id, now).await?;
        self.sessions
            .update_status(session_id, SessionStatus::Completed, None)
            .await?;
        self.sessions.mark_completed(session_id, now).await?;

        self.send(PipelineMessage::Coach { session_id }).await?;
        Ok(snapshot)
    }

    /// Manual recalculation endpoint; requires an existing verdict set.
    pub async fn recalculate_score(
        &self,
        session_id: SessionId,
    ) -> Result<ScoreSnapshot, PipelineError> {
        self.assert_exists(session_id).await?;
        let trigger = if self.scores.current(session_id).await?.is_some() {
            ScoreTrigger::ManualCalculation
        } else {
            ScoreTrigger::InitialCalculation
        };
        Ok(self.scoring.recalculate(session_id, trigger).await?)
    }

    /// Human override on one criterion verdict. Takes effect immediately;
    /// the score is recalculated right away when a snapshot already exists,
    /// otherwise the change is picked up by the next scoring run.
    pub async fn override_verdict(
        &self,
        session_id: SessionId,
        position: u8,
        override_met: bool,
    ) -> Result<CriterionVerdict, PipelineError> {
        if position == 0 || position as usize > CRITERION_COUNT {
            return Err(PipelineError::InvalidPosition(position));
        }
        self.assert_exists(session_id).await?;

        let verdict = self
            .verdicts
            .apply_override(session_id, position, override_met)
            .await?;

        if self.scores.current(session_id).await?.is_some() {
            self.scoring
                .recalculate(session_id, ScoreTrigger::ItemOverride)
                .await?;
        }
        Ok(verdict)
    }

    async fn assert_exists(&self, session_id: SessionId) -> Result<(), PipelineError> {
        self.sessions
            .get_by_id(session_id)
            .await?
            .map(|_| ())
            .ok_or(PipelineError::SessionNotFound(session_id))
    }

    async fn send(&self, message: PipelineMessage) -> Result<(), PipelineError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| PipelineError::QueueUnavailable)
    }
}

/// Background executor for the deferred pipeline stages. One message at a
/// time; each session's ordering is structural (analysis reads the
/// transcript the transcription stage just wrote).
pub struct PipelineWorker {
    receiver: mpsc::Receiver<PipelineMessage>,
    stages: WorkerStages,
}

/// The Arc-shared stage services; cloned into one task per message so
/// sessions run their pipelines independently of each other.
#[derive(Clone)]
struct WorkerStages {
    sessions: Arc<dyn SessionRepository>,
    transcription: Arc<TranscriptionService>,
    analyzer: Arc<ChecklistAnalyzer>,
    coaching: Arc<CoachingSynthesizer>,
}

impl PipelineWorker {
    pub fn new(
        receiver: mpsc::Receiver<PipelineMessage>,
        sessions: Arc<dyn SessionRepository>,
        transcription: Arc<TranscriptionService>,
        analyzer: Arc<ChecklistAnalyzer>,
        coaching: Arc<CoachingSynthesizer>,
    ) -> Self {
        Self {
            receiver,
            stages: WorkerStages {
                sessions,
                transcription,
                analyzer,
                coaching,
            },
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Pipeline worker started");
        while let Some(message) = self.receiver.recv().await {
            let stages = self.stages.clone();
            tokio::spawn(async move { stages.handle(message).await });
        }
        tracing::info!("Pipeline worker stopped: channel closed");
    }
}

impl WorkerStages {
    async fn handle(self, message: PipelineMessage) {
        match message {
            PipelineMessage::Process { session_id } => {
                let span = tracing::info_span!(
                    "pipeline_process",
                    session_id = %session_id.as_uuid(),
                );
                async {
                    if let Err(e) = self.process(session_id).await {
                        tracing::error!(error = %e, "Pipeline run failed");
                        self.mark_failed(session_id, &e.to_string()).await;
                    }
                }
                .instrument(span)
                .await;
            }
            PipelineMessage::Coach { session_id } => {
                let span = tracing::info_span!(
                    "pipeline_coach",
                    session_id = %session_id.as_uuid(),
                );
                async {
                    // Coaching failure does not fail the completed session;
                    // the regenerate endpoint re-drives it.
                    if let Err(e) = self.coaching.synthesize(session_id).await {
                        tracing::error!(error = %e, "Coaching synthesis failed");
                    }
                }
                .instrument(span)
                .await;
            }
        }
    }

    async fn process(&self, session_id: SessionId) -> Result<(), WorkerError> {
        self.update_status(session_id, SessionStatus::Processing)
            .await?;
        self.transcription.run(session_id).await?;

        self.update_status(session_id, SessionStatus::Analyzing)
            .await?;
        self.analyzer.analyze(session_id).await?;

        self.update_status(session_id, SessionStatus::PendingReview)
            .await?;
        tracing::info!("Pipeline run completed, session awaiting review");
        Ok(())
    }

    async fn update_status(
        &self,
        session_id: SessionId,
        status: SessionStatus,
    ) -> Result<(), WorkerError> {
        tracing::debug!(status = %status, "Session status transition");
        self.sessions
            .update_status(session_id, status, None)
            .await
            .map_err(WorkerError::Repository)
    }

    async fn mark_failed(&self, session_id: SessionId, message: &str) {
        if let Err(e) = self
            .sessions
            .update_status(session_id, SessionStatus::Failed, Some(message))
            .await
        {
            tracing::error!(error = %e, "Failed to record session failure");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("session not found: {}", .0.as_uuid())]
    SessionNotFound(SessionId),
    #[error("pipeline already in flight for session {}", .0.as_uuid())]
    Conflict(SessionId),
    #[error("no audio uploaded for session {}", .0.as_uuid())]
    MissingAudio(SessionId),
    #[error(
        "session {} is {status}, expected {expected}",
        session_id.as_uuid()
    )]
    InvalidState {
        session_id: SessionId,
        status: SessionStatus,
        expected: SessionStatus,
    },
    #[error("criterion position {0} out of range 1-10")]
    InvalidPosition(u8),
    #[error("pipeline queue unavailable")]
    QueueUnavailable,
    #[error("scoring: {0}")]
    Scoring(#[from] ScoringError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, thiserror::Error)]
enum WorkerError {
    #[error("transcription: {0}")]
    Transcription(#[from] super::transcription::TranscriptionRunError),
    #[error("analysis: {0}")]
    Analysis(#[from] super::checklist_analyzer::AnalysisError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
}
