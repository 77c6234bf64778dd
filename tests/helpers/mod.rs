//! Shared wiring for integration tests: in-memory repositories, mock
//! external services, and fixture builders.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use dealcoach::application::ports::{
    SessionRepository as _, SpeechToText, VerdictRepository as _,
};
use dealcoach::application::services::{
    AudioIntakeService, ChecklistAnalyzer, CoachingSynthesizer, MediaStores, PipelineService,
    PipelineWorker, ScoringEngine, TemplateCoach, TranscriptionService,
};
use dealcoach::domain::{
    criterion_catalog, CallSession, NewSubQuestionEvaluation, NewVerdict, SessionId,
    SessionStatus, CRITERION_COUNT,
};
use dealcoach::infrastructure::llm::MockCompletionClient;
use dealcoach::infrastructure::persistence::{
    InMemoryAudioRepository, InMemoryCoachingRepository, InMemoryScoreRepository,
    InMemorySessionRepository, InMemoryTranscriptRepository, InMemoryVerdictRepository,
};
use dealcoach::infrastructure::storage::InMemoryMediaStore;
use dealcoach::infrastructure::stt::MockSpeechToText;
use dealcoach::presentation::{create_router, AppState};

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The full in-memory repository set, with transcript deletes cascading to
/// verdicts the way the database schema does.
pub struct TestRepos {
    pub sessions: Arc<InMemorySessionRepository>,
    pub audio: Arc<InMemoryAudioRepository>,
    pub transcripts: Arc<InMemoryTranscriptRepository>,
    pub verdicts: Arc<InMemoryVerdictRepository>,
    pub scores: Arc<InMemoryScoreRepository>,
    pub coaching: Arc<InMemoryCoachingRepository>,
}

impl TestRepos {
    pub fn new() -> Self {
        let verdicts = Arc::new(InMemoryVerdictRepository::new());
        Self {
            sessions: Arc::new(InMemorySessionRepository::new()),
            audio: Arc::new(InMemoryAudioRepository::new()),
            transcripts: Arc::new(InMemoryTranscriptRepository::with_verdicts(Arc::clone(
                &verdicts,
            ))),
            verdicts,
            scores: Arc::new(InMemoryScoreRepository::new()),
            coaching: Arc::new(InMemoryCoachingRepository::new()),
        }
    }
}

pub async fn seeded_session(repos: &TestRepos, status: SessionStatus) -> SessionId {
    let mut session = CallSession::new(
        Uuid::new_v4(),
        "Acme Industrial".to_string(),
        Some("Q3 expansion".to_string()),
    );
    session.status = status;
    repos
        .sessions
        .create(&session)
        .await
        .expect("seed session");
    session.id
}

pub fn local_stores() -> (Arc<MediaStores>, Arc<InMemoryMediaStore>) {
    let store = Arc::new(InMemoryMediaStore::new());
    let stores = Arc::new(MediaStores::local_only(store.clone()));
    (stores, store)
}

/// A valid analyzer response body with the given per-criterion verdicts,
/// matching each criterion's sub-question count from the catalog.
pub fn analysis_payload(met_flags: &[bool; CRITERION_COUNT]) -> String {
    let entries: Vec<String> = criterion_catalog()
        .iter()
        .map(|criterion| {
            let met = met_flags[(criterion.position - 1) as usize];
            let subs: Vec<String> = criterion
                .sub_questions
                .iter()
                .map(|_| {
                    format!(
                        r#"{{"evidence_found": {met}, "evidence": {}, "reasoning": "assessed from transcript", "confidence": 0.8}}"#,
                        if met { r#""quoted passage""# } else { "null" }
                    )
                })
                .collect();
            format!(
                r#"{{"position": {}, "met": {}, "rationale": "verdict rationale", "sub_questions": [{}]}}"#,
                criterion.position,
                met,
                subs.join(",")
            )
        })
        .collect();
    format!(r#"{{"criteria": [{}]}}"#, entries.join(","))
}

/// Seeds a verdict set directly, bypassing the analyzer.
pub async fn seed_verdicts(
    repos: &TestRepos,
    session_id: SessionId,
    met_flags: &[bool; CRITERION_COUNT],
) {
    let verdicts: Vec<NewVerdict> = criterion_catalog()
        .iter()
        .map(|criterion| {
            let met = met_flags[(criterion.position - 1) as usize];
            NewVerdict {
                position: criterion.position,
                ai_met: met,
                ai_rationale: format!("seeded verdict for {}", criterion.name),
                sub_questions: criterion
                    .sub_questions
                    .iter()
                    .map(|q| NewSubQuestionEvaluation {
                        question_order: q.order,
                        evidence_found: met,
                        evidence_text: met.then(|| "quoted passage".to_string()),
                        reasoning: "assessed from transcript".to_string(),
                        confidence: Some(0.8),
                    })
                    .collect(),
            }
        })
        .collect();
    repos
        .verdicts
        .replace_for_session(session_id, verdicts)
        .await
        .expect("seed verdicts");
}

pub fn met_flags(met_count: usize) -> [bool; CRITERION_COUNT] {
    let mut flags = [false; CRITERION_COUNT];
    for flag in flags.iter_mut().take(met_count) {
        *flag = true;
    }
    flags
}

/// Everything wired together with the background worker running, the way
/// `main` assembles it, but on mocks.
pub struct PipelineHarness {
    pub repos: TestRepos,
    pub store: Arc<InMemoryMediaStore>,
    pub stt: Arc<MockSpeechToText>,
    pub completions: Arc<MockCompletionClient>,
    pub intake: Arc<AudioIntakeService>,
    pub pipeline: Arc<PipelineService>,
    pub synthesizer: Arc<CoachingSynthesizer>,
}

/// Same wiring with a caller-supplied speech-to-text adapter, for tests
/// that need control over transcription timing.
pub struct PipelineParts {
    pub repos: TestRepos,
    pub store: Arc<InMemoryMediaStore>,
    pub completions: Arc<MockCompletionClient>,
    pub intake: Arc<AudioIntakeService>,
    pub pipeline: Arc<PipelineService>,
    pub synthesizer: Arc<CoachingSynthesizer>,
}

pub fn spawn_pipeline() -> PipelineHarness {
    let stt = Arc::new(MockSpeechToText::new());
    let parts = spawn_pipeline_with_stt(stt.clone());
    PipelineHarness {
        repos: parts.repos,
        store: parts.store,
        stt,
        completions: parts.completions,
        intake: parts.intake,
        pipeline: parts.pipeline,
        synthesizer: parts.synthesizer,
    }
}

pub fn spawn_pipeline_with_stt(stt: Arc<dyn SpeechToText>) -> PipelineParts {
    let repos = TestRepos::new();
    let (stores, store) = local_stores();
    let completions = Arc::new(MockCompletionClient::new());

    let intake = Arc::new(AudioIntakeService::new(
        Arc::clone(&stores),
        repos.sessions.clone(),
        repos.audio.clone(),
        MAX_UPLOAD_BYTES,
    ));
    let transcription = Arc::new(TranscriptionService::new(
        Arc::clone(&stores),
        repos.audio.clone(),
        repos.transcripts.clone(),
        stt.clone(),
        String::new(),
    ));
    let analyzer = Arc::new(ChecklistAnalyzer::new(
        completions.clone(),
        repos.transcripts.clone(),
        repos.verdicts.clone(),
    ));
    let scoring = Arc::new(ScoringEngine::new(
        repos.verdicts.clone(),
        repos.scores.clone(),
    ));
    let synthesizer = Arc::new(CoachingSynthesizer::new(
        repos.sessions.clone(),
        repos.verdicts.clone(),
        repos.scores.clone(),
        repos.coaching.clone(),
        Arc::new(TemplateCoach),
        None,
        Arc::clone(&stores),
        "test-voice".to_string(),
    ));

    let (sender, receiver) = tokio::sync::mpsc::channel(16);
    let pipeline = Arc::new(PipelineService::new(
        sender,
        repos.sessions.clone(),
        repos.audio.clone(),
        repos.verdicts.clone(),
        repos.scores.clone(),
        scoring,
    ));
    tokio::spawn(
        PipelineWorker::new(
            receiver,
            repos.sessions.clone(),
            transcription,
            analyzer,
            synthesizer.clone(),
        )
        .run(),
    );

    PipelineParts {
        repos,
        store,
        completions,
        intake,
        pipeline,
        synthesizer,
    }
}

/// Serves the full HTTP API on an ephemeral port, backed by the mock
/// harness, and returns the base URL.
pub async fn spawn_app() -> (String, PipelineHarness) {
    let harness = spawn_pipeline();
    let state = AppState {
        sessions: harness.repos.sessions.clone(),
        audio: harness.repos.audio.clone(),
        transcripts: harness.repos.transcripts.clone(),
        verdicts: harness.repos.verdicts.clone(),
        scores: harness.repos.scores.clone(),
        coaching: harness.repos.coaching.clone(),
        intake: harness.intake.clone(),
        pipeline: harness.pipeline.clone(),
        synthesizer: harness.synthesizer.clone(),
    };
    let router = create_router(state, MAX_UPLOAD_BYTES as usize);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    (format!("http://{addr}"), harness)
}

/// Polls until the session reaches the wanted status or two seconds pass.
pub async fn wait_for_status(
    repos: &TestRepos,
    session_id: SessionId,
    wanted: SessionStatus,
) -> CallSession {
    for _ in 0..200 {
        let session = repos
            .sessions
            .get_by_id(session_id)
            .await
            .expect("lookup session")
            .expect("session exists");
        if session.status == wanted {
            return session;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session never reached status {wanted}");
}
