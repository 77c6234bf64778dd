mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dealcoach::application::ports::{
    AudioRepository as _, AudioSource, CoachingRepository as _, ScoreRepository as _,
    SessionRepository as _, SpeechToText, SpeechToTextError, TranscriptRepository as _,
    TranscriptionOutcome, VerdictRepository as _,
};
use dealcoach::application::services::PipelineError;
use dealcoach::domain::{RiskBand, ScoreTrigger, SessionId, SessionStatus};
use helpers::{
    analysis_payload, met_flags, seed_verdicts, seeded_session, spawn_pipeline,
    spawn_pipeline_with_stt, wait_for_status,
};
use tokio::sync::Notify;

fn recording() -> Bytes {
    Bytes::from_static(&[0u8; 4096])
}

#[tokio::test]
async fn an_upload_drives_the_session_to_pending_review() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Draft).await;
    harness
        .stt
        .queue_success("We talked through the outage and its cost.", "en", Some(412.5));
    harness
        .completions
        .queue_response(&analysis_payload(&met_flags(8)));

    let outcome = harness
        .intake
        .receive(session_id, "call.webm", "audio/webm", recording(), false)
        .await
        .unwrap();
    assert!(!outcome.reused_existing);
    harness.pipeline.enqueue_processing(session_id).await.unwrap();

    wait_for_status(&harness.repos, session_id, SessionStatus::PendingReview).await;

    let transcript = harness
        .repos
        .transcripts
        .get_for_session(session_id)
        .await
        .unwrap()
        .expect("transcript written");
    assert_eq!(transcript.language, "en");

    let verdicts = harness
        .repos
        .verdicts
        .list_for_session(session_id)
        .await
        .unwrap();
    assert_eq!(verdicts.len(), 10);

    // The transcription duration is copied onto the audio reference.
    let audio = harness
        .repos
        .audio
        .get_for_session(session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(audio.duration_seconds, Some(412.5));
}

#[tokio::test]
async fn a_transcription_failure_marks_the_session_failed() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Draft).await;
    harness.stt.queue_failure("speech service unreachable");

    harness
        .intake
        .receive(session_id, "call.webm", "audio/webm", recording(), false)
        .await
        .unwrap();
    harness.pipeline.enqueue_processing(session_id).await.unwrap();

    let session = wait_for_status(&harness.repos, session_id, SessionStatus::Failed).await;
    let last_error = session.last_error.expect("failure recorded");
    assert!(last_error.contains("speech service unreachable"));
}

#[tokio::test]
async fn a_failed_session_can_be_reprocessed() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Draft).await;
    harness.stt.queue_failure("transient outage");
    harness.stt.queue_success("Second attempt transcript.", "en", None);
    harness
        .completions
        .queue_response(&analysis_payload(&met_flags(4)));

    harness
        .intake
        .receive(session_id, "call.webm", "audio/webm", recording(), false)
        .await
        .unwrap();
    harness.pipeline.enqueue_processing(session_id).await.unwrap();
    wait_for_status(&harness.repos, session_id, SessionStatus::Failed).await;

    harness.pipeline.request_processing(session_id).await.unwrap();
    let session =
        wait_for_status(&harness.repos, session_id, SessionStatus::PendingReview).await;
    assert_eq!(session.last_error, None);
    assert_eq!(harness.stt.call_count(), 2);
}

#[tokio::test]
async fn processing_requires_uploaded_audio() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Draft).await;

    let result = harness.pipeline.request_processing(session_id).await;
    assert!(matches!(result, Err(PipelineError::MissingAudio(_))));

    let missing = harness.pipeline.request_processing(SessionId::new()).await;
    assert!(matches!(missing, Err(PipelineError::SessionNotFound(_))));
}

#[tokio::test]
async fn an_in_flight_session_rejects_a_second_run() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Analyzing).await;

    let result = harness.pipeline.request_processing(session_id).await;
    assert!(matches!(result, Err(PipelineError::Conflict(_))));
}

#[tokio::test]
async fn submit_is_only_valid_from_pending_review() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Draft).await;

    let result = harness.pipeline.submit(session_id).await;
    assert!(matches!(
        result,
        Err(PipelineError::InvalidState {
            status: SessionStatus::Draft,
            expected: SessionStatus::PendingReview,
            ..
        })
    ));
}

#[tokio::test]
async fn submit_scores_completes_and_schedules_coaching() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::PendingReview).await;
    seed_verdicts(&harness.repos, session_id, &met_flags(9)).await;

    let snapshot = harness.pipeline.submit(session_id).await.unwrap();
    assert_eq!(snapshot.score, 90);
    assert_eq!(snapshot.risk_band, RiskBand::Green);

    let session = wait_for_status(&harness.repos, session_id, SessionStatus::Completed).await;
    assert!(session.submitted_at.is_some());
    assert!(session.completed_at.is_some());

    // Coaching runs in the background after completion.
    for _ in 0..200 {
        if harness
            .repos
            .coaching
            .get_for_session(session_id)
            .await
            .unwrap()
            .is_some()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("coaching feedback never appeared");
}

#[tokio::test]
async fn submit_without_verdicts_fails_the_session() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::PendingReview).await;

    let result = harness.pipeline.submit(session_id).await;
    assert!(matches!(result, Err(PipelineError::Scoring(_))));

    let session = harness
        .repos
        .sessions
        .get_by_id(session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

#[tokio::test]
async fn an_override_recalculates_an_existing_score() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::PendingReview).await;
    seed_verdicts(&harness.repos, session_id, &met_flags(7)).await;
    harness.pipeline.recalculate_score(session_id).await.unwrap();

    // Flip a missed criterion to met.
    let verdict = harness
        .pipeline
        .override_verdict(session_id, 8, true)
        .await
        .unwrap();
    assert_eq!(verdict.override_met, Some(true));
    assert!(verdict.changed);

    let current = harness
        .repos
        .scores
        .current(session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.score, 80);

    let history = harness.repos.scores.history(session_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].trigger, ScoreTrigger::ItemOverride);
    assert_eq!(history[1].delta, Some(10));
}

#[tokio::test]
async fn an_override_before_any_score_does_not_create_a_snapshot() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::PendingReview).await;
    seed_verdicts(&harness.repos, session_id, &met_flags(7)).await;

    harness
        .pipeline
        .override_verdict(session_id, 3, false)
        .await
        .unwrap();

    assert!(harness
        .repos
        .scores
        .current(session_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn override_positions_outside_the_catalog_are_rejected() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::PendingReview).await;
    seed_verdicts(&harness.repos, session_id, &met_flags(5)).await;

    for position in [0u8, 11] {
        let result = harness
            .pipeline
            .override_verdict(session_id, position, true)
            .await;
        assert!(matches!(result, Err(PipelineError::InvalidPosition(p)) if p == position));
    }
}

#[tokio::test]
async fn reprocessing_replaces_the_transcript_and_drops_stale_verdicts() {
    let harness = spawn_pipeline();
    let session_id = seeded_session(&harness.repos, SessionStatus::Draft).await;
    harness.stt.queue_success("First pass over the call.", "en", None);
    harness
        .completions
        .queue_response(&analysis_payload(&met_flags(8)));

    harness
        .intake
        .receive(session_id, "call.webm", "audio/webm", recording(), false)
        .await
        .unwrap();
    harness.pipeline.enqueue_processing(session_id).await.unwrap();
    wait_for_status(&harness.repos, session_id, SessionStatus::PendingReview).await;
    harness
        .pipeline
        .override_verdict(session_id, 9, true)
        .await
        .unwrap();

    // Second pass: transcription succeeds but the analysis fails. The old
    // transcript and its verdicts must already be gone, override included.
    harness.stt.queue_success("Second pass over the call.", "en", None);
    harness.completions.queue_failure("model unavailable");
    let outcome = harness
        .intake
        .receive(session_id, "call.webm", "audio/webm", recording(), true)
        .await
        .unwrap();
    assert!(outcome.reused_existing);
    harness.pipeline.request_processing(session_id).await.unwrap();
    wait_for_status(&harness.repos, session_id, SessionStatus::Failed).await;

    let transcript = harness
        .repos
        .transcripts
        .get_for_session(session_id)
        .await
        .unwrap()
        .expect("replacement transcript written");
    assert_eq!(transcript.text, "Second pass over the call.");
    let verdicts = harness
        .repos
        .verdicts
        .list_for_session(session_id)
        .await
        .unwrap();
    assert!(verdicts.is_empty());

    // A third pass produces a complete fresh verdict set.
    harness.stt.queue_success("Third pass over the call.", "en", None);
    harness
        .completions
        .queue_response(&analysis_payload(&met_flags(5)));
    harness.pipeline.request_processing(session_id).await.unwrap();
    wait_for_status(&harness.repos, session_id, SessionStatus::PendingReview).await;

    let verdicts = harness
        .repos
        .verdicts
        .list_for_session(session_id)
        .await
        .unwrap();
    assert_eq!(verdicts.len(), 10);
    assert_eq!(verdicts.iter().filter(|v| v.ai_met).count(), 5);
    assert!(verdicts.iter().all(|v| v.override_met.is_none()));
}

/// Speech-to-text stand-in whose first call blocks until released; later
/// calls return immediately.
struct GatedSpeechToText {
    gate: Arc<Notify>,
    started: AtomicUsize,
}

#[async_trait]
impl SpeechToText for GatedSpeechToText {
    async fn transcribe(
        &self,
        _source: AudioSource,
        _language_hint: &str,
    ) -> Result<TranscriptionOutcome, SpeechToTextError> {
        let call = self.started.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            self.gate.notified().await;
        }
        Ok(TranscriptionOutcome {
            text: "We walked through the rollout plan.".to_string(),
            language: "en".to_string(),
            duration_seconds: None,
        })
    }
}

#[tokio::test]
async fn a_slow_session_does_not_stall_the_others() {
    let gate = Arc::new(Notify::new());
    let stt = Arc::new(GatedSpeechToText {
        gate: gate.clone(),
        started: AtomicUsize::new(0),
    });
    let parts = spawn_pipeline_with_stt(stt.clone());
    parts
        .completions
        .queue_response(&analysis_payload(&met_flags(6)));
    parts
        .completions
        .queue_response(&analysis_payload(&met_flags(6)));

    let slow = seeded_session(&parts.repos, SessionStatus::Draft).await;
    let fast = seeded_session(&parts.repos, SessionStatus::Draft).await;
    for session_id in [slow, fast] {
        parts
            .intake
            .receive(session_id, "call.webm", "audio/webm", recording(), false)
            .await
            .unwrap();
    }

    parts.pipeline.enqueue_processing(slow).await.unwrap();
    for _ in 0..200 {
        if stt.started.load(Ordering::SeqCst) >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(stt.started.load(Ordering::SeqCst) >= 1, "first run never reached transcription");

    // The second session completes while the first is held mid-transcription.
    parts.pipeline.enqueue_processing(fast).await.unwrap();
    wait_for_status(&parts.repos, fast, SessionStatus::PendingReview).await;
    let held = parts
        .repos
        .sessions
        .get_by_id(slow)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(held.status, SessionStatus::Processing);

    gate.notify_one();
    wait_for_status(&parts.repos, slow, SessionStatus::PendingReview).await;
}
