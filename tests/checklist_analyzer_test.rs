mod helpers;

use std::sync::Arc;

use dealcoach::application::ports::{TranscriptRepository as _, VerdictRepository as _};
use dealcoach::application::services::{AnalysisError, ChecklistAnalyzer};
use dealcoach::domain::{criterion_catalog, SessionStatus, Transcript};
use dealcoach::infrastructure::llm::MockCompletionClient;
use helpers::{analysis_payload, met_flags, seeded_session, TestRepos};

fn analyzer(repos: &TestRepos, completions: Arc<MockCompletionClient>) -> ChecklistAnalyzer {
    ChecklistAnalyzer::new(completions, repos.transcripts.clone(), repos.verdicts.clone())
}

async fn seed_transcript(repos: &TestRepos, session_id: dealcoach::domain::SessionId) {
    let transcript = Transcript::new(
        session_id,
        "We discussed the outage that triggered the project and its cost.".to_string(),
        "en".to_string(),
        Some(540.0),
    );
    repos.transcripts.create(&transcript).await.unwrap();
}

#[tokio::test]
async fn a_valid_response_writes_the_full_verdict_set() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::Analyzing).await;
    seed_transcript(&repos, session_id).await;

    let completions = Arc::new(MockCompletionClient::with_response(&analysis_payload(
        &met_flags(7),
    )));
    analyzer(&repos, completions).analyze(session_id).await.unwrap();

    let verdicts = repos.verdicts.list_for_session(session_id).await.unwrap();
    assert_eq!(verdicts.len(), 10);
    for (idx, verdict) in verdicts.iter().enumerate() {
        assert_eq!(verdict.position as usize, idx + 1);
        assert_eq!(verdict.ai_met, idx < 7);
        assert_eq!(verdict.override_met, None);
        assert!(!verdict.changed);
    }

    let expected_subs: usize = criterion_catalog()
        .iter()
        .map(|c| c.sub_questions.len())
        .sum();
    let subs = repos
        .verdicts
        .sub_questions_for_session(session_id)
        .await
        .unwrap();
    assert_eq!(subs.len(), expected_subs);
}

#[tokio::test]
async fn analysis_requires_a_transcript() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::Analyzing).await;

    let completions = Arc::new(MockCompletionClient::with_response("{}"));
    let result = analyzer(&repos, completions.clone()).analyze(session_id).await;

    assert!(matches!(result, Err(AnalysisError::MissingTranscript(_))));
    // The completion client is never reached without a transcript.
    assert_eq!(completions.call_count(), 0);
}

#[tokio::test]
async fn a_malformed_response_leaves_no_partial_verdicts() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::Analyzing).await;
    seed_transcript(&repos, session_id).await;

    let completions = Arc::new(MockCompletionClient::with_response(
        r#"{"criteria": "sorry, I could not evaluate this call"}"#,
    ));
    let result = analyzer(&repos, completions).analyze(session_id).await;

    assert!(matches!(result, Err(AnalysisError::Parse(_))));
    let verdicts = repos.verdicts.list_for_session(session_id).await.unwrap();
    assert!(verdicts.is_empty());
}

#[tokio::test]
async fn reanalysis_replaces_the_previous_verdict_set() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::Analyzing).await;
    seed_transcript(&repos, session_id).await;

    let completions = Arc::new(MockCompletionClient::with_response(&analysis_payload(
        &met_flags(3),
    )));
    completions.queue_response(&analysis_payload(&met_flags(10)));

    let analyzer = analyzer(&repos, completions);
    analyzer.analyze(session_id).await.unwrap();
    analyzer.analyze(session_id).await.unwrap();

    let verdicts = repos.verdicts.list_for_session(session_id).await.unwrap();
    assert_eq!(verdicts.len(), 10);
    assert!(verdicts.iter().all(|v| v.ai_met));
}

#[tokio::test]
async fn a_completion_failure_propagates_as_a_service_error() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::Analyzing).await;
    seed_transcript(&repos, session_id).await;

    let completions = Arc::new(MockCompletionClient::new());
    completions.queue_failure("upstream unavailable");

    let result = analyzer(&repos, completions).analyze(session_id).await;
    assert!(matches!(result, Err(AnalysisError::Service(_))));
}
