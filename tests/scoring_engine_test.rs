mod helpers;

use chrono::Utc;
use dealcoach::application::ports::ScoreRepository as _;
use dealcoach::application::services::{compute_snapshot, ScoringEngine, ScoringError};
use dealcoach::domain::{
    CriterionVerdict, RiskBand, ScoreTrigger, SessionId, SessionStatus, VerdictId,
};
use helpers::{met_flags, seed_verdicts, seeded_session, TestRepos};

fn engine(repos: &TestRepos) -> ScoringEngine {
    ScoringEngine::new(repos.verdicts.clone(), repos.scores.clone())
}

fn verdict(position: u8, ai_met: bool, override_met: Option<bool>) -> CriterionVerdict {
    CriterionVerdict {
        id: VerdictId::new(),
        session_id: SessionId::new(),
        position,
        ai_met,
        ai_rationale: "test".to_string(),
        override_met,
        changed: override_met.is_some(),
        changed_at: override_met.map(|_| Utc::now()),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn seven_met_criteria_score_seventy_in_the_yellow_band() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::PendingReview).await;
    seed_verdicts(&repos, session_id, &met_flags(7)).await;

    let snapshot = engine(&repos)
        .recalculate(session_id, ScoreTrigger::InitialCalculation)
        .await
        .unwrap();

    assert_eq!(snapshot.score, 70);
    assert_eq!(snapshot.risk_band, RiskBand::Yellow);
    assert_eq!(snapshot.met_count, 7);
    assert_eq!(snapshot.total_count, 10);
}

#[tokio::test]
async fn recalculation_without_verdicts_is_rejected() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::PendingReview).await;

    let result = engine(&repos)
        .recalculate(session_id, ScoreTrigger::InitialCalculation)
        .await;

    assert!(matches!(result, Err(ScoringError::NoVerdicts(id)) if id == session_id));
}

#[tokio::test]
async fn every_recalculation_appends_one_history_entry() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::PendingReview).await;
    let engine = engine(&repos);

    seed_verdicts(&repos, session_id, &met_flags(4)).await;
    engine
        .recalculate(session_id, ScoreTrigger::InitialCalculation)
        .await
        .unwrap();

    // Unchanged verdicts still append an entry, with a zero delta.
    engine
        .recalculate(session_id, ScoreTrigger::ManualCalculation)
        .await
        .unwrap();

    seed_verdicts(&repos, session_id, &met_flags(9)).await;
    engine
        .recalculate(session_id, ScoreTrigger::ManualCalculation)
        .await
        .unwrap();

    let history = repos.scores.history(session_id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].delta, None);
    assert_eq!(history[0].trigger, ScoreTrigger::InitialCalculation);
    assert_eq!(history[1].delta, Some(0));
    assert_eq!(history[2].delta, Some(50));
    assert_eq!(history[2].score, 90);

    let current = repos.scores.current(session_id).await.unwrap().unwrap();
    assert_eq!(current.score, 90);
    assert_eq!(current.risk_band, RiskBand::Green);
}

#[tokio::test]
async fn the_same_verdicts_always_produce_the_same_snapshot() {
    let repos = TestRepos::new();
    let session_id = seeded_session(&repos, SessionStatus::PendingReview).await;
    seed_verdicts(&repos, session_id, &met_flags(6)).await;
    let engine = engine(&repos);

    let first = engine
        .recalculate(session_id, ScoreTrigger::InitialCalculation)
        .await
        .unwrap();
    let second = engine
        .recalculate(session_id, ScoreTrigger::ManualCalculation)
        .await
        .unwrap();

    assert_eq!(first.score, second.score);
    assert_eq!(first.risk_band, second.risk_band);
    assert_eq!(first.met_count, second.met_count);
}

#[test]
fn overrides_take_precedence_over_ai_verdicts() {
    let session_id = SessionId::new();
    let verdicts = vec![
        verdict(1, false, Some(true)),
        verdict(2, true, Some(false)),
        verdict(3, true, None),
    ];

    let snapshot = compute_snapshot(session_id, &verdicts);

    // Position 1 flipped to met, position 2 flipped to missed.
    assert_eq!(snapshot.met_count, 2);
    assert_eq!(snapshot.score, 20);
    assert_eq!(snapshot.total_count, 3);
}

#[test]
fn low_band_edges_fall_on_sixty_and_eighty() {
    let session_id = SessionId::new();

    let eight_met: Vec<CriterionVerdict> =
        (1..=10).map(|p| verdict(p, p <= 8, None)).collect();
    assert_eq!(
        compute_snapshot(session_id, &eight_met).risk_band,
        RiskBand::Green
    );

    let six_met: Vec<CriterionVerdict> =
        (1..=10).map(|p| verdict(p, p <= 6, None)).collect();
    assert_eq!(
        compute_snapshot(session_id, &six_met).risk_band,
        RiskBand::Yellow
    );

    let five_met: Vec<CriterionVerdict> =
        (1..=10).map(|p| verdict(p, p <= 5, None)).collect();
    assert_eq!(
        compute_snapshot(session_id, &five_met).risk_band,
        RiskBand::Red
    );
}
