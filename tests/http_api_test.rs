//! End-to-end tests over the HTTP surface, from session creation through
//! coaching feedback, with every external service mocked.

mod helpers;

use std::time::Duration;

use serde_json::{json, Value};
use uuid::Uuid;

use dealcoach::domain::SessionStatus;
use helpers::{analysis_payload, met_flags, seed_verdicts, seeded_session, spawn_app};

async fn create_session(client: &reqwest::Client, base_url: &str) -> String {
    let response = client
        .post(format!("{base_url}/api/v1/sessions"))
        .json(&json!({
            "user_id": Uuid::new_v4(),
            "customer_name": "Globex",
            "opportunity_name": "Pilot rollout"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "draft");
    body["id"].as_str().unwrap().to_string()
}

async fn upload_audio(client: &reqwest::Client, base_url: &str, session_id: &str) {
    let part = reqwest::multipart::Part::bytes(vec![0u8; 2048])
        .file_name("call.webm")
        .mime_str("audio/webm")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(format!("{base_url}/api/v1/sessions/{session_id}/audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reused_existing"], false);
    assert_eq!(body["audio"]["storage_kind"], "local");
}

async fn wait_for_session_status(
    client: &reqwest::Client,
    base_url: &str,
    session_id: &str,
    wanted: &str,
) -> Value {
    for _ in 0..200 {
        let body: Value = client
            .get(format!("{base_url}/api/v1/sessions/{session_id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if body["status"] == wanted {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session never reached status {wanted}");
}

#[tokio::test]
async fn the_full_coaching_flow_runs_end_to_end() {
    let (base_url, harness) = spawn_app().await;
    let client = reqwest::Client::new();

    harness
        .stt
        .queue_success("We walked through the outage and its cost.", "en", Some(300.0));
    harness
        .completions
        .queue_response(&analysis_payload(&met_flags(7)));

    let session_id = create_session(&client, &base_url).await;
    upload_audio(&client, &base_url, &session_id).await;
    wait_for_session_status(&client, &base_url, &session_id, "pending_review").await;

    let transcript: Value = client
        .get(format!("{base_url}/api/v1/sessions/{session_id}/transcript"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        transcript["text"],
        "We walked through the outage and its cost."
    );
    assert_eq!(transcript["word_count"], 8);

    let verdicts: Value = client
        .get(format!("{base_url}/api/v1/sessions/{session_id}/verdicts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let verdicts = verdicts.as_array().unwrap();
    assert_eq!(verdicts.len(), 10);
    assert_eq!(verdicts[0]["position"], 1);
    assert_eq!(verdicts[0]["criterion"], "Trigger Event & Impact");
    assert!(!verdicts[0]["sub_questions"].as_array().unwrap().is_empty());

    // Reviewer overrides a missed criterion before submitting.
    let overridden: Value = client
        .patch(format!(
            "{base_url}/api/v1/sessions/{session_id}/verdicts/9"
        ))
        .json(&json!({"met": true}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(overridden["override_met"], true);
    assert_eq!(overridden["effective_met"], true);

    let submit = client
        .post(format!("{base_url}/api/v1/sessions/{session_id}/submit"))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.status(), 200);
    let score: Value = submit.json().await.unwrap();
    assert_eq!(score["score"], 80);
    assert_eq!(score["risk_band"], "green");
    assert_eq!(score["met_count"], 8);

    let session =
        wait_for_session_status(&client, &base_url, &session_id, "completed").await;
    assert!(session["submitted_at"].is_string());

    let history: Value = client
        .get(format!(
            "{base_url}/api/v1/sessions/{session_id}/score/history"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["trigger"], "initial_calculation");

    // Coaching lands in the background after submit.
    for _ in 0..200 {
        let response = client
            .get(format!("{base_url}/api/v1/sessions/{session_id}/coaching"))
            .send()
            .await
            .unwrap();
        if response.status() == 200 {
            let coaching: Value = response.json().await.unwrap();
            assert!(coaching["feedback_text"].as_str().unwrap().contains("Globex"));
            assert_eq!(coaching["improvement_areas"].as_array().unwrap().len(), 2);
            assert!(coaching["audio"].is_null());
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("coaching feedback never appeared");
}

#[tokio::test]
async fn invalid_session_ids_and_missing_sessions_are_distinct_errors() {
    let (base_url, _harness) = spawn_app().await;
    let client = reqwest::Client::new();

    let bad_id = client
        .get(format!("{base_url}/api/v1/sessions/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_id.status(), 400);

    let missing = client
        .get(format!("{base_url}/api/v1/sessions/{}", Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn empty_customer_names_are_rejected() {
    let (base_url, _harness) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base_url}/api/v1/sessions"))
        .json(&json!({
            "user_id": Uuid::new_v4(),
            "customer_name": "   "
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn a_second_upload_returns_conflict() {
    let (base_url, harness) = spawn_app().await;
    let client = reqwest::Client::new();
    harness.stt.queue_failure("not relevant here");

    let session_id = create_session(&client, &base_url).await;
    upload_audio(&client, &base_url, &session_id).await;

    let part = reqwest::multipart::Part::bytes(vec![0u8; 128])
        .file_name("again.webm")
        .mime_str("audio/webm")
        .unwrap();
    let response = client
        .post(format!("{base_url}/api/v1/sessions/{session_id}/audio"))
        .multipart(reqwest::multipart::Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn transcription_requires_uploaded_audio() {
    let (base_url, harness) = spawn_app().await;
    let client = reqwest::Client::new();

    let session_id = create_session(&client, &base_url).await;

    // No audio yet.
    let response = client
        .post(format!(
            "{base_url}/api/v1/sessions/{session_id}/transcribe"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    harness.stt.queue_success("quick call", "en", None);
    harness
        .completions
        .queue_response(&analysis_payload(&met_flags(10)));
    upload_audio(&client, &base_url, &session_id).await;
    wait_for_session_status(&client, &base_url, &session_id, "pending_review").await;
}

#[tokio::test]
async fn scores_can_be_calculated_before_submit() {
    let (base_url, harness) = spawn_app().await;
    let client = reqwest::Client::new();

    let session_id = seeded_session(&harness.repos, SessionStatus::PendingReview).await;
    seed_verdicts(&harness.repos, session_id, &met_flags(5)).await;
    let id = session_id.as_uuid();

    let no_score_yet = client
        .get(format!("{base_url}/api/v1/sessions/{id}/score"))
        .send()
        .await
        .unwrap();
    assert_eq!(no_score_yet.status(), 404);

    let calculated = client
        .post(format!("{base_url}/api/v1/sessions/{id}/score/calculate"))
        .send()
        .await
        .unwrap();
    assert_eq!(calculated.status(), 200);
    let body: Value = calculated.json().await.unwrap();
    assert_eq!(body["score"], 50);
    assert_eq!(body["risk_band"], "red");

    let current = client
        .get(format!("{base_url}/api/v1/sessions/{id}/score"))
        .send()
        .await
        .unwrap();
    assert_eq!(current.status(), 200);
}

#[tokio::test]
async fn sessions_are_listed_per_user() {
    let (base_url, _harness) = spawn_app().await;
    let client = reqwest::Client::new();

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let mut alice_session = String::new();
    for (user_id, customer) in [(alice, "Globex"), (bob, "Initech")] {
        let response = client
            .post(format!("{base_url}/api/v1/sessions"))
            .json(&json!({ "user_id": user_id, "customer_name": customer }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.unwrap();
        if user_id == alice {
            alice_session = body["id"].as_str().unwrap().to_string();
        }
    }

    let body: Value = client
        .get(format!("{base_url}/api/v1/sessions?user_id={alice}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], alice_session.as_str());
    assert_eq!(listed[0]["customer_name"], "Globex");

    // user_id is a required filter.
    let response = client
        .get(format!("{base_url}/api/v1/sessions"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
