//! Exercises the Whisper adapter against a local stand-in server.

use std::path::PathBuf;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use dealcoach::application::ports::{AudioSource, SpeechToText, SpeechToTextError};
use dealcoach::infrastructure::stt::OpenAiWhisperEngine;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

fn buffer_source() -> AudioSource {
    AudioSource::Buffer {
        data: vec![0u8; 512],
        filename: "call.webm".to_string(),
    }
}

#[tokio::test]
async fn a_verbose_json_response_maps_onto_the_outcome() {
    let router = Router::new().route(
        "/v1/audio/transcriptions",
        post(|headers: HeaderMap| async move {
            assert_eq!(
                headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok()),
                Some("Bearer test-key")
            );
            Json(json!({
                "text": "  We reviewed the rollout timeline.  ",
                "language": "english",
                "duration": 183.2
            }))
        }),
    );
    let base_url = serve(router).await;

    let engine = OpenAiWhisperEngine::new(&base_url, "test-key", "whisper-1", 10);
    let outcome = engine.transcribe(buffer_source(), "en").await.unwrap();

    // Whitespace is trimmed before the transcript is stored.
    assert_eq!(outcome.text, "We reviewed the rollout timeline.");
    assert_eq!(outcome.language, "english");
    assert_eq!(outcome.duration_seconds, Some(183.2));
}

#[tokio::test]
async fn a_missing_language_falls_back_to_the_hint() {
    let router = Router::new().route(
        "/v1/audio/transcriptions",
        post(|| async { Json(json!({"text": "short call"})) }),
    );
    let base_url = serve(router).await;

    let engine = OpenAiWhisperEngine::new(&base_url, "test-key", "whisper-1", 10);
    let outcome = engine.transcribe(buffer_source(), "de").await.unwrap();

    assert_eq!(outcome.language, "de");
    assert_eq!(outcome.duration_seconds, None);
}

#[tokio::test]
async fn an_error_status_surfaces_as_a_request_failure() {
    let router = Router::new().route(
        "/v1/audio/transcriptions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
    );
    let base_url = serve(router).await;

    let engine = OpenAiWhisperEngine::new(&base_url, "test-key", "whisper-1", 10);
    let result = engine.transcribe(buffer_source(), "").await;

    match result {
        Err(SpeechToTextError::ApiRequestFailed(message)) => {
            assert!(message.contains("429"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("request unexpectedly succeeded"),
    }
}

#[tokio::test]
async fn an_empty_transcript_is_an_invalid_response() {
    let router = Router::new().route(
        "/v1/audio/transcriptions",
        post(|| async { Json(json!({"text": "   "})) }),
    );
    let base_url = serve(router).await;

    let engine = OpenAiWhisperEngine::new(&base_url, "test-key", "whisper-1", 10);
    let result = engine.transcribe(buffer_source(), "").await;

    assert!(matches!(result, Err(SpeechToTextError::InvalidResponse(_))));
}

#[tokio::test]
async fn an_unreadable_audio_path_fails_before_any_request() {
    let engine = OpenAiWhisperEngine::new("http://127.0.0.1:9", "test-key", "whisper-1", 10);
    let missing = AudioSource::Path(PathBuf::from("/nonexistent/audio/call.webm"));

    let result = engine.transcribe(missing, "").await;
    assert!(matches!(result, Err(SpeechToTextError::SourceUnavailable(_))));
}
