use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::services::PipelineError;
use crate::domain::Transcript;
use crate::presentation::state::AppState;

use super::sessions::{parse_session_id, ErrorResponse};

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub id: String,
    pub session_id: String,
    pub text: String,
    pub language: String,
    pub duration_seconds: Option<f64>,
    pub word_count: u32,
    pub transcribed_at: String,
}

impl TranscriptResponse {
    fn from_transcript(transcript: &Transcript) -> Self {
        Self {
            id: transcript.id.as_uuid().to_string(),
            session_id: transcript.session_id.as_uuid().to_string(),
            text: transcript.text.clone(),
            language: transcript.language.clone(),
            duration_seconds: transcript.duration_seconds,
            word_count: transcript.word_count,
            transcribed_at: transcript.transcribed_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct AcceptedResponse {
    pub session_id: String,
    pub message: String,
}

/// Explicitly (re-)runs transcription and analysis. Rejected with 409 while
/// a run is already in flight for the session.
#[tracing::instrument(skip(state))]
pub async fn request_transcription_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.pipeline.request_processing(id).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(AcceptedResponse {
                session_id: id.as_uuid().to_string(),
                message: "Transcription started".to_string(),
            }),
        )
            .into_response(),
        Err(PipelineError::SessionNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {}", session_id),
            }),
        )
            .into_response(),
        Err(e @ PipelineError::Conflict(_)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e @ PipelineError::MissingAudio(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(PipelineError::QueueUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Pipeline queue full or worker unavailable".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start transcription");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start transcription: {}", e),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_transcript_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.transcripts.get_for_session(id).await {
        Ok(Some(transcript)) => (
            StatusCode::OK,
            Json(TranscriptResponse::from_transcript(&transcript)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No transcript for session: {}", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch transcript");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch transcript: {}", e),
                }),
            )
                .into_response()
        }
    }
}
