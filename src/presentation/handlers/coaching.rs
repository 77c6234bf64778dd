use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::services::CoachingError;
use crate::domain::{CoachingFeedback, CoachingPoint};
use crate::presentation::state::AppState;

use super::sessions::{parse_session_id, ErrorResponse};

#[derive(Serialize)]
pub struct NarrationResponse {
    pub storage_path: String,
    pub storage_kind: String,
    pub duration_seconds: u32,
}

#[derive(Serialize)]
pub struct CoachingResponse {
    pub id: String,
    pub session_id: String,
    pub feedback_text: String,
    pub strengths: Vec<CoachingPoint>,
    pub improvement_areas: Vec<CoachingPoint>,
    pub action_items: Vec<String>,
    pub audio: Option<NarrationResponse>,
    pub generated_at: String,
}

impl CoachingResponse {
    fn from_feedback(feedback: &CoachingFeedback) -> Self {
        Self {
            id: feedback.id.as_uuid().to_string(),
            session_id: feedback.session_id.as_uuid().to_string(),
            feedback_text: feedback.feedback_text.clone(),
            strengths: feedback.strengths.clone(),
            improvement_areas: feedback.improvement_areas.clone(),
            action_items: feedback.action_items.clone(),
            audio: feedback.audio.as_ref().map(|audio| NarrationResponse {
                storage_path: audio.storage_path.as_str().to_string(),
                storage_kind: audio.storage_kind.as_str().to_string(),
                duration_seconds: audio.duration_seconds,
            }),
            generated_at: feedback.generated_at.to_rfc3339(),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_coaching_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.coaching.get_for_session(id).await {
        Ok(Some(feedback)) => (
            StatusCode::OK,
            Json(CoachingResponse::from_feedback(&feedback)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No coaching feedback for session: {}", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch coaching feedback");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch coaching feedback: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// Discards and rebuilds the coaching feedback from the current verdicts
/// and score, synchronously.
#[tracing::instrument(skip(state))]
pub async fn regenerate_coaching_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.synthesizer.regenerate(id).await {
        Ok(feedback) => (
            StatusCode::OK,
            Json(CoachingResponse::from_feedback(&feedback)),
        )
            .into_response(),
        Err(e @ CoachingError::ScoreMissing(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(CoachingError::SessionNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {}", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Coaching regeneration failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Coaching regeneration failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}
